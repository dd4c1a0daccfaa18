//! pyQuil program listing backend.

use qconvert_expr::{Evaluator, Value};
use qconvert_ir::{Condition, ExportTarget, GateTable};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};
use crate::event::{Backend, CircuitInfo, EventSink, GateEvent, MeasureEvent};
use crate::options::{ConvertOptions, QASM_SIMULATOR, STATEVECTOR_SIMULATOR};
use crate::resolve::{ResolvedGate, resolve_export};

/// Emits one pyQuil listing per experiment.
///
/// Gates resolve their `pyquil` export entry (falling back to `quil`).
/// Gates whose entry carries a custom array are declared with `DefGate`
/// once per listing.
pub struct PyquilBackend<'a> {
    table: &'a GateTable,
    evaluator: &'a Evaluator,
    options: &'a ConvertOptions,
    info: Option<CircuitInfo>,
    imports: String,
    head: String,
    body: String,
    custom: CustomGates,
    output: Option<String>,
}

/// `DefGate` declarations collected while walking the body.
#[derive(Debug, Default)]
struct CustomGates {
    names: FxHashSet<String>,
    param_names: FxHashSet<String>,
    params: String,
    matrices: String,
    declarations: String,
    constructors: String,
    appends: String,
}

impl CustomGates {
    fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> PyquilBackend<'a> {
    /// Create a backend.
    pub fn new(table: &'a GateTable, evaluator: &'a Evaluator, options: &'a ConvertOptions) -> Self {
        Self {
            table,
            evaluator,
            options,
            info: None,
            imports: String::new(),
            head: String::new(),
            body: String::new(),
            custom: CustomGates::default(),
            output: None,
        }
    }

    fn info(&self) -> ConvertResult<&CircuitInfo> {
        self.info
            .as_ref()
            .ok_or_else(|| ConvertError::InvalidState("pyQuil backend received an event before the circuit started".into()))
    }

    /// Lattice names that select a real device rather than a local QVM.
    fn device_lattice(&self) -> Option<&'a str> {
        let options: &'a ConvertOptions = self.options;
        options
            .lattice
            .as_deref()
            .filter(|l| *l != QASM_SIMULATOR && !l.contains("q-qvm"))
    }

    fn declare_custom_gate(&mut self, resolved: &ResolvedGate, array: &str) {
        if self.custom.names.contains(&resolved.name) {
            return;
        }
        if self.custom.is_empty() {
            push_line(
                &mut self.imports,
                "from pyquil.quilatom import Parameter, quil_sin, quil_cos, quil_sqrt, quil_exp, quil_cis",
            );
            push_line(&mut self.imports, "from pyquil.quilbase import DefGate");
            push_line(&mut self.imports, "import numpy as np");
        }
        self.custom.names.insert(resolved.name.clone());

        for param in &resolved.export.params {
            if self.custom.param_names.insert(param.clone()) {
                push_line(&mut self.custom.params, &format!("p_{param} = Parameter('{param}')"));
            }
        }
        let param_list = resolved
            .export
            .params
            .iter()
            .map(|p| format!("p_{p}"))
            .collect::<Vec<_>>()
            .join(", ");

        let name = &resolved.name;
        push_line(&mut self.custom.matrices, &format!("{name}_matrix = np.array({array})"));
        push_line(
            &mut self.custom.declarations,
            &format!("{name}_defgate = DefGate('{name}', {name}_matrix, [{param_list}])"),
        );
        push_line(
            &mut self.custom.constructors,
            &format!("{name} = {name}_defgate.get_constructor()"),
        );
        push_line(&mut self.custom.appends, &format!("p += {name}_defgate"));
        debug!(gate = %name, "declared custom gate");
    }

    fn emit_condition(&mut self, condition: &Condition, memory_slots: u64) -> ConvertResult<()> {
        if let Some(relation) = condition.relation.as_deref() {
            if relation != "==" {
                return Err(ConvertError::MalformedInput(format!(
                    "relation \"{relation}\" cannot be expressed in pyQuil"
                )));
            }
        }

        self.body.push('\n');
        if memory_slots == 1 {
            push_line(&mut self.body, &format!("p += MOVE(bit_reg, ro[{}])", condition.memory));
            if condition.val == 0 {
                push_line(&mut self.body, "p += NOT(bit_reg)");
            }
        } else {
            push_line(&mut self.body, "p += MOVE(int_reg, sha_reg)");
            push_line(&mut self.body, &format!("p += AND(int_reg, {:#x})", condition.mask));
            push_line(&mut self.body, &format!("p += EQ(bit_reg, int_reg, {:#x})", condition.val));
        }
        Ok(())
    }

    fn emit_trailer(&mut self, info: &CircuitInfo) {
        let options = self.options;
        let device = self.device_lattice();
        let body = &mut self.body;

        match device {
            Some(lattice) if info.return_state_vector || lattice == STATEVECTOR_SIMULATOR => {
                push_line(body, "qc = WavefunctionSimulator()");
                if info.create_exec_code {
                    body.push('\n');
                    push_line(body, "wf = qc.wavefunction(p)");
                    push_line(body, "print(wf)");
                }
            }
            Some(lattice) => {
                push_shots(body, options);
                if options.as_qvm {
                    push_line(body, &format!("qc = get_qc('{lattice}', as_qvm=True)"));
                } else {
                    push_line(body, &format!("qc = get_qc('{lattice}')"));
                }
                push_seed(body, options);
                body.push('\n');
                push_line(body, "ex = qc.compile(p)");
                if info.create_exec_code {
                    push_line(body, "print(qc.run(ex))");
                }
            }
            None => {
                push_shots(body, options);
                push_line(body, &format!("qc = get_qc('{}q-qvm')", info.qubits));
                push_seed(body, options);
                if info.create_exec_code {
                    body.push('\n');
                    push_line(body, "print(qc.run(p))");
                } else {
                    push_line(body, "ex = p");
                }
            }
        }
    }

    fn assemble(&self) -> String {
        let mut code = String::new();
        code.push_str(&self.imports);
        code.push('\n');

        if !self.custom.is_empty() {
            for section in [
                &self.custom.params,
                &self.custom.matrices,
                &self.custom.declarations,
            ] {
                code.push_str(section);
                code.push('\n');
            }
            code.push_str(&self.custom.constructors);
            code.push_str("\n\n");
        }

        code.push_str(&self.head);
        code.push('\n');

        if !self.custom.is_empty() {
            code.push_str(&self.custom.appends);
            code.push_str("\n\n");
        }

        code.push_str(&self.body);
        code
    }
}

impl EventSink for PyquilBackend<'_> {
    fn on_start(&mut self, info: &CircuitInfo) -> ConvertResult<()> {
        self.imports.clear();
        self.head.clear();
        self.body.clear();
        self.custom = CustomGates::default();
        self.output = None;

        push_line(&mut self.imports, "from pyquil import Program, get_qc");
        push_line(&mut self.imports, "from pyquil.gates import *");
        if info.return_state_vector {
            push_line(&mut self.imports, "from pyquil.api import WavefunctionSimulator");
        }

        let rewiring = self
            .device_lattice()
            .is_some_and(|l| l != STATEVECTOR_SIMULATOR);
        if rewiring {
            push_line(&mut self.head, "p = Program('PRAGMA INITIAL_REWIRING \"PARTIAL\"')");
        } else {
            push_line(&mut self.head, "p = Program()");
        }

        let slots = info.memory_slots;
        if slots > 0 {
            let head = &mut self.head;
            head.push('\n');
            if !info.classical_control_present || slots == 1 {
                push_line(head, &format!("ro = p.declare('ro', memory_type='BIT', memory_size={slots})"));
            } else {
                push_line(head, &format!("sha_reg = p.declare('sha_reg', memory_type='INTEGER', memory_size={slots})"));
                push_line(head, &format!("int_reg = p.declare('int_reg', memory_type='INTEGER', memory_size={slots})"));
                push_line(
                    head,
                    &format!("ro = p.declare('ro', memory_type='BIT', memory_size={slots}, shared_region='sha_reg')"),
                );
            }
            if info.classical_control_present {
                push_line(head, "bit_reg = p.declare('bit_reg', memory_type='BIT', memory_size=1)");
            }
        }

        self.info = Some(info.clone());
        Ok(())
    }

    fn on_gate(&mut self, gate: &GateEvent) -> ConvertResult<()> {
        let memory_slots = self.info()?.memory_slots;
        let resolved = resolve_export(gate, ExportTarget::Pyquil, self.table, self.evaluator)?;

        let custom_array = resolved.export.custom_array().map(str::to_string);
        if let Some(array) = &custom_array {
            self.declare_custom_gate(&resolved, array);
        }

        let mut args = Vec::with_capacity(resolved.export.params.len());
        for param in &resolved.export.params {
            let value = resolved.params.get(param).ok_or_else(|| {
                ConvertError::Lookup(format!(
                    "Param \"{param}\" not specified for gate \"{}\"",
                    resolved.name
                ))
            })?;
            args.push(format_param(value));
        }
        let qubits = gate
            .qubits
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let callee = if custom_array.is_some() {
            resolved.name.as_str()
        } else {
            resolved.export.name.as_deref().unwrap_or(&resolved.name)
        };
        let call = match (args.is_empty(), custom_array.is_some()) {
            (true, _) => format!("{callee}({qubits})"),
            (false, true) => format!("{callee}({})({qubits})", args.join(", ")),
            (false, false) => format!("{callee}({}, {qubits})", args.join(", ")),
        };

        match &gate.condition {
            Some(condition) => {
                self.emit_condition(condition, memory_slots)?;
                push_line(&mut self.body, &format!("p.if_then(bit_reg, Program({call}))"));
                self.body.push('\n');
            }
            None => push_line(&mut self.body, &format!("p += {call}")),
        }
        Ok(())
    }

    fn on_measure(&mut self, measure: &MeasureEvent) -> ConvertResult<()> {
        self.info()?;
        push_line(
            &mut self.body,
            &format!("p += MEASURE({}, ro[{}])", measure.qubit, measure.memory),
        );
        Ok(())
    }

    fn on_end(&mut self) -> ConvertResult<()> {
        let info = self.info()?.clone();
        self.emit_trailer(&info);
        self.output = Some(self.assemble());
        Ok(())
    }
}

impl Backend for PyquilBackend<'_> {
    type Output = String;

    fn into_output(self) -> ConvertResult<String> {
        self.output
            .ok_or_else(|| ConvertError::InvalidState("pyQuil listing requested before the circuit ended".into()))
    }
}

fn push_line(buf: &mut String, line: &str) {
    buf.push_str(line);
    buf.push('\n');
}

fn push_shots(body: &mut String, options: &ConvertOptions) {
    if let Some(shots) = options.multishot() {
        push_line(body, &format!("p.wrap_in_numshots_loop({shots})"));
        body.push('\n');
    }
}

/// A zero seed leaves the simulator unseeded.
fn push_seed(body: &mut String, options: &ConvertOptions) {
    if let Some(seed) = options.seed.filter(|&seed| seed != 0) {
        push_line(body, &format!("qc.qam.random_seed = {seed}"));
    }
}

/// Python literal for a gate argument, as `repr` would print it.
fn format_param(value: Value) -> String {
    match value {
        Value::Real(v) => python_float(v),
        Value::Complex(c) => {
            let im = format!("{}j", python_component(c.im));
            if c.re == 0.0 && c.re.is_sign_positive() {
                im
            } else if c.im.is_sign_negative() || c.im.is_nan() {
                format!("({}{im})", python_component(c.re))
            } else {
                format!("({}+{im})", python_component(c.re))
            }
        }
    }
}

/// Float `repr`: `1.0`, `0.5`, `1e-07`, `1e+16`.
///
/// `{:?}` switches to exponent notation at the same magnitudes as Python;
/// only the exponent needs a sign and two digits.
fn python_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    let debug = format!("{v:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

/// Float as a complex component: integral values drop the `.0`.
fn python_component(v: f64) -> String {
    let repr = python_float(v);
    match repr.strip_suffix(".0") {
        Some(integral) => integral.to_string(),
        None => repr,
    }
}
