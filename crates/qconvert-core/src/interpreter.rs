//! Instruction interpreter.
//!
//! Walks one experiment's instruction list once, in order, and turns it into
//! a stream of [`Event`]s for an [`EventSink`].

use qconvert_expr::{Bindings, Evaluator, Value};
use qconvert_ir::{
    ClassicalRegisterLayout, Condition, ConditionTable, Experiment, GateTable, Instruction,
    InstructionKind, MatrixCell, RegisterField, canonical_gate_name,
};
use tracing::{debug, instrument};

use crate::error::{ConvertError, ConvertResult};
use crate::event::{CircuitInfo, Event, EventSink, GateEvent, MeasureEvent};
use crate::options::ConvertOptions;

/// Interpreter life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    /// Ready to process an experiment.
    NotStarted,
    /// Processing instructions.
    InExperiment,
    /// Finished; must be reset before reuse.
    Ended,
}

/// Interprets one experiment at a time.
pub struct Interpreter<'a> {
    table: &'a GateTable,
    evaluator: &'a Evaluator,
    options: &'a ConvertOptions,
    state: InterpreterState,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter over a gate table and a shared evaluator.
    pub fn new(table: &'a GateTable, evaluator: &'a Evaluator, options: &'a ConvertOptions) -> Self {
        Self {
            table,
            evaluator,
            options,
            state: InterpreterState::NotStarted,
        }
    }

    /// Current state.
    pub fn state(&self) -> InterpreterState {
        self.state
    }

    /// Return to [`InterpreterState::NotStarted`].
    pub fn reset(&mut self) {
        self.state = InterpreterState::NotStarted;
    }

    /// Interpret `experiment`, pushing events into `sink`.
    ///
    /// Stops at the first error; the interpreter then stays in
    /// [`InterpreterState::InExperiment`] until reset.
    #[instrument(skip_all, fields(instructions = experiment.instructions.len()))]
    pub fn run(&mut self, experiment: &Experiment, sink: &mut dyn EventSink) -> ConvertResult<()> {
        if self.state != InterpreterState::NotStarted {
            return Err(ConvertError::InvalidState(format!(
                "interpreter is {:?}, reset it before running another experiment",
                self.state
            )));
        }

        let header = experiment
            .header
            .as_ref()
            .ok_or_else(|| ConvertError::MalformedInput("Qobj header not found".into()))?;

        let info = CircuitInfo {
            qubits: header.n_qubits,
            memory_slots: header.memory_slots,
            cregs: ClassicalRegisterLayout::build(header)?,
            return_state_vector: self.options.return_state_vector(),
            create_exec_code: self.options.create_exec_code,
            classical_control_present: experiment.has_classical_control(),
        };
        debug!(
            qubits = info.qubits,
            memory_slots = info.memory_slots,
            cregs = info.cregs.registers().len(),
            "starting experiment"
        );

        self.state = InterpreterState::InExperiment;
        sink.handle(&Event::CircuitStart(info.clone()))?;

        let mut conditions = ConditionTable::new();

        for instruction in &experiment.instructions {
            sink.on_instruction(instruction)?;

            match instruction.kind() {
                InstructionKind::ClassicalCondition => {
                    let (id, condition) = decode_condition(instruction, &info.cregs)?;
                    conditions.declare(id, condition);
                }
                InstructionKind::Measure => {
                    for event in measure_events(instruction, &info.cregs)? {
                        sink.handle(&Event::Measure(event))?;
                    }
                }
                InstructionKind::Barrier => {
                    sink.handle(&Event::Barrier {
                        qubits: instruction.qubits.clone(),
                    })?;
                }
                InstructionKind::Gate => {
                    let gate = self.gate_event(instruction, &conditions)?;
                    sink.handle(&Event::Gate(gate))?;
                }
            }
        }

        sink.handle(&Event::CircuitEnd)?;
        self.state = InterpreterState::Ended;
        Ok(())
    }

    fn gate_event(
        &self,
        instruction: &Instruction,
        conditions: &ConditionTable,
    ) -> ConvertResult<GateEvent> {
        let name = canonical_gate_name(&instruction.name).to_string();
        let definition = self.table.get(&name).cloned();

        let mut bound = Bindings::new();
        let mut matrix = None;

        if let Some(def) = &definition {
            if !def.params.is_empty() {
                if instruction.params.len() != def.params.len() {
                    return Err(ConvertError::ParameterCount {
                        gate: name,
                        expected: def.params.len(),
                        got: instruction.params.len(),
                    });
                }
                for (param, value) in def.params.iter().zip(&instruction.params) {
                    bound.insert(param, *value);
                }
            }

            if let Some(cells) = &def.matrix {
                matrix = Some(evaluate_matrix(self.evaluator, &name, cells, &bound)?);
            }
        } else {
            debug!(gate = %name, "no definition for gate");
        }

        let condition = instruction
            .conditional
            .map(|id| conditions.get(id).cloned())
            .transpose()?;

        Ok(GateEvent {
            name,
            definition,
            matrix,
            params: instruction.params.clone(),
            bound,
            qubits: instruction.qubits.clone(),
            condition,
        })
    }
}

/// Evaluate every cell of a symbolic matrix.
pub fn evaluate_matrix(
    evaluator: &Evaluator,
    gate: &str,
    cells: &[Vec<MatrixCell>],
    bound: &Bindings,
) -> ConvertResult<Vec<Vec<Value>>> {
    cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    MatrixCell::Number(v) => Ok(Value::Real(*v)),
                    MatrixCell::Expression(source) => evaluator
                        .evaluate(source, bound)
                        .map_err(|error| ConvertError::Evaluation {
                            gate: gate.to_string(),
                            error,
                        }),
                })
                .collect()
        })
        .collect()
}

fn decode_condition(
    instruction: &Instruction,
    layout: &ClassicalRegisterLayout,
) -> ConvertResult<(u64, Condition)> {
    let missing = |field: &str| {
        ConvertError::MalformedInput(format!("bfunc instruction without '{field}'"))
    };
    let id = match &instruction.register {
        Some(RegisterField::Id(id)) => *id,
        Some(RegisterField::Slots(_)) => {
            return Err(ConvertError::MalformedInput(
                "bfunc 'register' must be a single integer".into(),
            ));
        }
        None => return Err(missing("register")),
    };
    let mask = instruction.mask.as_deref().ok_or_else(|| missing("mask"))?;
    let val = instruction.val.as_deref().ok_or_else(|| missing("val"))?;

    let condition = Condition::decode(mask, val, instruction.relation.as_deref(), layout)?;
    debug!(
        id,
        creg = %condition.creg_name,
        value = %condition.creg_value,
        "declared classical condition"
    );
    Ok((id, condition))
}

fn measure_events(
    instruction: &Instruction,
    layout: &ClassicalRegisterLayout,
) -> ConvertResult<Vec<MeasureEvent>> {
    if instruction.qubits.len() != instruction.memory.len() {
        return Err(ConvertError::MalformedInput(format!(
            "measure has {} qubits but {} memory slots",
            instruction.qubits.len(),
            instruction.memory.len()
        )));
    }

    instruction
        .qubits
        .iter()
        .zip(&instruction.memory)
        .map(|(&qubit, &memory)| {
            let resolved = layout.resolve_memory_bit(memory)?;
            Ok(MeasureEvent {
                qubit,
                memory,
                creg_name: resolved.register.name.clone(),
                creg_bit: resolved.bit,
            })
        })
        .collect()
}
