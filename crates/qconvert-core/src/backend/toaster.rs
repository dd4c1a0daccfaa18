//! Toaster circuit JSON backend.

use qconvert_expr::Value;
use serde::Serialize;

use crate::error::{ConvertError, ConvertResult};
use crate::event::{Backend, CircuitInfo, EventSink, GateEvent, MeasureEvent};

/// A circuit in toaster format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToasterCircuit {
    /// Number of qubits.
    pub qubits: u32,
    /// Classical registers in declaration order.
    pub cregs: Vec<ToasterCreg>,
    /// Gates and measurements in instruction order.
    pub program: Vec<ToasterGate>,
}

/// Classical register declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToasterCreg {
    pub name: String,
    pub len: u32,
}

/// One program entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToasterGate {
    /// Gate name, or `"measure"`.
    pub name: String,
    /// Target qubits.
    pub wires: Vec<u32>,
    pub options: ToasterOptions,
    /// Evaluated unitary; empty for measurements and matrix-less gates.
    pub matrix: Vec<Vec<Value>>,
}

/// Entry options. Serializes as `{}` when nothing is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToasterOptions {
    /// Measurement destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creg: Option<ToasterCregBit>,
    /// Classical condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ToasterCondition>,
}

/// Register bit receiving a measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToasterCregBit {
    pub name: String,
    pub bit: u32,
}

/// Condition as register name and register-relative value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToasterCondition {
    pub creg: String,
    pub value: u128,
}

/// Builds one [`ToasterCircuit`] per experiment.
#[derive(Debug, Default)]
pub struct ToasterBackend {
    circuit: Option<ToasterCircuit>,
    ended: bool,
}

impl ToasterBackend {
    /// Create a backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn circuit(&mut self) -> ConvertResult<&mut ToasterCircuit> {
        self.circuit
            .as_mut()
            .ok_or_else(|| ConvertError::InvalidState("toaster backend received an event before the circuit started".into()))
    }
}

impl EventSink for ToasterBackend {
    fn on_start(&mut self, info: &CircuitInfo) -> ConvertResult<()> {
        let cregs = info
            .cregs
            .registers()
            .iter()
            .map(|r| ToasterCreg {
                name: r.name.clone(),
                len: r.len,
            })
            .collect();
        self.circuit = Some(ToasterCircuit {
            qubits: info.qubits,
            cregs,
            program: Vec::new(),
        });
        self.ended = false;
        Ok(())
    }

    fn on_gate(&mut self, gate: &GateEvent) -> ConvertResult<()> {
        if gate.definition.is_none() {
            return Err(ConvertError::Lookup(format!(
                "Definition not found for gate \"{}\"",
                gate.name
            )));
        }

        let condition = gate.condition.as_ref().map(|c| ToasterCondition {
            creg: c.creg_name.clone(),
            value: c.creg_value,
        });
        let entry = ToasterGate {
            name: gate.name.clone(),
            wires: gate.qubits.clone(),
            options: ToasterOptions {
                creg: None,
                condition,
            },
            matrix: gate.matrix.clone().unwrap_or_default(),
        };
        self.circuit()?.program.push(entry);
        Ok(())
    }

    fn on_measure(&mut self, measure: &MeasureEvent) -> ConvertResult<()> {
        let entry = ToasterGate {
            name: "measure".into(),
            wires: vec![measure.qubit],
            options: ToasterOptions {
                creg: Some(ToasterCregBit {
                    name: measure.creg_name.clone(),
                    bit: measure.creg_bit,
                }),
                condition: None,
            },
            matrix: Vec::new(),
        };
        self.circuit()?.program.push(entry);
        Ok(())
    }

    fn on_end(&mut self) -> ConvertResult<()> {
        self.circuit()?;
        self.ended = true;
        Ok(())
    }
}

impl Backend for ToasterBackend {
    type Output = ToasterCircuit;

    fn into_output(self) -> ConvertResult<ToasterCircuit> {
        match self.circuit {
            Some(circuit) if self.ended => Ok(circuit),
            _ => Err(ConvertError::InvalidState(
                "toaster circuit requested before the circuit ended".into(),
            )),
        }
    }
}
