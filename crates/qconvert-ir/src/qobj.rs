//! Qobj document model.
//!
//! Only the fields the converter interprets are modelled; anything else in
//! the document (`qobj_id`, `config`, per-experiment `config`, ...) is
//! ignored on deserialization.

use serde::{Deserialize, Serialize};

/// A Qobj document: a list of experiments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Qobj {
    /// Experiments, converted independently and in order.
    #[serde(default)]
    pub experiments: Vec<Experiment>,
}

/// One circuit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Circuit header. Required for conversion.
    #[serde(default)]
    pub header: Option<ExperimentHeader>,
    /// Flat instruction list.
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

impl Experiment {
    /// Whether any instruction declares a classical condition.
    pub fn has_classical_control(&self) -> bool {
        self.instructions
            .iter()
            .any(|inst| inst.name == Instruction::BFUNC)
    }
}

/// Experiment header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentHeader {
    /// Number of qubits.
    #[serde(default)]
    pub n_qubits: u32,
    /// Number of measurement-memory slots.
    #[serde(default)]
    pub memory_slots: u64,
    /// Classical registers as `[name, length]` pairs, in declaration order.
    #[serde(default)]
    pub creg_sizes: Vec<(String, u32)>,
}

/// A single Qobj instruction.
///
/// The instruction name selects which of the optional fields are meaningful;
/// see [`Instruction::kind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Instruction or gate name.
    #[serde(default)]
    pub name: String,
    /// Target qubits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qubits: Vec<u32>,
    /// Numeric gate parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
    /// Measurement destinations, parallel to `qubits`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memory: Vec<u64>,
    /// `bfunc` mask, radix-prefixed (e.g. `"0x3"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    /// `bfunc` comparison value, radix-prefixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
    /// `bfunc` relation (usually `"=="`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    /// Condition identifier on a `bfunc`; register slots on a `measure`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register: Option<RegisterField>,
    /// Condition identifier a gate is conditioned on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<u64>,
}

/// The `register` field, whose shape depends on the instruction.
///
/// A `bfunc` names the condition it declares with a single integer. Qiskit
/// also writes the list of register slots on measurements in experiments
/// that use conditions; those are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegisterField {
    /// Condition identifier.
    Id(u64),
    /// Register slots.
    Slots(Vec<u64>),
}

impl RegisterField {
    /// The condition identifier, if the field holds a single integer.
    pub fn as_id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Slots(_) => None,
        }
    }
}

/// Classification of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    /// Classical condition declaration.
    ClassicalCondition,
    /// Measurement.
    Measure,
    /// Barrier.
    Barrier,
    /// Anything else is a gate.
    Gate,
}

impl Instruction {
    /// Name of the classical-condition instruction.
    pub const BFUNC: &'static str = "bfunc";
    /// Name of the measurement instruction.
    pub const MEASURE: &'static str = "measure";
    /// Name of the barrier instruction.
    pub const BARRIER: &'static str = "barrier";

    /// Create a gate instruction.
    pub fn gate(name: impl Into<String>, qubits: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            qubits,
            ..Self::default()
        }
    }

    /// Attach numeric parameters.
    #[must_use]
    pub fn with_params(mut self, params: Vec<f64>) -> Self {
        self.params = params;
        self
    }

    /// Condition the instruction on a declared condition.
    #[must_use]
    pub fn with_conditional(mut self, id: u64) -> Self {
        self.conditional = Some(id);
        self
    }

    /// Create a measurement of `qubits` into `memory`.
    pub fn measure(qubits: Vec<u32>, memory: Vec<u64>) -> Self {
        Self {
            name: Self::MEASURE.into(),
            qubits,
            memory,
            ..Self::default()
        }
    }

    /// Create a barrier.
    pub fn barrier(qubits: Vec<u32>) -> Self {
        Self::gate(Self::BARRIER, qubits)
    }

    /// Create a classical condition declaration.
    pub fn bfunc(register: u64, mask: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            name: Self::BFUNC.into(),
            mask: Some(mask.into()),
            val: Some(val.into()),
            relation: Some("==".into()),
            register: Some(RegisterField::Id(register)),
            ..Self::default()
        }
    }

    /// Classify the instruction by name.
    pub fn kind(&self) -> InstructionKind {
        match self.name.as_str() {
            Self::BFUNC => InstructionKind::ClassicalCondition,
            Self::MEASURE => InstructionKind::Measure,
            Self::BARRIER => InstructionKind::Barrier,
            _ => InstructionKind::Gate,
        }
    }
}

/// Canonical gate-table name for a Qobj gate name.
pub fn canonical_gate_name(name: &str) -> &str {
    match name {
        "iden" => "id",
        other => other,
    }
}
