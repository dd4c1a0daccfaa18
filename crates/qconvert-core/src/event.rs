//! Normalized events produced by the interpreter and consumed by backends.

use std::sync::Arc;

use qconvert_expr::{Bindings, Value};
use qconvert_ir::{ClassicalRegisterLayout, Condition, GateDef, Instruction};

use crate::error::ConvertResult;

/// Per-experiment facts resolved before the first instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitInfo {
    /// Number of qubits.
    pub qubits: u32,
    /// Number of measurement-memory slots.
    pub memory_slots: u64,
    /// Classical register layout.
    pub cregs: ClassicalRegisterLayout,
    /// The caller asked for the state vector.
    pub return_state_vector: bool,
    /// The caller wants runnable code appended.
    pub create_exec_code: bool,
    /// At least one `bfunc` occurs in the experiment.
    pub classical_control_present: bool,
}

/// A gate application.
#[derive(Debug, Clone, PartialEq)]
pub struct GateEvent {
    /// Canonical gate name.
    pub name: String,
    /// Definition from the gate table; `None` for unknown gates.
    pub definition: Option<Arc<GateDef>>,
    /// Evaluated unitary, when the definition has one.
    pub matrix: Option<Vec<Vec<Value>>>,
    /// Raw numeric parameters from the instruction.
    pub params: Vec<f64>,
    /// Parameters bound to the definition's parameter names.
    pub bound: Bindings,
    /// Target qubits.
    pub qubits: Vec<u32>,
    /// Classical condition gating the gate.
    pub condition: Option<Condition>,
}

/// A single qubit measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureEvent {
    /// Measured qubit.
    pub qubit: u32,
    /// Global memory bit receiving the outcome.
    pub memory: u64,
    /// Register owning the memory bit.
    pub creg_name: String,
    /// Bit index inside the register.
    pub creg_bit: u32,
}

/// Backend-agnostic effect of one instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Start of an experiment.
    CircuitStart(CircuitInfo),
    /// Gate application.
    Gate(GateEvent),
    /// Measurement.
    Measure(MeasureEvent),
    /// Barrier over the given qubits.
    Barrier { qubits: Vec<u32> },
    /// End of the experiment.
    CircuitEnd,
}

/// Consumer of normalized events.
///
/// Backends implement one method per event variant; [`handle`](Self::handle)
/// dispatches an [`Event`] to the matching method.
pub trait EventSink {
    /// Experiment start.
    fn on_start(&mut self, info: &CircuitInfo) -> ConvertResult<()>;

    /// Raw instruction, seen before it is classified.
    fn on_instruction(&mut self, _instruction: &Instruction) -> ConvertResult<()> {
        Ok(())
    }

    /// Gate application.
    fn on_gate(&mut self, gate: &GateEvent) -> ConvertResult<()>;

    /// Measurement.
    fn on_measure(&mut self, measure: &MeasureEvent) -> ConvertResult<()>;

    /// Barrier.
    fn on_barrier(&mut self, _qubits: &[u32]) -> ConvertResult<()> {
        Ok(())
    }

    /// Experiment end.
    fn on_end(&mut self) -> ConvertResult<()>;

    /// Dispatch an event to its handler.
    fn handle(&mut self, event: &Event) -> ConvertResult<()> {
        match event {
            Event::CircuitStart(info) => self.on_start(info),
            Event::Gate(gate) => self.on_gate(gate),
            Event::Measure(measure) => self.on_measure(measure),
            Event::Barrier { qubits } => self.on_barrier(qubits),
            Event::CircuitEnd => self.on_end(),
        }
    }
}

/// Sink that records every event it receives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecorder {
    /// Recorded events, in arrival order.
    pub events: Vec<Event>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for EventRecorder {
    fn on_start(&mut self, info: &CircuitInfo) -> ConvertResult<()> {
        self.events.push(Event::CircuitStart(info.clone()));
        Ok(())
    }

    fn on_gate(&mut self, gate: &GateEvent) -> ConvertResult<()> {
        self.events.push(Event::Gate(gate.clone()));
        Ok(())
    }

    fn on_measure(&mut self, measure: &MeasureEvent) -> ConvertResult<()> {
        self.events.push(Event::Measure(measure.clone()));
        Ok(())
    }

    fn on_barrier(&mut self, qubits: &[u32]) -> ConvertResult<()> {
        self.events.push(Event::Barrier {
            qubits: qubits.to_vec(),
        });
        Ok(())
    }

    fn on_end(&mut self) -> ConvertResult<()> {
        self.events.push(Event::CircuitEnd);
        Ok(())
    }
}

/// A backend: an event sink that yields one result per experiment.
pub trait Backend: EventSink {
    /// Per-experiment artifact.
    type Output;

    /// Take the finished result. Fails if the experiment did not end.
    fn into_output(self) -> ConvertResult<Self::Output>;
}
