//! Qobj conversion for qconvert
//!
//! This crate walks the instructions of each Qobj experiment once, turning
//! them into a normalized event stream, and feeds that stream to a backend:
//!
//! - [`PyquilBackend`] produces a pyQuil program listing.
//! - [`ToasterBackend`] produces a toaster circuit JSON document.
//!
//! Gate names are resolved against a [`GateTable`], symbolic matrix cells are
//! evaluated with a shared [`Evaluator`], and conditional gates are
//! re-expressed against the flat measurement memory.
//!
//! # Example
//!
//! ```rust
//! use qconvert_core::{ConversionOutput, ConvertOptions, Format, convert};
//! use serde_json::json;
//!
//! let qobj = json!({
//!     "experiments": [{
//!         "header": {"n_qubits": 2, "memory_slots": 2, "creg_sizes": [["c", 2]]},
//!         "instructions": [
//!             {"name": "h", "qubits": [0]},
//!             {"name": "cx", "qubits": [0, 1]},
//!             {"name": "measure", "qubits": [0, 1], "memory": [0, 1]}
//!         ]
//!     }]
//! });
//!
//! let out = convert(Format::Qobj, &qobj, Format::Pyquil, &ConvertOptions::default()).unwrap();
//! let ConversionOutput::Pyquil(code) = &out[0] else { unreachable!() };
//! assert!(code.contains("p += CNOT(0, 1)"));
//! ```
//!
//! [`GateTable`]: qconvert_ir::GateTable
//! [`Evaluator`]: qconvert_expr::Evaluator

pub mod backend;
mod convert;
mod error;
mod event;
mod interpreter;
mod options;
mod resolve;

pub use backend::{PyquilBackend, ToasterBackend, ToasterCircuit};
pub use convert::{ConversionOutput, Converter, Format, convert, supported_gates};
pub use error::{ConvertError, ConvertResult};
pub use event::{
    Backend, CircuitInfo, Event, EventRecorder, EventSink, GateEvent, MeasureEvent,
};
pub use interpreter::{Interpreter, InterpreterState, evaluate_matrix};
pub use options::{ConvertOptions, QASM_SIMULATOR, STATEVECTOR_SIMULATOR};
pub use resolve::{ResolvedGate, resolve_export};
