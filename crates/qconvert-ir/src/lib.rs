//! qconvert Intermediate Representation
//!
//! Data structures shared by the instruction interpreter and the backends:
//!
//! - **Qobj model**: [`Qobj`], [`Experiment`], [`ExperimentHeader`] and
//!   [`Instruction`], deserialized with serde.
//! - **Gate definitions**: [`GateTable`] maps gate names to [`GateDef`]s
//!   carrying parameter names, a symbolic unitary and per-target
//!   [`ExportInfo`]. A versioned table is compiled in
//!   ([`GateTable::builtin`]); external tables use the same JSON schema.
//! - **Classical registers**: [`ClassicalRegisterLayout`] maps named
//!   registers onto the flat measurement memory, and [`ConditionTable`]
//!   records the register comparisons declared by `bfunc` instructions.
//!
//! # Example
//!
//! ```rust
//! use qconvert_ir::{ClassicalRegisterLayout, ExperimentHeader};
//!
//! let header = ExperimentHeader {
//!     n_qubits: 3,
//!     memory_slots: 3,
//!     creg_sizes: vec![("a".into(), 1), ("b".into(), 2)],
//! };
//! let layout = ClassicalRegisterLayout::build(&header).unwrap();
//! assert_eq!(layout.get("b").unwrap().mask, 0b110);
//!
//! let bit = layout.resolve_memory_bit(2).unwrap();
//! assert_eq!((bit.register.name.as_str(), bit.bit), ("b", 1));
//! ```

pub mod condition;
pub mod creg;
pub mod error;
pub mod gate;
pub mod qobj;

pub use condition::{Condition, ConditionTable, parse_radix_int};
pub use creg::{ClassicalRegister, ClassicalRegisterLayout, MAX_MEMORY_BITS, RegisterBit};
pub use error::{IrError, IrResult};
pub use gate::{ExportInfo, ExportTarget, GateDef, GateTable, MatrixCell, Replacement};
pub use qobj::{
    Experiment, ExperimentHeader, Instruction, InstructionKind, Qobj, RegisterField,
    canonical_gate_name,
};
