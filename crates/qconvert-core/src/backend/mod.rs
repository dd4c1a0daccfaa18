//! Backends turning interpreter events into target artifacts.
//!
//! | Backend | Output |
//! |---------|--------|
//! | [`PyquilBackend`] | pyQuil program listing (`String`) |
//! | [`ToasterBackend`] | [`ToasterCircuit`] JSON document |

mod pyquil;
mod toaster;

pub use pyquil::PyquilBackend;
pub use toaster::{
    ToasterBackend, ToasterCircuit, ToasterCondition, ToasterCreg, ToasterCregBit, ToasterGate,
    ToasterOptions,
};
