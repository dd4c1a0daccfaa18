//! Caller-supplied conversion options.

use serde::{Deserialize, Serialize};

/// Lattice name selecting the QVM with `N` qubits.
pub const QASM_SIMULATOR: &str = "qasm_simulator";

/// Lattice name selecting the wavefunction simulator.
pub const STATEVECTOR_SIMULATOR: &str = "statevector_simulator";

/// Options recognized by the interpreter and the backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Convert every experiment instead of only the first.
    pub all_experiments: bool,
    /// Append runnable code to program listings.
    pub create_exec_code: bool,
    /// Target device or simulator name.
    pub lattice: Option<String>,
    /// Let the QVM mimic the device named by `lattice`.
    pub as_qvm: bool,
    /// Random seed for the simulator.
    pub seed: Option<u64>,
    /// Number of shots.
    pub shots: Option<u64>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            all_experiments: false,
            create_exec_code: true,
            lattice: None,
            as_qvm: false,
            seed: None,
            shots: None,
        }
    }
}

impl ConvertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `all_experiments`.
    #[must_use]
    pub fn with_all_experiments(mut self, all: bool) -> Self {
        self.all_experiments = all;
        self
    }

    /// Set `create_exec_code`.
    #[must_use]
    pub fn with_exec_code(mut self, create: bool) -> Self {
        self.create_exec_code = create;
        self
    }

    /// Set the target lattice.
    #[must_use]
    pub fn with_lattice(mut self, lattice: impl Into<String>) -> Self {
        self.lattice = Some(lattice.into());
        self
    }

    /// Set `as_qvm`.
    #[must_use]
    pub fn with_as_qvm(mut self, as_qvm: bool) -> Self {
        self.as_qvm = as_qvm;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the shot count.
    #[must_use]
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = Some(shots);
        self
    }

    /// Whether the caller asked for the state vector.
    pub fn return_state_vector(&self) -> bool {
        self.lattice.as_deref() == Some(STATEVECTOR_SIMULATOR)
    }

    /// Shot count when more than one shot is requested.
    pub fn multishot(&self) -> Option<u64> {
        self.shots.filter(|s| *s > 1)
    }
}
