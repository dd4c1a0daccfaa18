//! Gate definitions and the versioned gate definition table.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IrResult;

/// Built-in gate definition table.
const BUILTIN_GATE_DEFS: &str = include_str!("../data/gate_defs.json");

/// One cell of a symbolic unitary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatrixCell {
    /// Literal number.
    Number(f64),
    /// Expression over the gate's parameters, e.g. `"cos(theta / 2)"`.
    Expression(String),
}

/// Replacement of a gate by another gate with fixed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    /// Name of the replacement gate in the same table.
    pub name: String,
    /// Closed-form parameter formulas, keyed by the replacement gate's
    /// parameter names.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Export metadata of a gate for one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    /// Gate name in the target language.
    #[serde(default)]
    pub name: Option<String>,
    /// Parameter order in the target language.
    #[serde(default)]
    pub params: Vec<String>,
    /// Emit a different gate instead.
    #[serde(default)]
    pub replacement: Option<Replacement>,
    /// Numeric array source for a user-defined unitary declaration.
    #[serde(default)]
    pub array: Option<String>,
}

impl ExportInfo {
    /// The custom unitary array, if one is declared and non-empty.
    pub fn custom_array(&self) -> Option<&str> {
        self.array.as_deref().filter(|a| !a.is_empty())
    }
}

/// Export targets with metadata in the gate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportTarget {
    /// pyQuil program listing.
    Pyquil,
    /// Quil; the lower-level target pyQuil falls back to.
    Quil,
}

impl ExportTarget {
    /// Key of the target in a definition's `exportInfo` map.
    pub fn key(self) -> &'static str {
        match self {
            ExportTarget::Pyquil => "pyquil",
            ExportTarget::Quil => "quil",
        }
    }

    /// Lower-level target to use when this one has no entry.
    pub fn fallback(self) -> Option<ExportTarget> {
        match self {
            ExportTarget::Pyquil => Some(ExportTarget::Quil),
            ExportTarget::Quil => None,
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Canonical definition of a named gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateDef {
    /// Gate name (the table key).
    #[serde(default)]
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered parameter names.
    #[serde(default)]
    pub params: Vec<String>,
    /// Symbolic unitary, row-major.
    #[serde(default)]
    pub matrix: Option<Vec<Vec<MatrixCell>>>,
    /// Per-target export metadata.
    #[serde(default, rename = "exportInfo")]
    pub export_info: BTreeMap<String, ExportInfo>,
}

impl GateDef {
    /// Export metadata for `target`, following the fallback chain.
    pub fn export_for(&self, target: ExportTarget) -> Option<(ExportTarget, &ExportInfo)> {
        let mut current = Some(target);
        while let Some(t) = current {
            if let Some(info) = self.export_info.get(t.key()) {
                return Some((t, info));
            }
            current = t.fallback();
        }
        None
    }
}

/// On-disk layout of a gate table.
#[derive(Debug, Deserialize)]
struct GateTableFile {
    version: String,
    gates: BTreeMap<String, GateDef>,
}

/// Read-only, versioned gate definition table.
///
/// Definitions are reference counted so events can carry them cheaply.
#[derive(Debug, Clone)]
pub struct GateTable {
    version: String,
    gates: FxHashMap<String, Arc<GateDef>>,
}

impl GateTable {
    /// The table compiled into this crate.
    pub fn builtin() -> IrResult<Self> {
        Self::from_json_str(BUILTIN_GATE_DEFS)
    }

    /// Parse a table from JSON: `{"version": "...", "gates": {name: def}}`.
    pub fn from_json_str(json: &str) -> IrResult<Self> {
        let file: GateTableFile = serde_json::from_str(json)?;
        let gates = file
            .gates
            .into_iter()
            .map(|(name, mut def)| {
                def.name.clone_from(&name);
                (name, Arc::new(def))
            })
            .collect::<FxHashMap<_, _>>();
        debug!(
            version = %file.version,
            gates = gates.len(),
            "loaded gate definition table"
        );
        Ok(Self {
            version: file.version,
            gates,
        })
    }

    /// Load a table from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> IrResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Table version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up a definition by exact name.
    pub fn get(&self, name: &str) -> Option<&Arc<GateDef>> {
        self.gates.get(name)
    }

    /// Whether a gate is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.gates.contains_key(name)
    }

    /// Sorted gate names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.gates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}
