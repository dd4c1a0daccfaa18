//! Conversion entry points.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use qconvert_expr::Evaluator;
use qconvert_ir::{Experiment, GateTable, Qobj};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::backend::{PyquilBackend, ToasterBackend, ToasterCircuit};
use crate::error::{ConvertError, ConvertResult};
use crate::event::Backend;
use crate::interpreter::Interpreter;
use crate::options::ConvertOptions;

/// Document formats known to the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Qobj JSON.
    Qobj,
    /// pyQuil program listing.
    Pyquil,
    /// Toaster circuit JSON.
    Toaster,
}

impl Format {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Qobj => "qobj",
            Format::Pyquil => "pyquil",
            Format::Toaster => "toaster",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qobj" => Ok(Format::Qobj),
            "pyquil" => Ok(Format::Pyquil),
            "toaster" => Ok(Format::Toaster),
            other => Err(format!("unknown format '{other}'")),
        }
    }
}

/// Result of converting one experiment.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutput {
    /// pyQuil listing.
    Pyquil(String),
    /// Toaster circuit.
    Toaster(ToasterCircuit),
}

impl ConversionOutput {
    /// Textual form: the listing itself, or compact JSON.
    pub fn to_text(&self) -> ConvertResult<String> {
        match self {
            ConversionOutput::Pyquil(code) => Ok(code.clone()),
            ConversionOutput::Toaster(circuit) => Ok(serde_json::to_string(circuit)?),
        }
    }
}

/// Converter sharing one gate table and one expression cache across
/// requests.
#[derive(Debug, Clone)]
pub struct Converter {
    table: Arc<GateTable>,
    evaluator: Arc<Evaluator>,
}

impl Converter {
    /// Converter over the built-in gate table.
    pub fn builtin() -> ConvertResult<Self> {
        let table = GateTable::builtin().map_err(ConvertError::GateTable)?;
        Ok(Self::new(table))
    }

    /// Converter over `table` with a fresh expression cache.
    pub fn new(table: GateTable) -> Self {
        Self::with_shared(Arc::new(table), Arc::new(Evaluator::new()))
    }

    /// Converter over shared resources.
    pub fn with_shared(table: Arc<GateTable>, evaluator: Arc<Evaluator>) -> Self {
        Self { table, evaluator }
    }

    /// Gate definition table.
    pub fn table(&self) -> &GateTable {
        &self.table
    }

    /// Shared expression evaluator.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Convert a Qobj document between formats.
    #[instrument(skip(self, input, options))]
    pub fn convert(
        &self,
        source: Format,
        input: &serde_json::Value,
        dest: Format,
        options: &ConvertOptions,
    ) -> ConvertResult<Vec<ConversionOutput>> {
        match (source, dest) {
            (Format::Qobj, Format::Pyquil) => {
                let qobj = Qobj::deserialize(input)?;
                Ok(self
                    .qobj_to_pyquil(&qobj, options)?
                    .into_iter()
                    .map(ConversionOutput::Pyquil)
                    .collect())
            }
            (Format::Qobj, Format::Toaster) => {
                let qobj = Qobj::deserialize(input)?;
                Ok(self
                    .qobj_to_toaster(&qobj, options)?
                    .into_iter()
                    .map(ConversionOutput::Toaster)
                    .collect())
            }
            (from, to) => Err(ConvertError::UnsupportedConversion { from, to }),
        }
    }

    /// pyQuil listings, one per converted experiment.
    pub fn qobj_to_pyquil(&self, qobj: &Qobj, options: &ConvertOptions) -> ConvertResult<Vec<String>> {
        self.run(qobj, options, Format::Pyquil, || {
            PyquilBackend::new(&self.table, &self.evaluator, options)
        })
    }

    /// Toaster circuits, one per converted experiment.
    pub fn qobj_to_toaster(
        &self,
        qobj: &Qobj,
        options: &ConvertOptions,
    ) -> ConvertResult<Vec<ToasterCircuit>> {
        self.run(qobj, options, Format::Toaster, ToasterBackend::new)
    }

    fn run<B, F>(
        &self,
        qobj: &Qobj,
        options: &ConvertOptions,
        dest: Format,
        mut backend: F,
    ) -> ConvertResult<Vec<B::Output>>
    where
        B: Backend,
        F: FnMut() -> B,
    {
        let experiments: &[Experiment] = if options.all_experiments {
            &qobj.experiments
        } else {
            qobj.experiments.get(..1).unwrap_or_default()
        };
        info!(
            experiments = experiments.len(),
            available = qobj.experiments.len(),
            %dest,
            "converting Qobj"
        );

        let mut interpreter = Interpreter::new(&self.table, &self.evaluator, options);
        let mut outputs = Vec::with_capacity(experiments.len());
        for (index, experiment) in experiments.iter().enumerate() {
            debug!(index, "converting experiment");
            let mut sink = backend();
            interpreter.reset();
            interpreter.run(experiment, &mut sink)?;
            outputs.push(sink.into_output()?);
        }

        let stats = self.evaluator.stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            cached = stats.entries,
            "expression cache"
        );
        Ok(outputs)
    }
}

/// Convert `input` from `source` to `dest` with the built-in gate table.
pub fn convert(
    source: Format,
    input: &serde_json::Value,
    dest: Format,
    options: &ConvertOptions,
) -> ConvertResult<Vec<ConversionOutput>> {
    Converter::builtin()?.convert(source, input, dest, options)
}

/// Names of every gate in `table`, sorted.
pub fn supported_gates(table: &GateTable) -> Vec<String> {
    table.names().into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bell(name: &str) -> serde_json::Value {
        json!({
            "header": {"n_qubits": 2, "memory_slots": 2, "creg_sizes": [["c", 2]], "name": name},
            "instructions": [
                {"name": "h", "qubits": [0]},
                {"name": "cx", "qubits": [0, 1]},
                {"name": "measure", "qubits": [0, 1], "memory": [0, 1]}
            ]
        })
    }

    #[test]
    fn test_format_round_trip() {
        for f in [Format::Qobj, Format::Pyquil, Format::Toaster] {
            assert_eq!(f.to_string().parse::<Format>().unwrap(), f);
        }
        assert!("quil".parse::<Format>().is_err());
    }

    #[test]
    fn test_unsupported_pairs() {
        let input = json!({"experiments": []});
        let options = ConvertOptions::default();
        for (source, dest) in [
            (Format::Pyquil, Format::Toaster),
            (Format::Qobj, Format::Qobj),
            (Format::Toaster, Format::Pyquil),
        ] {
            let err = convert(source, &input, dest, &options).unwrap_err();
            assert!(matches!(err, ConvertError::UnsupportedConversion { .. }));
        }
    }

    #[test]
    fn test_first_experiment_only_by_default() {
        let input = json!({"experiments": [bell("a"), bell("b"), bell("c")]});
        let options = ConvertOptions::default();
        let out = convert(Format::Qobj, &input, Format::Toaster, &options).unwrap();
        assert_eq!(out.len(), 1);

        let all = options.with_all_experiments(true);
        let out = convert(Format::Qobj, &input, Format::Pyquil, &all).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|o| matches!(o, ConversionOutput::Pyquil(_))));
    }

    #[test]
    fn test_later_failure_aborts_request() {
        let broken = json!({"instructions": []});
        let input = json!({"experiments": [bell("a"), broken]});
        let options = ConvertOptions::default().with_all_experiments(true);
        let err = convert(Format::Qobj, &input, Format::Toaster, &options).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedInput(ref m) if m == "Qobj header not found"));
    }

    #[test]
    fn test_invalid_document() {
        let input = json!({"experiments": 5});
        let err = convert(Format::Qobj, &input, Format::Toaster, &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Json(_)));
    }

    #[test]
    fn test_toaster_text_is_compact_json() {
        let input = json!({"experiments": [bell("a")]});
        let out = convert(Format::Qobj, &input, Format::Toaster, &ConvertOptions::default()).unwrap();
        let text = out[0].to_text().unwrap();
        assert!(!text.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["qubits"], 2);
    }

    #[test]
    fn test_shared_cache_is_reused() {
        let converter = Converter::builtin().unwrap();
        let input = json!({"experiments": [{
            "header": {"n_qubits": 1, "memory_slots": 0, "creg_sizes": []},
            "instructions": [{"name": "u1", "qubits": [0], "params": [0.5]}]
        }]});
        let options = ConvertOptions::default();
        converter.convert(Format::Qobj, &input, Format::Toaster, &options).unwrap();
        let after_first = converter.evaluator().stats();
        converter.convert(Format::Qobj, &input, Format::Toaster, &options).unwrap();
        let after_second = converter.evaluator().stats();
        assert_eq!(after_first.entries, after_second.entries);
        assert!(after_second.hits > after_first.hits);
    }

    #[test]
    fn test_supported_gates_sorted() {
        let table = GateTable::builtin().unwrap();
        let gates = supported_gates(&table);
        assert_eq!(gates.len(), table.len());
        assert!(gates.windows(2).all(|w| w[0] < w[1]));
        assert!(gates.contains(&"u3".to_string()));
    }
}
