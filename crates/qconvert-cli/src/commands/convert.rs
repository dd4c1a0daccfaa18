//! Convert command implementation.

use anyhow::{Context, Result};
use console::style;
use qconvert_core::{ConversionOutput, Converter, Format};
use tracing::warn;

use super::common::{load_gate_table, read_json, write_output};
use crate::config::{OptionOverrides, Target, resolve_options};

/// Execute the convert command.
pub fn execute(
    input: &str,
    output: Option<&str>,
    to: Target,
    options_file: Option<&str>,
    overrides: OptionOverrides,
    gate_defs: Option<&str>,
) -> Result<()> {
    let dest = Format::from(to);
    eprintln!(
        "{} Converting {} to {}",
        style("→").cyan().bold(),
        style(input).green(),
        style(dest).yellow()
    );

    let options = resolve_options(options_file, overrides)?;
    let table = load_gate_table(gate_defs)?;
    let qobj = read_json(input)?;

    let converter = Converter::new(table);
    let outputs = converter
        .convert(Format::Qobj, &qobj, dest, &options)
        .with_context(|| format!("Failed to convert {input}"))?;

    if outputs.is_empty() {
        warn!("document contains no experiments");
        eprintln!("{} No experiments to convert", style("!").yellow().bold());
        return Ok(());
    }

    let text = render(&outputs, options.all_experiments)?;
    write_output(output, &text)?;

    eprintln!(
        "{} Converted {} experiment(s)",
        style("✓").green().bold(),
        outputs.len()
    );
    if let Some(path) = output {
        eprintln!("  Output: {}", style(path).green());
    }

    Ok(())
}

/// Render conversion results.
///
/// A single result is written as-is. With `all_experiments`, results are
/// written as a JSON array: listings as strings, toaster circuits as objects.
pub fn render(outputs: &[ConversionOutput], all_experiments: bool) -> Result<String> {
    if !all_experiments {
        if let [single] = outputs {
            return Ok(single.to_text()?);
        }
    }

    let values = outputs
        .iter()
        .map(|o| match o {
            ConversionOutput::Pyquil(code) => Ok(serde_json::Value::String(code.clone())),
            ConversionOutput::Toaster(circuit) => serde_json::to_value(circuit),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::to_string_pretty(&values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qconvert_core::{ConvertOptions, convert};
    use serde_json::json;

    fn outputs(dest: Format, all: bool) -> Vec<ConversionOutput> {
        let experiment = json!({
            "header": {"n_qubits": 1, "memory_slots": 1, "creg_sizes": [["c", 1]]},
            "instructions": [
                {"name": "h", "qubits": [0]},
                {"name": "measure", "qubits": [0], "memory": [0]}
            ]
        });
        let input = json!({"experiments": [experiment.clone(), experiment]});
        let options = ConvertOptions::default().with_all_experiments(all);
        convert(Format::Qobj, &input, dest, &options).unwrap()
    }

    #[test]
    fn test_render_single_listing() {
        let text = render(&outputs(Format::Pyquil, false), false).unwrap();
        assert!(text.starts_with("from pyquil import Program, get_qc\n"));
    }

    #[test]
    fn test_render_single_toaster() {
        let text = render(&outputs(Format::Toaster, false), false).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["qubits"], 1);
    }

    #[test]
    fn test_render_all_as_array() {
        let text = render(&outputs(Format::Toaster, true), true).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc.as_array().unwrap().len(), 2);
        assert_eq!(doc[1]["program"][1]["name"], "measure");

        let text = render(&outputs(Format::Pyquil, true), true).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(doc[0].as_str().unwrap().contains("p += H(0)"));
    }
}
