//! Gates command implementation.

use anyhow::Result;
use console::style;
use qconvert_core::supported_gates;
use qconvert_ir::{ExportTarget, GateTable};

use super::common::load_gate_table;

/// Execute the gates command.
pub fn execute(gate_defs: Option<&str>) -> Result<()> {
    let table = load_gate_table(gate_defs)?;

    println!(
        "{} {} gates (definitions v{})",
        style("Supported").cyan().bold(),
        table.len(),
        table.version()
    );
    println!();

    for line in gate_lines(&table) {
        println!("  {line}");
    }

    Ok(())
}

/// One line per gate: name, parameters, pyQuil name, description.
fn gate_lines(table: &GateTable) -> Vec<String> {
    supported_gates(table)
        .into_iter()
        .filter_map(|name| {
            let def = table.get(&name)?;
            let params = if def.params.is_empty() {
                String::new()
            } else {
                format!("({})", def.params.join(", "))
            };
            let pyquil = match def.export_for(ExportTarget::Pyquil) {
                Some((_, info)) => match (&info.replacement, &info.name) {
                    (Some(r), _) => format!("-> {}", r.name),
                    (None, Some(n)) => n.clone(),
                    (None, None) => "-".to_string(),
                },
                None => "-".to_string(),
            };
            let description = def.description.as_deref().unwrap_or("");
            Some(format!(
                "{:<16} {:<12} {}",
                format!("{name}{params}"),
                pyquil,
                style(description).dim()
            ))
        })
        .collect()
}
