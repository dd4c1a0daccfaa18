//! Shared helpers for CLI commands.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use qconvert_ir::GateTable;

/// Load the gate definition table from `path`, or the built-in one.
pub fn load_gate_table(path: Option<&str>) -> Result<GateTable> {
    match path {
        Some(path) => GateTable::from_path(path)
            .with_context(|| format!("Failed to load gate definitions: {path}")),
        None => GateTable::builtin().context("Built-in gate definitions are invalid"),
    }
}

/// Read a JSON document from a file, or stdin for `-`.
pub fn read_json(path: &str) -> Result<serde_json::Value> {
    let source = if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    } else {
        if !Path::new(path).exists() {
            anyhow::bail!("File not found: {path}");
        }
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?
    };

    serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {path}"))
}

/// Write `text` to a file, or stdout when no path is given.
pub fn write_output(path: Option<&str>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write file: {path}"))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}
