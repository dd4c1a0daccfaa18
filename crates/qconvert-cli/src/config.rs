//! Conversion options from files and command-line flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use qconvert_core::{ConvertOptions, Format};

/// Destination formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// pyQuil program listing
    Pyquil,
    /// Toaster circuit JSON
    Toaster,
}

impl From<Target> for Format {
    fn from(target: Target) -> Self {
        match target {
            Target::Pyquil => Format::Pyquil,
            Target::Toaster => Format::Toaster,
        }
    }
}

/// Flags that override values from an options file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub lattice: Option<String>,
    pub shots: Option<u64>,
    pub seed: Option<u64>,
    pub as_qvm: bool,
    pub no_exec_code: bool,
    pub all_experiments: bool,
}

impl OptionOverrides {
    /// Apply the flags on top of `options`. Boolean flags only ever switch
    /// their option on (or, for `--no-exec-code`, off).
    pub fn apply(self, mut options: ConvertOptions) -> ConvertOptions {
        if let Some(lattice) = self.lattice {
            options.lattice = Some(lattice);
        }
        if let Some(shots) = self.shots {
            options.shots = Some(shots);
        }
        if let Some(seed) = self.seed {
            options.seed = Some(seed);
        }
        options.as_qvm |= self.as_qvm;
        options.all_experiments |= self.all_experiments;
        if self.no_exec_code {
            options.create_exec_code = false;
        }
        options
    }
}

/// Load options from a YAML or JSON file, chosen by extension.
pub fn load_options(path: &str) -> Result<ConvertOptions> {
    let path_obj = Path::new(path);
    let source =
        fs::read_to_string(path_obj).with_context(|| format!("Failed to read options file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid YAML options file: {path}")),
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON options file: {path}")),
        other => bail!("Unsupported options file extension '{other}' (expected yaml, yml or json)"),
    }
}

/// Resolve the effective options: file (if any), then flags.
pub fn resolve_options(file: Option<&str>, overrides: OptionOverrides) -> Result<ConvertOptions> {
    let base = match file {
        Some(path) => load_options(path)?,
        None => ConvertOptions::default(),
    };
    Ok(overrides.apply(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml() {
        let file = write_temp(".yaml", "lattice: Aspen-7-28Q-A\nshots: 100\nas_qvm: true\n");
        let opts = load_options(file.path().to_str().unwrap()).unwrap();
        assert_eq!(opts.lattice.as_deref(), Some("Aspen-7-28Q-A"));
        assert_eq!(opts.shots, Some(100));
        assert!(opts.as_qvm);
        assert!(opts.create_exec_code);
    }

    #[test]
    fn test_load_json() {
        let file = write_temp(".json", r#"{"create_exec_code": false, "seed": 3}"#);
        let opts = load_options(file.path().to_str().unwrap()).unwrap();
        assert!(!opts.create_exec_code);
        assert_eq!(opts.seed, Some(3));
    }

    #[test]
    fn test_unknown_extension() {
        let file = write_temp(".toml", "shots = 1");
        let err = load_options(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("toml"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_options("/nonexistent/options.yaml").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = write_temp(".yaml", "lattice: qasm_simulator\nshots: 10\n");
        let overrides = OptionOverrides {
            shots: Some(20),
            no_exec_code: true,
            ..OptionOverrides::default()
        };
        let opts = resolve_options(Some(file.path().to_str().unwrap()), overrides).unwrap();
        assert_eq!(opts.lattice.as_deref(), Some("qasm_simulator"));
        assert_eq!(opts.shots, Some(20));
        assert!(!opts.create_exec_code);
    }

    #[test]
    fn test_defaults_without_file() {
        let opts = resolve_options(None, OptionOverrides::default()).unwrap();
        assert_eq!(opts, ConvertOptions::default());
    }

    #[test]
    fn test_target_to_format() {
        assert_eq!(Format::from(Target::Pyquil), Format::Pyquil);
        assert_eq!(Format::from(Target::Toaster), Format::Toaster);
    }
}
