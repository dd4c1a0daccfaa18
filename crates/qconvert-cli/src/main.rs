//! qconvert Command-Line Interface
//!
//! Converts Qobj documents into pyQuil programs or toaster circuits.
//!
//! ```text
//! qconvert convert -i bell.qobj.json --to pyquil --shots 1024
//! qconvert convert -i bell.qobj.json --to toaster -o bell.toaster.json
//! qconvert gates
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{convert, gates, version};
use config::{OptionOverrides, Target};

/// qconvert - Qobj to pyQuil and toaster conversion
#[derive(Parser)]
#[command(name = "qconvert")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Qobj JSON document
    Convert {
        /// Input Qobj file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Destination format
        #[arg(short, long, value_enum, default_value = "pyquil")]
        to: Target,

        /// Options file (YAML or JSON)
        #[arg(long)]
        options: Option<String>,

        /// Target device or simulator (e.g. "Aspen-7-28Q-A", "qasm_simulator")
        #[arg(short, long)]
        lattice: Option<String>,

        /// Number of shots
        #[arg(short, long)]
        shots: Option<u64>,

        /// Random seed for the simulator
        #[arg(long)]
        seed: Option<u64>,

        /// Let the QVM mimic the device named by --lattice
        #[arg(long)]
        as_qvm: bool,

        /// Do not append runnable code
        #[arg(long)]
        no_exec_code: bool,

        /// Convert every experiment instead of only the first
        #[arg(short, long)]
        all_experiments: bool,

        /// Gate definition table (JSON); the built-in table if omitted
        #[arg(long, env = "QCONVERT_GATE_DEFS")]
        gate_defs: Option<String>,
    },

    /// List supported gates
    Gates {
        /// Gate definition table (JSON); the built-in table if omitted
        #[arg(long, env = "QCONVERT_GATE_DEFS")]
        gate_defs: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout carries the converted output
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            to,
            options,
            lattice,
            shots,
            seed,
            as_qvm,
            no_exec_code,
            all_experiments,
            gate_defs,
        } => {
            let overrides = OptionOverrides {
                lattice,
                shots,
                seed,
                as_qvm,
                no_exec_code,
                all_experiments,
            };
            convert::execute(
                &input,
                output.as_deref(),
                to,
                options.as_deref(),
                overrides,
                gate_defs.as_deref(),
            )
        }

        Commands::Gates { gate_defs } => gates::execute(gate_defs.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
