//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Qobj to pyQuil and toaster conversion",
        style("qconvert").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qconvert-expr  Gate matrix expression evaluator");
    println!("  qconvert-ir    Qobj model, gate definitions, classical registers");
    println!("  qconvert-core  Instruction interpreter and backends");
    println!("  qconvert-cli   Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
