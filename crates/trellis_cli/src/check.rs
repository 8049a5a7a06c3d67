//! `trellis check` — validate a circuit document.
//!
//! Loading already rejects malformed JSON, invalid component configuration
//! and duplicate IDs. What remains are wiring problems the simulator would
//! silently ignore, which are listed here.

use crate::pipeline::load_circuit;
use crate::GlobalArgs;

/// Runs the `trellis check` command. Returns exit code 0 when the circuit is clean.
pub fn run(circuit_path: &str, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let circuit = load_circuit(circuit_path)?;
    let issues = circuit.check();

    for issue in &issues {
        eprintln!("warning: {issue}");
    }

    if !global.quiet {
        eprintln!(
            "   Checked {} component(s), {} wire(s): {} issue(s)",
            circuit.components().len(),
            circuit.wires().len(),
            issues.len()
        );
    }

    Ok(if issues.is_empty() { 0 } else { 1 })
}
