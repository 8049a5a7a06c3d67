//! Shared helpers for the CLI commands: config resolution, circuit loading
//! and result rendering.

use std::path::{Path, PathBuf};

use trellis_common::{format_value, DisplayFormat};
use trellis_config::TrellisConfig;
use trellis_netlist::component::Component;
use trellis_netlist::terminal::terminals_of;
use trellis_netlist::Circuit;
use trellis_sim::SimResult;

use crate::GlobalArgs;

/// Resolves and loads the configuration.
///
/// `--config` may name a `trellis.toml` file or a directory containing one;
/// either must exist. Without it, `trellis.toml` in the current directory is
/// used if present, and defaults apply otherwise.
pub fn load_config(global: &GlobalArgs) -> Result<TrellisConfig, Box<dyn std::error::Error>> {
    match &global.config {
        Some(config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                let content = std::fs::read_to_string(&p)?;
                Ok(trellis_config::load_config_from_str(&content)?)
            } else {
                Ok(trellis_config::load_config(&p)?)
            }
        }
        None => Ok(trellis_config::load_config_or_default(
            &std::env::current_dir()?,
        )?),
    }
}

/// Loads a circuit document.
pub fn load_circuit(path: &str) -> Result<Circuit, Box<dyn std::error::Error>> {
    let circuit = Circuit::load(Path::new(path))
        .map_err(|e| format!("cannot load circuit '{path}': {e}"))?;
    log::debug!(
        "loaded {} component(s) and {} wire(s) from {path}",
        circuit.components().len(),
        circuit.wires().len()
    );
    Ok(circuit)
}

/// Renders every terminal value as `id.terminal = value`, one per line,
/// in component order.
pub fn render_result(components: &[Component], result: &SimResult, format: DisplayFormat) -> String {
    let mut lines = Vec::new();
    for component in components {
        for t in terminals_of(&component.kind) {
            let value = result.get(&component.id, &t.name).unwrap_or(0);
            lines.push(format!(
                "{}.{} = {}",
                component.id,
                t.name,
                format_value(value, t.width, format)
            ));
        }
    }
    lines.join("\n")
}
