//! `trellis terminals` — list component terminals.

use trellis_netlist::terminal::terminals_of;
use trellis_netlist::Circuit;

use crate::pipeline::load_circuit;
use crate::GlobalArgs;

/// Runs the `trellis terminals` command.
pub fn run(circuit_path: &str, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let circuit = load_circuit(circuit_path)?;
    println!("{}", describe(&circuit));
    Ok(0)
}

fn describe(circuit: &Circuit) -> String {
    let mut lines = Vec::new();
    for component in circuit.components() {
        lines.push(format!("{} [{}]", component.id, component.kind.name()));
        for t in terminals_of(&component.kind) {
            let connected = if circuit.is_terminal_connected(&component.id, &t.name) {
                ""
            } else {
                "  (unconnected)"
            };
            lines.push(format!(
                "  {:<4} {:<10} {:>2} bit{connected}",
                t.direction.to_string(),
                t.name,
                t.width
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_each_terminal() {
        let circuit = Circuit::from_json(
            r#"{"components": [{"id": "d", "kind": "decoder", "input_bits": 1}, {"id": "l", "kind": "led"}],
                "wires": [{"id": "1", "from": {"component": "d", "terminal": "out1"}, "to": {"component": "l", "terminal": "in"}}]}"#,
        )
        .unwrap();
        let text = describe(&circuit);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "d [decoder]");
        assert_eq!(lines[1], "  in   in          1 bit  (unconnected)");
        assert_eq!(lines[2], "  out  out0        1 bit  (unconnected)");
        assert_eq!(lines[3], "  out  out1        1 bit");
        assert_eq!(lines[4], "l [led]");
        assert_eq!(lines.len(), 6);
    }
}
