//! `trellis sim` — batch or interactive simulation of a circuit document.

use std::io;

use trellis_common::DisplayFormat;
use trellis_config::TrellisConfig;
use trellis_sim::{FreeRunner, InteractiveSim, PropagatorConfig, SimError, Simulation};

use crate::pipeline::{load_circuit, load_config, render_result};
use crate::{GlobalArgs, SimArgs};

/// Exit code when the netlist did not stabilize within the pass cap.
const EXIT_NON_CONVERGENCE: i32 = 2;

/// Runs the `trellis sim` command.
///
/// Batch mode settles the circuit, applies `--steps` clock edges and prints
/// every terminal value. A non-converging netlist still prints its last
/// snapshot and exits with code 2.
pub fn run(args: &SimArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_config(global)?;
    let circuit = load_circuit(&args.circuit)?;
    let format = args.format.map(Into::into).unwrap_or(config.display.format);
    let mut sim = Simulation::from_circuit(&circuit, &propagator_config(args, &config));

    if args.interactive {
        let mut repl = InteractiveSim::new(sim, format);
        let stdin = io::stdin();
        repl.run_repl(&mut stdin.lock(), &mut io::stdout())?;
        return Ok(0);
    }

    let outcome = if args.watch {
        watch(&mut sim, args.steps, FreeRunner::from_settings(&config.simulation), format)
    } else {
        simulate(&mut sim, args.steps)
    };

    let code = match outcome {
        Ok(()) => 0,
        Err(SimError::NonConvergence { iterations, .. }) => {
            eprintln!(
                "warning: netlist did not stabilize within {iterations} passes; showing last snapshot"
            );
            EXIT_NON_CONVERGENCE
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", render(&sim, args.json, format)?);

    if global.verbose && !global.quiet {
        eprintln!(
            "   Simulated {} cycle(s), last settle took {} pass(es)",
            sim.cycle(),
            sim.last_passes()
        );
    }
    Ok(code)
}

/// Merges the configured propagation settings with CLI overrides.
fn propagator_config(args: &SimArgs, config: &TrellisConfig) -> PropagatorConfig {
    let mut pc = PropagatorConfig::from(&config.simulation);
    if let Some(seed) = args.seed {
        pc.seed = Some(seed);
    }
    if let Some(max) = args.max_iterations {
        pc.max_iterations = max;
    }
    pc
}

fn simulate(sim: &mut Simulation, steps: u64) -> Result<(), SimError> {
    sim.start()?;
    sim.run(steps)?;
    Ok(())
}

/// Settles, then free-runs the clock and prints every terminal after each edge.
fn watch(
    sim: &mut Simulation,
    steps: u64,
    runner: FreeRunner,
    format: DisplayFormat,
) -> Result<(), SimError> {
    sim.start()?;
    runner.run(sim, |sim| {
        if let Some(result) = sim.result() {
            println!("-- cycle {}", sim.cycle());
            println!("{}", render_result(sim.components(), result, format));
        }
        steps == 0 || sim.cycle() < steps
    })?;
    Ok(())
}

fn render(
    sim: &Simulation,
    json: bool,
    format: DisplayFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let result = sim.result().ok_or("simulation produced no result")?;
    if json {
        Ok(serde_json::to_string_pretty(result)?)
    } else {
        Ok(render_result(sim.components(), result, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use trellis_netlist::Circuit;

    const COUNTER: &str = r#"{
        "components": [
            {"id": "one", "kind": "constant", "bit_width": 4, "value": 1},
            {"id": "add", "kind": "adder", "bit_width": 4},
            {"id": "reg", "kind": "register", "bit_width": 4}
        ],
        "wires": [
            {"id": "1", "from": {"component": "reg", "terminal": "q"}, "to": {"component": "add", "terminal": "a"}},
            {"id": "2", "from": {"component": "one", "terminal": "out"}, "to": {"component": "add", "terminal": "b"}},
            {"id": "3", "from": {"component": "add", "terminal": "sum"}, "to": {"component": "reg", "terminal": "d"}}
        ]
    }"#;

    fn sim_args(extra: &[&str]) -> SimArgs {
        let mut argv = vec!["sim", "c.json"];
        argv.extend_from_slice(extra);
        SimArgs::parse_from(argv)
    }

    fn counter(seed: u64) -> Simulation {
        let circuit = Circuit::from_json(COUNTER).unwrap();
        Simulation::from_circuit(
            &circuit,
            &PropagatorConfig {
                seed: Some(seed),
                ..Default::default()
            },
        )
    }

    #[test]
    fn overrides_win_over_config() {
        let mut config = TrellisConfig::default();
        config.simulation.seed = Some(1);
        config.simulation.max_iterations = 50;

        let pc = propagator_config(&sim_args(&[]), &config);
        assert_eq!(pc.seed, Some(1));
        assert_eq!(pc.max_iterations, 50);

        let pc = propagator_config(&sim_args(&["--seed", "9", "--max-iterations", "7"]), &config);
        assert_eq!(pc.seed, Some(9));
        assert_eq!(pc.max_iterations, 7);
    }

    #[test]
    fn counter_counts_edges() {
        let mut sim = counter(3);
        simulate(&mut sim, 5).unwrap();
        assert_eq!(sim.cycle(), 5);
        let text = render(&sim, false, DisplayFormat::Dec).unwrap();
        assert!(text.lines().any(|l| l == "reg.q = 5"));
        assert!(text.lines().any(|l| l == "add.sum = 6"));
    }

    #[test]
    fn counter_wraps_at_width() {
        let mut sim = counter(4);
        simulate(&mut sim, 17).unwrap();
        let text = render(&sim, false, DisplayFormat::Hex).unwrap();
        assert!(text.lines().any(|l| l == "reg.q = 0x1"));
    }

    #[test]
    fn watch_stops_after_steps() {
        let mut sim = counter(6);
        watch(
            &mut sim,
            3,
            FreeRunner::new(std::time::Duration::ZERO),
            DisplayFormat::Dec,
        )
        .unwrap();
        assert_eq!(sim.cycle(), 3);
        assert_eq!(sim.result().unwrap().get(&"reg".into(), "q"), Some(3));
    }

    #[test]
    fn json_output_is_keyed_by_component() {
        let mut sim = counter(5);
        simulate(&mut sim, 2).unwrap();
        let text = render(&sim, true, DisplayFormat::Hex).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["reg"]["q"], 2);
        assert_eq!(v["one"]["out"], 1);
    }

    #[test]
    fn non_convergence_keeps_snapshot() {
        let circuit = Circuit::from_json(
            r#"{"components": [{"id": "n", "kind": "not", "bit_width": 1}],
                "wires": [{"id": "1", "from": {"component": "n", "terminal": "out"}, "to": {"component": "n", "terminal": "in"}}]}"#,
        )
        .unwrap();
        let mut sim = Simulation::from_circuit(&circuit, &PropagatorConfig::default());
        assert!(matches!(
            simulate(&mut sim, 0),
            Err(SimError::NonConvergence { iterations: 100, .. })
        ));
        assert!(render(&sim, false, DisplayFormat::Bin).is_ok());
    }
}
