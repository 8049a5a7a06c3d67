//! Netlist propagation engine.
//!
//! [`Propagator::stabilize`] relaxes the netlist to a fixed point using
//! Gauss–Seidel sweeps: components are evaluated one at a time against the
//! live result, and every changed output is pushed through its wires
//! immediately, so later components in the same pass see it.
//!
//! The sweep order is reshuffled on every pass. A fixed order can lock a
//! symmetric feedback loop (two cross-coupled gates) into flipping in step
//! forever; a random order lets one side win.
//!
//! Stabilization starts from the previous result when one is given. Latches
//! have more than one fixed point and must stay in the one they are in when
//! an unrelated edit triggers re-stabilization.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use trellis_common::{mask_value, ComponentId, Value};
use trellis_config::SimulationSettings;
pub use trellis_config::DEFAULT_MAX_ITERATIONS;
use trellis_netlist::component::{Component, ComponentKind};
use trellis_netlist::terminal::{terminals_of, Direction, Terminal};
use trellis_netlist::wire::{Endpoint, Wire};

use crate::error::SimError;
use crate::eval::{evaluate, InputValues};
use crate::result::SimResult;
use crate::state::SequentialState;

/// Settings for a [`Propagator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropagatorConfig {
    /// Passes allowed before reporting non-convergence. Values below 1 act as 1.
    pub max_iterations: u32,
    /// Seed for the sweep-order shuffle. `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for PropagatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

impl From<&SimulationSettings> for PropagatorConfig {
    fn from(settings: &SimulationSettings) -> Self {
        Self {
            max_iterations: settings.max_iterations,
            seed: settings.seed,
        }
    }
}

/// A converged result and the number of passes it took, including the
/// final pass in which nothing changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stabilized {
    /// Values on every terminal.
    pub result: SimResult,
    /// Passes executed.
    pub passes: u32,
}

/// The relaxation engine. Owns the iteration cap and the shuffle RNG.
#[derive(Debug)]
pub struct Propagator {
    max_iterations: u32,
    rng: StdRng,
}

impl Default for Propagator {
    fn default() -> Self {
        Self::new(&PropagatorConfig::default())
    }
}

impl Propagator {
    /// Creates a propagator from its settings.
    pub fn new(config: &PropagatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            max_iterations: config.max_iterations.max(1),
            rng,
        }
    }

    /// Restarts the shuffle sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// The pass cap.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Relaxes the netlist to a fixed point.
    ///
    /// Wires naming a missing component or terminal, or running the wrong
    /// way, are ignored and their targets read as 0. If an input has several
    /// drivers the last wire in `wires` wins.
    ///
    /// # Errors
    ///
    /// [`SimError::NonConvergence`] if outputs are still changing after the
    /// pass cap. The error carries the state after the last pass.
    pub fn stabilize(
        &mut self,
        components: &[Component],
        wires: &[Wire],
        state: &SequentialState,
        previous: Option<&SimResult>,
    ) -> Result<Stabilized, SimError> {
        let nodes = build_nodes(components, wires);
        let mut result = SimResult::seeded(components, previous);

        // Seeded inputs may be stale after wiring edits.
        for node in &nodes {
            for pin in &node.inputs {
                let value = pin.read(&result);
                result.set(node.id, &pin.name, value);
            }
        }

        let mut order: Vec<usize> = (0..nodes.len()).collect();
        for pass in 1..=self.max_iterations {
            order.shuffle(&mut self.rng);
            let mut changed = false;
            for &index in &order {
                changed |= nodes[index].update(&mut result, state);
            }
            if !changed {
                log::debug!(
                    "stabilized {} component(s) after {pass} pass(es)",
                    nodes.len()
                );
                return Ok(Stabilized {
                    result,
                    passes: pass,
                });
            }
        }

        log::warn!(
            "netlist still changing after {} passes; giving up",
            self.max_iterations
        );
        Err(SimError::NonConvergence {
            iterations: self.max_iterations,
            last: Box::new(result),
        })
    }
}

/// An input terminal and the output driving it.
struct InputPin {
    name: String,
    width: u32,
    driver: Option<Endpoint>,
}

impl InputPin {
    fn read(&self, result: &SimResult) -> Value {
        let raw = self
            .driver
            .as_ref()
            .and_then(|d| result.get(&d.component, &d.terminal))
            .unwrap_or(0);
        mask_value(raw, self.width)
    }
}

/// One component prepared for repeated evaluation.
struct Node<'a> {
    id: &'a ComponentId,
    kind: &'a ComponentKind,
    inputs: Vec<InputPin>,
    outputs: Vec<Terminal>,
    /// Output name → driven inputs and their widths.
    fanout: HashMap<String, Vec<(Endpoint, u32)>>,
}

impl Node<'_> {
    /// Re-evaluates the component and pushes changed outputs through its wires.
    fn update(&self, result: &mut SimResult, state: &SequentialState) -> bool {
        let inputs: InputValues = self
            .inputs
            .iter()
            .map(|pin| (pin.name.clone(), pin.read(result)))
            .collect();
        let outputs = evaluate(self.kind, &inputs, state.slot(self.id));

        let mut changed = false;
        for terminal in &self.outputs {
            let value = mask_value(
                outputs.get(&terminal.name).copied().unwrap_or(0),
                terminal.width,
            );
            if !result.set(self.id, &terminal.name, value) {
                continue;
            }
            changed = true;
            for (target, width) in self.fanout.get(&terminal.name).into_iter().flatten() {
                result.set(&target.component, &target.terminal, mask_value(value, *width));
            }
        }
        changed
    }
}

fn build_nodes<'a>(components: &'a [Component], wires: &[Wire]) -> Vec<Node<'a>> {
    let terminals: HashMap<&ComponentId, Vec<Terminal>> = components
        .iter()
        .map(|c| (&c.id, terminals_of(&c.kind)))
        .collect();
    let lookup = |endpoint: &Endpoint| {
        terminals
            .get(&endpoint.component)?
            .iter()
            .find(|t| t.name == endpoint.terminal)
    };

    let mut drivers: HashMap<Endpoint, Endpoint> = HashMap::new();
    for wire in wires {
        let from_ok = lookup(&wire.from).is_some_and(|t| t.direction == Direction::Out);
        let to_ok = lookup(&wire.to).is_some_and(|t| t.direction == Direction::In);
        if !(from_ok && to_ok) {
            log::debug!(
                "ignoring dangling wire '{}' ({} -> {})",
                wire.id,
                wire.from,
                wire.to
            );
            continue;
        }
        if let Some(old) = drivers.insert(wire.to.clone(), wire.from.clone()) {
            log::debug!(
                "input {} has several drivers; {} replaces {old}",
                wire.to,
                wire.from
            );
        }
    }

    let mut fanout: HashMap<&ComponentId, HashMap<String, Vec<(Endpoint, u32)>>> = HashMap::new();
    for (to, from) in &drivers {
        let width = lookup(to).map_or(0, |t| t.width);
        fanout
            .entry(&from.component)
            .or_default()
            .entry(from.terminal.clone())
            .or_default()
            .push((to.clone(), width));
    }

    components
        .iter()
        .map(|c| {
            let (ins, outs): (Vec<_>, Vec<_>) = terminals
                .get(&c.id)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .partition(|t| t.direction == Direction::In);
            let inputs = ins
                .into_iter()
                .map(|t| {
                    let driver = drivers.get(&Endpoint::new(c.id.clone(), t.name.clone())).cloned();
                    InputPin {
                        name: t.name,
                        width: t.width,
                        driver,
                    }
                })
                .collect();
            Node {
                id: &c.id,
                kind: &c.kind,
                inputs,
                outputs: outs,
                fanout: fanout.remove(&c.id).unwrap_or_default(),
            }
        })
        .collect()
}
