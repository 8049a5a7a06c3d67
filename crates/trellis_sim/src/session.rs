//! Simulation sessions: the clock control surface around the engine.
//!
//! A [`Simulation`] owns a copy of the netlist, the propagator, the
//! sequential state and the last result. It exists in two modes. When
//! stopped there is no sequential state and no result. When running every
//! edit re-stabilizes, seeded by the previous result.

use std::thread;
use std::time::Duration;

use trellis_common::{mask_value, ComponentId, InternalError, TrellisResult, Value};
use trellis_config::SimulationSettings;
use trellis_netlist::component::{Component, ComponentKind};
use trellis_netlist::wire::Wire;
use trellis_netlist::Circuit;

use crate::clock;
use crate::error::SimError;
use crate::propagate::{Propagator, PropagatorConfig};
use crate::result::SimResult;
use crate::state::SequentialState;

/// A stoppable, steppable simulation of one netlist.
#[derive(Debug)]
pub struct Simulation {
    components: Vec<Component>,
    wires: Vec<Wire>,
    propagator: Propagator,
    state: Option<SequentialState>,
    result: Option<SimResult>,
    cycle: u64,
    last_passes: u32,
    /// Whether the last stabilization reached a fixed point.
    settled: bool,
}

impl Simulation {
    /// Creates a stopped simulation.
    pub fn new(components: Vec<Component>, wires: Vec<Wire>, config: &PropagatorConfig) -> Self {
        Self {
            components,
            wires,
            propagator: Propagator::new(config),
            state: None,
            result: None,
            cycle: 0,
            last_passes: 0,
            settled: false,
        }
    }

    /// Creates a stopped simulation of a circuit document.
    pub fn from_circuit(circuit: &Circuit, config: &PropagatorConfig) -> Self {
        Self::new(circuit.components().to_vec(), circuit.wires().to_vec(), config)
    }

    /// Allocates zeroed sequential state and stabilizes from all-zero terminals.
    ///
    /// Starting a running simulation restarts it.
    pub fn start(&mut self) -> Result<&SimResult, SimError> {
        log::info!(
            "starting simulation of {} component(s) and {} wire(s)",
            self.components.len(),
            self.wires.len()
        );
        self.state = Some(SequentialState::for_components(&self.components));
        self.result = None;
        self.cycle = 0;
        self.settle()
    }

    /// Discards sequential state and the result.
    pub fn stop(&mut self) {
        if self.state.take().is_some() {
            log::info!("simulation stopped after {} cycle(s)", self.cycle);
        }
        self.result = None;
        self.cycle = 0;
        self.last_passes = 0;
        self.settled = false;
    }

    /// Returns `true` between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    /// Returns `true` if running and the last stabilization converged.
    ///
    /// Clock edges are refused while this is `false`.
    pub fn is_settled(&self) -> bool {
        self.is_running() && self.settled
    }

    /// Re-stabilizes the netlist, seeded by the current result.
    ///
    /// On non-convergence the last snapshot becomes the current result
    /// before the error is returned.
    pub fn settle(&mut self) -> Result<&SimResult, SimError> {
        let state = self.state.as_ref().ok_or(SimError::NotRunning)?;
        match self
            .propagator
            .stabilize(&self.components, &self.wires, state, self.result.as_ref())
        {
            Ok(stabilized) => {
                self.last_passes = stabilized.passes;
                self.result = Some(stabilized.result);
                self.settled = true;
            }
            Err(SimError::NonConvergence { iterations, last }) => {
                self.last_passes = iterations;
                self.result = Some((*last).clone());
                self.settled = false;
                return Err(SimError::NonConvergence { iterations, last });
            }
            Err(e) => return Err(e),
        }
        Ok(self.current()?)
    }

    /// Applies one clock edge, then re-stabilizes.
    ///
    /// # Errors
    ///
    /// [`SimError::Unsettled`] if the last stabilization did not converge.
    /// Neither the sequential state nor the cycle count changes then.
    pub fn step(&mut self) -> Result<&SimResult, SimError> {
        if !self.settled && self.is_running() {
            return Err(SimError::Unsettled {
                passes: self.last_passes,
            });
        }
        let state = self.state.as_mut().ok_or(SimError::NotRunning)?;
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| InternalError::new("running simulation has no result"))?;
        clock::step(&self.components, result, state);
        self.cycle += 1;
        self.settle()
    }

    /// Applies `cycles` clock edges, stopping at the first error.
    pub fn run(&mut self, cycles: u64) -> Result<&SimResult, SimError> {
        if !self.is_running() {
            return Err(SimError::NotRunning);
        }
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(self.current()?)
    }

    /// Replaces the component list. A running simulation reconciles its
    /// sequential state and re-stabilizes.
    pub fn set_components(&mut self, components: Vec<Component>) -> Result<(), SimError> {
        self.components = components;
        if let Some(state) = self.state.as_mut() {
            state.reconcile(&self.components);
        }
        self.resettle()
    }

    /// Replaces the wire list. A running simulation re-stabilizes.
    pub fn set_wires(&mut self, wires: Vec<Wire>) -> Result<(), SimError> {
        self.wires = wires;
        self.resettle()
    }

    /// Replaces components and wires from a circuit document.
    pub fn set_circuit(&mut self, circuit: &Circuit) -> Result<(), SimError> {
        self.wires = circuit.wires().to_vec();
        self.set_components(circuit.components().to_vec())
    }

    /// Sets the value of an `input` component, masked to its width.
    pub fn set_input_value(&mut self, id: &ComponentId, value: Value) -> Result<(), SimError> {
        match &mut self.component_mut(id)?.kind {
            ComponentKind::Input {
                bit_width,
                value: current,
                ..
            } => *current = mask_value(value, *bit_width),
            other => {
                return Err(SimError::NotASource {
                    id: id.clone(),
                    kind: other.name(),
                })
            }
        }
        self.resettle()
    }

    /// Flips a switch and returns its new position.
    pub fn toggle_switch(&mut self, id: &ComponentId) -> Result<bool, SimError> {
        let on = match &mut self.component_mut(id)?.kind {
            ComponentKind::Switch { is_on } => {
                *is_on = !*is_on;
                *is_on
            }
            other => {
                return Err(SimError::NotASource {
                    id: id.clone(),
                    kind: other.name(),
                })
            }
        };
        self.resettle()?;
        Ok(on)
    }

    /// Clock edges applied since the last start.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Passes taken by the most recent stabilization.
    pub fn last_passes(&self) -> u32 {
        self.last_passes
    }

    /// The current result, if running.
    pub fn result(&self) -> Option<&SimResult> {
        self.result.as_ref()
    }

    /// The sequential state, if running.
    pub fn state(&self) -> Option<&SequentialState> {
        self.state.as_ref()
    }

    /// The simulated components.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// The simulated wires.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Looks up a component by ID.
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| &c.id == id)
    }

    fn component_mut(&mut self, id: &ComponentId) -> Result<&mut Component, SimError> {
        self.components
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| SimError::UnknownComponent(id.clone()))
    }

    fn resettle(&mut self) -> Result<(), SimError> {
        if self.is_running() {
            self.settle()?;
        }
        Ok(())
    }

    fn current(&self) -> TrellisResult<&SimResult> {
        self.result
            .as_ref()
            .ok_or_else(|| InternalError::new("running simulation has no result"))
    }
}

/// Drives clock edges at a fixed interval on the calling thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeRunner {
    interval: Duration,
}

impl FreeRunner {
    /// Creates a runner with the given clock period.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Creates a runner with the configured clock period.
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self::new(Duration::from_millis(settings.run_interval_ms))
    }

    /// The clock period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleeps one period and steps, for as long as `should_continue` says so.
    ///
    /// The callback runs before every edge and sees the simulation as it
    /// stands. Returns the number of edges applied. A session whose last
    /// stabilization failed is rejected before the first sleep.
    pub fn run<F>(&self, sim: &mut Simulation, mut should_continue: F) -> Result<u64, SimError>
    where
        F: FnMut(&Simulation) -> bool,
    {
        if !sim.is_running() {
            return Err(SimError::NotRunning);
        }
        if !sim.is_settled() {
            return Err(SimError::Unsettled {
                passes: sim.last_passes(),
            });
        }
        let mut edges = 0;
        while should_continue(sim) {
            thread::sleep(self.interval);
            sim.step()?;
            edges += 1;
        }
        Ok(edges)
    }
}
