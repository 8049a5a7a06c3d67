//! Simulation results: the value on every terminal of every component.

use std::collections::BTreeMap;

use serde::Serialize;
use trellis_common::{mask_value, ComponentId, Value};
use trellis_netlist::component::Component;
use trellis_netlist::terminal::terminals_of;

/// Terminal values for one component, keyed by terminal name.
pub type TerminalValues = BTreeMap<String, Value>;

/// Component ID → terminal name → value.
///
/// Doubles as the propagation state between passes and as the seed for the
/// next stabilization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SimResult {
    values: BTreeMap<ComponentId, TerminalValues>,
}

impl SimResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// A result with every terminal of every component set to 0.
    pub fn initial(components: &[Component]) -> Self {
        Self::seeded(components, None)
    }

    /// A result shaped after `components`, taking values from `previous`
    /// for terminals that still exist and 0 elsewhere.
    pub fn seeded(components: &[Component], previous: Option<&SimResult>) -> Self {
        let values = components
            .iter()
            .map(|component| {
                let old = previous.and_then(|p| p.component(&component.id));
                let terminals: TerminalValues = terminals_of(&component.kind)
                    .into_iter()
                    .map(|t| {
                        let v = old.and_then(|o| o.get(&t.name)).copied().unwrap_or(0);
                        (t.name, mask_value(v, t.width))
                    })
                    .collect();
                (component.id.clone(), terminals)
            })
            .collect();
        Self { values }
    }

    /// Returns the value on one terminal.
    pub fn get(&self, id: &ComponentId, terminal: &str) -> Option<Value> {
        self.values.get(id)?.get(terminal).copied()
    }

    /// Returns all terminal values of one component.
    pub fn component(&self, id: &ComponentId) -> Option<&TerminalValues> {
        self.values.get(id)
    }

    /// Sets one terminal value. Returns `true` if the stored value changed.
    pub fn set(&mut self, id: &ComponentId, terminal: &str, value: Value) -> bool {
        let terminals = self.values.entry(id.clone()).or_default();
        match terminals.get_mut(terminal) {
            Some(slot) if *slot == value => false,
            Some(slot) => {
                *slot = value;
                true
            }
            None => {
                terminals.insert(terminal.to_string(), value);
                true
            }
        }
    }

    /// Iterates over components in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &TerminalValues)> {
        self.values.iter()
    }

    /// Number of components in the result.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the result holds no components.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
