//! The editable circuit document.
//!
//! [`Circuit`] owns the component and wire lists the editor manipulates and
//! the simulator reads. Editing operations keep the structural invariants
//! (unique IDs, output-to-input wires, fan-in of at most one); documents
//! loaded from disk may still violate them, which [`Circuit::check`] reports
//! without rejecting the file.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use trellis_common::{ComponentId, WireId};

use crate::component::{Component, ComponentKind};
use crate::error::NetlistError;
use crate::terminal::{find_terminal, Direction};
use crate::wire::{Endpoint, Wire};

/// A structural problem found by [`Circuit::check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetlistIssue {
    /// A wire names a component or terminal that does not exist.
    DanglingWire {
        /// The offending wire.
        wire: WireId,
        /// The endpoint that could not be resolved.
        endpoint: Endpoint,
    },
    /// A wire end sits on a terminal of the wrong direction.
    WrongDirection {
        /// The offending wire.
        wire: WireId,
        /// The endpoint with the wrong direction.
        endpoint: Endpoint,
        /// The direction that end of the wire requires.
        expected: Direction,
    },
    /// An input terminal is the target of more than one wire.
    MultipleDrivers {
        /// The over-driven input.
        input: Endpoint,
        /// Every wire targeting it.
        wires: Vec<WireId>,
    },
}

impl fmt::Display for NetlistIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetlistIssue::DanglingWire { wire, endpoint } => {
                write!(f, "wire '{wire}' refers to missing terminal {endpoint}")
            }
            NetlistIssue::WrongDirection {
                wire,
                endpoint,
                expected,
            } => write!(
                f,
                "wire '{wire}' expects {endpoint} to be an '{expected}' terminal"
            ),
            NetlistIssue::MultipleDrivers { input, wires } => {
                let list: Vec<_> = wires.iter().map(|w| w.to_string()).collect();
                write!(f, "input {input} is driven by {} wires ({})", wires.len(), list.join(", "))
            }
        }
    }
}

/// A circuit: components plus the wires between their terminals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    /// Components in insertion order.
    #[serde(default)]
    components: Vec<Component>,
    /// Wires in insertion order.
    #[serde(default)]
    wires: Vec<Wire>,
    /// Next candidate for an auto-assigned component ID.
    #[serde(default)]
    next_component_id: u64,
    /// Next candidate for an auto-assigned wire ID.
    #[serde(default)]
    next_wire_id: u64,
}

impl Circuit {
    /// Creates an empty circuit.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            wires: Vec::new(),
            next_component_id: 1,
            next_wire_id: 1,
        }
    }

    /// Parses a circuit document and validates every component's configuration.
    ///
    /// Wiring problems are not errors here; use [`check`](Self::check) to list them.
    pub fn from_json(content: &str) -> Result<Self, NetlistError> {
        let mut circuit: Circuit = serde_json::from_str(content)?;
        let mut seen = HashSet::new();
        for component in &circuit.components {
            component.kind.validate()?;
            if !seen.insert(component.id.clone()) {
                return Err(NetlistError::DuplicateComponent(component.id.clone()));
            }
        }
        circuit.next_component_id = circuit
            .next_component_id
            .max(next_numeric(circuit.components.iter().map(|c| c.id.as_str())));
        circuit.next_wire_id = circuit
            .next_wire_id
            .max(next_numeric(circuit.wires.iter().map(|w| w.id.as_str())));
        Ok(circuit)
    }

    /// Reads and parses a circuit document from a file.
    pub fn load(path: &Path) -> Result<Self, NetlistError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serializes the circuit as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, NetlistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the circuit to a file as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), NetlistError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Returns all components in insertion order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Returns all wires in insertion order.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Looks up a component by ID.
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| &c.id == id)
    }

    /// Adds a component with the next free sequential ID.
    pub fn add_component(&mut self, kind: ComponentKind) -> Result<ComponentId, NetlistError> {
        kind.validate()?;
        let id = loop {
            let candidate = ComponentId::new(self.next_component_id.max(1).to_string());
            self.next_component_id = successor(self.next_component_id);
            if self.component(&candidate).is_none() {
                break candidate;
            }
        };
        self.components.push(Component {
            id: id.clone(),
            kind,
        });
        Ok(id)
    }

    /// Adds a component with an explicit ID.
    pub fn insert_component(&mut self, component: Component) -> Result<(), NetlistError> {
        component.kind.validate()?;
        if self.component(&component.id).is_some() {
            return Err(NetlistError::DuplicateComponent(component.id));
        }
        self.components.push(component);
        Ok(())
    }

    /// Replaces a component's configuration.
    ///
    /// Wires whose endpoint on this component no longer names a terminal of
    /// the right direction are removed and their IDs returned.
    pub fn update_component(
        &mut self,
        id: &ComponentId,
        kind: ComponentKind,
    ) -> Result<Vec<WireId>, NetlistError> {
        kind.validate()?;
        let component = self
            .components
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| NetlistError::UnknownComponent(id.clone()))?;
        component.kind = kind;
        let kind = component.kind.clone();

        let mut removed = Vec::new();
        self.wires.retain(|w| {
            let from_ok = &w.from.component != id
                || has_terminal(&kind, &w.from.terminal, Direction::Out);
            let to_ok =
                &w.to.component != id || has_terminal(&kind, &w.to.terminal, Direction::In);
            if !(from_ok && to_ok) {
                removed.push(w.id.clone());
            }
            from_ok && to_ok
        });
        if !removed.is_empty() {
            log::debug!(
                "reconfiguring '{id}' removed {} wire(s) to vanished terminals",
                removed.len()
            );
        }
        Ok(removed)
    }

    /// Removes a component and every wire attached to it.
    pub fn remove_component(&mut self, id: &ComponentId) -> Result<Component, NetlistError> {
        let index = self
            .components
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| NetlistError::UnknownComponent(id.clone()))?;
        self.wires.retain(|w| !w.touches(id));
        Ok(self.components.remove(index))
    }

    /// Connects an output terminal to an input terminal.
    pub fn connect(&mut self, from: Endpoint, to: Endpoint) -> Result<WireId, NetlistError> {
        let from_dir = self.terminal_direction(&from)?;
        let to_dir = self.terminal_direction(&to)?;
        if from_dir != Direction::Out || to_dir != Direction::In {
            return Err(NetlistError::DirectionMismatch {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if let Some(existing) = self.driver_of(&to) {
            return Err(NetlistError::InputAlreadyDriven {
                component: to.component,
                terminal: to.terminal,
                existing: existing.id.clone(),
            });
        }

        let id = loop {
            let candidate = WireId::new(self.next_wire_id.max(1).to_string());
            self.next_wire_id = successor(self.next_wire_id);
            if !self.wires.iter().any(|w| w.id == candidate) {
                break candidate;
            }
        };
        self.wires.push(Wire::new(id.clone(), from, to));
        Ok(id)
    }

    /// Removes a wire.
    pub fn disconnect(&mut self, id: &WireId) -> Result<Wire, NetlistError> {
        let index = self
            .wires
            .iter()
            .position(|w| &w.id == id)
            .ok_or_else(|| NetlistError::UnknownWire(id.clone()))?;
        Ok(self.wires.remove(index))
    }

    /// Returns the wire driving an input terminal, if any.
    pub fn driver_of(&self, input: &Endpoint) -> Option<&Wire> {
        self.wires.iter().find(|w| &w.to == input)
    }

    /// Returns `true` if any wire starts or ends at the given terminal.
    pub fn is_terminal_connected(&self, component: &ComponentId, terminal: &str) -> bool {
        self.wires.iter().any(|w| {
            (&w.from.component == component && w.from.terminal == terminal)
                || (&w.to.component == component && w.to.terminal == terminal)
        })
    }

    /// Lists dangling wires, direction mismatches and fan-in violations.
    pub fn check(&self) -> Vec<NetlistIssue> {
        let mut issues = Vec::new();
        let mut drivers: BTreeMap<&Endpoint, Vec<WireId>> = BTreeMap::new();

        for wire in &self.wires {
            for (endpoint, expected) in [(&wire.from, Direction::Out), (&wire.to, Direction::In)] {
                match self.terminal_direction(endpoint) {
                    Err(_) => issues.push(NetlistIssue::DanglingWire {
                        wire: wire.id.clone(),
                        endpoint: endpoint.clone(),
                    }),
                    Ok(dir) if dir != expected => issues.push(NetlistIssue::WrongDirection {
                        wire: wire.id.clone(),
                        endpoint: endpoint.clone(),
                        expected,
                    }),
                    Ok(_) => {}
                }
            }
            drivers.entry(&wire.to).or_default().push(wire.id.clone());
        }

        for (input, wires) in drivers {
            if wires.len() > 1 {
                issues.push(NetlistIssue::MultipleDrivers {
                    input: input.clone(),
                    wires,
                });
            }
        }
        issues
    }

    fn terminal_direction(&self, endpoint: &Endpoint) -> Result<Direction, NetlistError> {
        let component = self
            .component(&endpoint.component)
            .ok_or_else(|| NetlistError::UnknownComponent(endpoint.component.clone()))?;
        find_terminal(&component.kind, &endpoint.terminal)
            .map(|t| t.direction)
            .ok_or_else(|| NetlistError::UnknownTerminal {
                component: endpoint.component.clone(),
                terminal: endpoint.terminal.clone(),
            })
    }
}

fn has_terminal(kind: &ComponentKind, name: &str, direction: Direction) -> bool {
    find_terminal(kind, name).is_some_and(|t| t.direction == direction)
}

/// The counter value after `n`, wrapping past `u64::MAX` back to 1.
fn successor(n: u64) -> u64 {
    n.max(1).checked_add(1).unwrap_or(1)
}

/// One past the largest purely numeric ID, so auto-assigned IDs never collide.
///
/// IDs at `u64::MAX` have no successor and are ignored; the allocation loop
/// still skips them if they come up.
fn next_numeric<'a>(ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.filter_map(|id| id.parse::<u64>().ok()?.checked_add(1))
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::GateType;

    fn and2() -> ComponentKind {
        ComponentKind::Gate {
            gate_type: GateType::And,
            inputs: 2,
            bit_width: 1,
        }
    }

    fn switch() -> ComponentKind {
        ComponentKind::Switch { is_on: false }
    }

    #[test]
    fn add_component_assigns_sequential_ids() {
        let mut c = Circuit::new();
        let a = c.add_component(switch()).unwrap();
        let b = c.add_component(and2()).unwrap();
        assert_eq!(a.as_str(), "1");
        assert_eq!(b.as_str(), "2");
        assert_eq!(c.components().len(), 2);
    }

    #[test]
    fn add_component_rejects_invalid_config() {
        let mut c = Circuit::new();
        let err = c.add_component(ComponentKind::Not { bit_width: 0 }).unwrap_err();
        assert!(matches!(err, NetlistError::InvalidConfig { .. }));
        assert!(c.components().is_empty());
    }

    #[test]
    fn add_component_skips_taken_ids() {
        let mut c = Circuit::new();
        c.insert_component(Component::new("1", switch()).unwrap())
            .unwrap();
        let id = c.add_component(switch()).unwrap();
        assert_eq!(id.as_str(), "2");
    }

    #[test]
    fn insert_duplicate_rejected() {
        let mut c = Circuit::new();
        c.insert_component(Component::new("x", switch()).unwrap())
            .unwrap();
        let err = c
            .insert_component(Component::new("x", and2()).unwrap())
            .unwrap_err();
        assert!(matches!(err, NetlistError::DuplicateComponent(_)));
    }

    #[test]
    fn connect_enforces_direction_and_fan_in() {
        let mut c = Circuit::new();
        let s1 = c.add_component(switch()).unwrap();
        let s2 = c.add_component(switch()).unwrap();
        let g = c.add_component(and2()).unwrap();

        c.connect(Endpoint::new(s1.clone(), "out"), Endpoint::new(g.clone(), "in0"))
            .unwrap();

        let err = c
            .connect(Endpoint::new(s2.clone(), "out"), Endpoint::new(g.clone(), "in0"))
            .unwrap_err();
        assert!(matches!(err, NetlistError::InputAlreadyDriven { .. }));

        let err = c
            .connect(Endpoint::new(g.clone(), "in1"), Endpoint::new(s2.clone(), "out"))
            .unwrap_err();
        assert!(matches!(err, NetlistError::DirectionMismatch { .. }));

        let err = c
            .connect(Endpoint::new(s2, "out"), Endpoint::new(g, "in7"))
            .unwrap_err();
        assert!(matches!(err, NetlistError::UnknownTerminal { .. }));
    }

    #[test]
    fn fan_out_is_unbounded() {
        let mut c = Circuit::new();
        let s = c.add_component(switch()).unwrap();
        let g = c.add_component(and2()).unwrap();
        c.connect(Endpoint::new(s.clone(), "out"), Endpoint::new(g.clone(), "in0"))
            .unwrap();
        c.connect(Endpoint::new(s.clone(), "out"), Endpoint::new(g.clone(), "in1"))
            .unwrap();
        assert_eq!(c.wires().len(), 2);
        assert!(c.is_terminal_connected(&s, "out"));
        assert!(c.check().is_empty());
    }

    #[test]
    fn remove_component_drops_attached_wires() {
        let mut c = Circuit::new();
        let s = c.add_component(switch()).unwrap();
        let g = c.add_component(and2()).unwrap();
        c.connect(Endpoint::new(s.clone(), "out"), Endpoint::new(g.clone(), "in0"))
            .unwrap();
        c.remove_component(&s).unwrap();
        assert!(c.wires().is_empty());
        assert!(!c.is_terminal_connected(&g, "in0"));
        assert!(c.remove_component(&s).is_err());
    }

    #[test]
    fn update_component_prunes_vanished_terminals() {
        let mut c = Circuit::new();
        let s = c.add_component(switch()).unwrap();
        let g = c
            .add_component(ComponentKind::Gate {
                gate_type: GateType::Or,
                inputs: 3,
                bit_width: 1,
            })
            .unwrap();
        c.connect(Endpoint::new(s.clone(), "out"), Endpoint::new(g.clone(), "in0"))
            .unwrap();
        let w2 = c
            .connect(Endpoint::new(s, "out"), Endpoint::new(g.clone(), "in2"))
            .unwrap();

        let removed = c.update_component(&g, and2()).unwrap();
        assert_eq!(removed, vec![w2]);
        assert_eq!(c.wires().len(), 1);
    }

    #[test]
    fn disconnect_unknown_wire() {
        let mut c = Circuit::new();
        let err = c.disconnect(&WireId::from("9")).unwrap_err();
        assert!(matches!(err, NetlistError::UnknownWire(_)));
    }

    #[test]
    fn check_reports_loaded_problems() {
        let json = r#"{
            "components": [
                {"id": "a", "kind": "switch"},
                {"id": "b", "kind": "switch"},
                {"id": "n", "kind": "not", "bit_width": 1}
            ],
            "wires": [
                {"id": "1", "from": {"component": "a", "terminal": "out"}, "to": {"component": "n", "terminal": "in"}},
                {"id": "2", "from": {"component": "b", "terminal": "out"}, "to": {"component": "n", "terminal": "in"}},
                {"id": "3", "from": {"component": "ghost", "terminal": "out"}, "to": {"component": "n", "terminal": "in"}},
                {"id": "4", "from": {"component": "n", "terminal": "in"}, "to": {"component": "a", "terminal": "out"}}
            ]
        }"#;
        let c = Circuit::from_json(json).unwrap();
        let issues = c.check();
        assert!(issues
            .iter()
            .any(|i| matches!(i, NetlistIssue::DanglingWire { wire, .. } if wire.as_str() == "3")));
        assert!(issues
            .iter()
            .any(|i| matches!(i, NetlistIssue::WrongDirection { wire, .. } if wire.as_str() == "4")));
        assert!(issues.iter().any(
            |i| matches!(i, NetlistIssue::MultipleDrivers { wires, .. } if wires.len() == 3)
        ));
    }

    #[test]
    fn from_json_rejects_invalid_and_duplicate_components() {
        let bad = r#"{"components": [{"id": "1", "kind": "decoder", "input_bits": 0}]}"#;
        assert!(matches!(
            Circuit::from_json(bad).unwrap_err(),
            NetlistError::InvalidConfig { .. }
        ));

        let dup = r#"{"components": [{"id": "1", "kind": "led"}, {"id": "1", "kind": "led"}]}"#;
        assert!(matches!(
            Circuit::from_json(dup).unwrap_err(),
            NetlistError::DuplicateComponent(_)
        ));
    }

    #[test]
    fn from_json_accepts_largest_numeric_id() {
        let json = r#"{"components": [{"id": "18446744073709551615", "kind": "led"}, {"id": "4", "kind": "led"}],
            "wires": [{"id": "18446744073709551615", "from": {"component": "4", "terminal": "x"}, "to": {"component": "4", "terminal": "in"}}]}"#;
        let mut c = Circuit::from_json(json).unwrap();
        assert_eq!(c.add_component(ComponentKind::Led).unwrap().as_str(), "5");
        assert_eq!(next_numeric(["18446744073709551615"].into_iter()), 1);
    }

    #[test]
    fn saturated_counters_wrap_instead_of_overflowing() {
        let json = r#"{"components": [{"id": "1", "kind": "switch"}, {"id": "18446744073709551615", "kind": "led"}],
            "next_component_id": 18446744073709551615, "next_wire_id": 18446744073709551615}"#;
        let mut c = Circuit::from_json(json).unwrap();
        assert_eq!(c.add_component(ComponentKind::Led).unwrap().as_str(), "2");
        let w = c
            .connect(
                Endpoint::new("1", "out"),
                Endpoint::new("18446744073709551615", "in"),
            )
            .unwrap();
        assert_eq!(w.as_str(), "18446744073709551615");
        assert_eq!(successor(u64::MAX), 1);
    }

    #[test]
    fn from_json_advances_id_counters() {
        let json = r#"{"components": [{"id": "7", "kind": "led"}, {"id": "named", "kind": "led"}]}"#;
        let mut c = Circuit::from_json(json).unwrap();
        let id = c.add_component(ComponentKind::Led).unwrap();
        assert_eq!(id.as_str(), "8");
    }

    #[test]
    fn json_round_trip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("circuit.json");

        let mut c = Circuit::new();
        let s = c.add_component(switch()).unwrap();
        let l = c.add_component(ComponentKind::Led).unwrap();
        c.connect(Endpoint::new(s, "out"), Endpoint::new(l, "in"))
            .unwrap();
        c.save(&path).unwrap();

        let loaded = Circuit::load(&path).unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn issue_display() {
        let issue = NetlistIssue::MultipleDrivers {
            input: Endpoint::new("n", "in"),
            wires: vec![WireId::from("1"), WireId::from("2")],
        };
        assert_eq!(issue.to_string(), "input n.in is driven by 2 wires (1, 2)");
    }
}
