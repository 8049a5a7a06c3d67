//! Wires: directed connections from one output terminal to one input terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use trellis_common::{ComponentId, WireId};

/// One end of a wire: a terminal on a specific component.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    /// The component owning the terminal.
    pub component: ComponentId,
    /// The terminal name on that component.
    pub terminal: String,
}

impl Endpoint {
    /// Creates an endpoint from a component ID and terminal name.
    pub fn new(component: impl Into<ComponentId>, terminal: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            terminal: terminal.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.terminal)
    }
}

/// A directed wire. `from` must be an output and `to` an input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    /// Unique, editor-assigned identity.
    pub id: WireId,
    /// The driving output terminal.
    pub from: Endpoint,
    /// The driven input terminal.
    pub to: Endpoint,
}

impl Wire {
    /// Creates a wire between two endpoints.
    pub fn new(id: impl Into<WireId>, from: Endpoint, to: Endpoint) -> Self {
        Self {
            id: id.into(),
            from,
            to,
        }
    }

    /// Returns `true` if either end of the wire is on the given component.
    pub fn touches(&self, component: &ComponentId) -> bool {
        &self.from.component == component || &self.to.component == component
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_display() {
        assert_eq!(Endpoint::new("3", "out").to_string(), "3.out");
    }

    #[test]
    fn touches_either_end() {
        let w = Wire::new("w", Endpoint::new("a", "out"), Endpoint::new("b", "in"));
        assert!(w.touches(&ComponentId::from("a")));
        assert!(w.touches(&ComponentId::from("b")));
        assert!(!w.touches(&ComponentId::from("c")));
    }

    #[test]
    fn serde_shape() {
        let w = Wire::new("1", Endpoint::new("a", "out"), Endpoint::new("b", "in0"));
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["from"]["component"], "a");
        assert_eq!(json["to"]["terminal"], "in0");
    }
}
