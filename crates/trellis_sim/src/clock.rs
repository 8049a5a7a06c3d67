//! Clock-edge driver.
//!
//! An edge happens in two phases. [`plan_edge`] reads every register `d`
//! and every RAM `addr`/`data`/`we` from the stabilized pre-edge result.
//! Only then does [`step`] commit the planned updates, so no sequential
//! component observes another's post-edge state within the same edge.

use trellis_common::{mask_value, ComponentId, Value};
use trellis_netlist::component::{Component, ComponentKind, MemoryType};

use crate::eval::word_offset;
use crate::result::SimResult;
use crate::state::SequentialState;

/// One pending state change computed from the pre-edge result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeUpdate {
    /// Latch a new register value.
    Register {
        /// The register.
        id: ComponentId,
        /// Value read from `d`, masked to the register width.
        value: Value,
    },
    /// Store one word into a RAM.
    MemoryWrite {
        /// The memory.
        id: ComponentId,
        /// Byte offset of the word.
        offset: usize,
        /// The word, little-endian.
        bytes: Vec<u8>,
    },
}

/// Computes the updates a clock edge would make, without touching any state.
///
/// ROMs never produce updates. RAMs produce one only while `we` is nonzero.
pub fn plan_edge(components: &[Component], stabilized: &SimResult) -> Vec<EdgeUpdate> {
    let read = |id: &ComponentId, terminal: &str, width: u32| {
        mask_value(stabilized.get(id, terminal).unwrap_or(0), width)
    };

    components
        .iter()
        .filter_map(|component| match &component.kind {
            ComponentKind::Register { bit_width } => Some(EdgeUpdate::Register {
                id: component.id.clone(),
                value: read(&component.id, "d", *bit_width),
            }),
            ComponentKind::Memory {
                memory_type: MemoryType::Ram,
                address_size,
                word_size,
                ..
            } => {
                if read(&component.id, "we", 1) == 0 {
                    return None;
                }
                let addr = read(&component.id, "addr", *address_size);
                let data = read(&component.id, "data", word_size * 8);
                let len = (*word_size as usize).min(std::mem::size_of::<Value>());
                Some(EdgeUpdate::MemoryWrite {
                    id: component.id.clone(),
                    offset: word_offset(addr, *word_size),
                    bytes: data.to_le_bytes()[..len].to_vec(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Applies one clock edge to `state` and returns the number of updates committed.
///
/// The caller must pass a stabilized result and re-stabilize afterwards.
pub fn step(components: &[Component], stabilized: &SimResult, state: &mut SequentialState) -> usize {
    let updates = plan_edge(components, stabilized);
    let mut committed = 0;
    for update in &updates {
        let applied = match update {
            EdgeUpdate::Register { id, value } => state.set_register(id, *value),
            EdgeUpdate::MemoryWrite { id, offset, bytes } => state.write_memory(id, *offset, bytes),
        };
        match applied {
            Ok(()) => committed += 1,
            Err(e) => log::debug!("skipping clock update: {e}"),
        }
    }
    log::info!(
        "clock edge: {committed} update(s) across {} sequential component(s)",
        state.register_count() + state.memory_count()
    );
    committed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(id: &str) -> Component {
        Component::new(id, ComponentKind::Register { bit_width: 8 }).unwrap()
    }

    fn memory(id: &str, memory_type: MemoryType) -> Component {
        Component::new(
            id,
            ComponentKind::Memory {
                memory_type,
                address_size: 2,
                word_size: 2,
                init: vec![],
            },
        )
        .unwrap()
    }

    #[test]
    fn register_latches_d() {
        let components = vec![register("r")];
        let mut state = SequentialState::for_components(&components);
        let mut result = SimResult::initial(&components);
        result.set(&"r".into(), "d", 123);

        assert_eq!(step(&components, &result, &mut state), 1);
        assert_eq!(state.register(&"r".into()), Some(123));
    }

    #[test]
    fn shift_chain_updates_atomically() {
        // r1.q feeds r2.d; both latch values from before the edge.
        let components = vec![register("r1"), register("r2")];
        let mut state = SequentialState::for_components(&components);
        state.set_register(&"r1".into(), 5).unwrap();
        let mut result = SimResult::initial(&components);
        result.set(&"r1".into(), "q", 5);
        result.set(&"r1".into(), "d", 9);
        result.set(&"r2".into(), "d", 5);

        step(&components, &result, &mut state);
        assert_eq!(state.register(&"r1".into()), Some(9));
        assert_eq!(state.register(&"r2".into()), Some(5));
    }

    #[test]
    fn ram_writes_only_when_enabled() {
        let components = vec![memory("m", MemoryType::Ram)];
        let mut state = SequentialState::for_components(&components);
        let mut result = SimResult::initial(&components);
        result.set(&"m".into(), "addr", 1);
        result.set(&"m".into(), "data", 0xBEEF);

        assert_eq!(step(&components, &result, &mut state), 0);
        assert_eq!(state.memory(&"m".into()).unwrap(), &[0u8; 8][..]);

        result.set(&"m".into(), "we", 1);
        step(&components, &result, &mut state);
        assert_eq!(
            state.memory(&"m".into()).unwrap(),
            &[0, 0, 0xEF, 0xBE, 0, 0, 0, 0][..]
        );
    }

    #[test]
    fn rom_never_changes() {
        let components = vec![memory("m", MemoryType::Rom)];
        let mut state = SequentialState::for_components(&components);
        let mut result = SimResult::initial(&components);
        result.set(&"m".into(), "we", 1);
        result.set(&"m".into(), "data", 0xFFFF);

        assert!(plan_edge(&components, &result).is_empty());
        step(&components, &result, &mut state);
        assert_eq!(state.memory(&"m".into()).unwrap(), &[0u8; 8][..]);
    }

    #[test]
    fn apply_clock_edge_delegates() {
        let components = vec![register("r")];
        let mut state = SequentialState::for_components(&components);
        let mut result = SimResult::initial(&components);
        result.set(&"r".into(), "d", 7);
        state.apply_clock_edge(&components, &result);
        assert_eq!(state.register(&"r".into()), Some(7));
    }
}
