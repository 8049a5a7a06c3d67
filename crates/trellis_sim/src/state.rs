//! Sequential state store.
//!
//! Holds register contents and memory buffers across clock edges. The
//! propagation engine only reads this store; [`crate::clock`] is the only
//! code path that changes it during a run.

use std::collections::HashMap;

use trellis_common::{mask_value, ComponentId, Value};
use trellis_netlist::component::{Component, ComponentKind};

use crate::clock;
use crate::error::SimError;
use crate::eval::SequentialSlot;
use crate::result::SimResult;

#[derive(Clone, Debug, PartialEq, Eq)]
struct RegisterSlot {
    value: Value,
    width: u32,
}

/// Per-component persistent state for registers and memories.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequentialState {
    registers: HashMap<ComponentId, RegisterSlot>,
    memories: HashMap<ComponentId, Vec<u8>>,
}

impl SequentialState {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with fresh state for every sequential component.
    pub fn for_components(components: &[Component]) -> Self {
        let mut state = Self::new();
        state.initialize(components);
        state
    }

    /// Discards everything and allocates fresh state for every sequential component.
    ///
    /// Registers start at 0. Memories are zero-filled to capacity, then
    /// overlaid with their `init` bytes.
    pub fn initialize(&mut self, components: &[Component]) {
        self.registers.clear();
        self.memories.clear();
        for component in components {
            self.allocate(component);
        }
    }

    /// Brings the store in line with an edited component list.
    ///
    /// Surviving registers keep their value (re-masked to the current width).
    /// Surviving memories keep their buffer unless the configured size
    /// changed. New sequential components get fresh state and state for
    /// removed components is dropped.
    pub fn reconcile(&mut self, components: &[Component]) {
        let mut registers = HashMap::with_capacity(self.registers.len());
        let mut memories = HashMap::with_capacity(self.memories.len());

        for component in components {
            match &component.kind {
                ComponentKind::Register { bit_width } => {
                    let value = self
                        .registers
                        .remove(&component.id)
                        .map_or(0, |slot| mask_value(slot.value, *bit_width));
                    registers.insert(
                        component.id.clone(),
                        RegisterSlot {
                            value,
                            width: *bit_width,
                        },
                    );
                }
                ComponentKind::Memory { .. } => {
                    let capacity = component.kind.memory_capacity().unwrap_or(0);
                    let buffer = match self.memories.remove(&component.id) {
                        Some(buffer) if buffer.len() == capacity => buffer,
                        _ => fresh_memory(&component.kind),
                    };
                    memories.insert(component.id.clone(), buffer);
                }
                _ => {}
            }
        }

        let dropped = self.registers.len() + self.memories.len();
        if dropped > 0 {
            log::debug!("dropped sequential state for {dropped} component(s)");
        }
        self.registers = registers;
        self.memories = memories;
    }

    /// Latches registers and writes memories from a stabilized result.
    ///
    /// Equivalent to [`clock::step`].
    pub fn apply_clock_edge(&mut self, components: &[Component], stabilized: &SimResult) -> usize {
        clock::step(components, stabilized, self)
    }

    /// Returns the stored value of a register.
    pub fn register(&self, id: &ComponentId) -> Option<Value> {
        self.registers.get(id).map(|slot| slot.value)
    }

    /// Returns the buffer of a memory.
    pub fn memory(&self, id: &ComponentId) -> Option<&[u8]> {
        self.memories.get(id).map(Vec::as_slice)
    }

    /// Returns the state of a sequential component in the form the evaluators take.
    pub fn slot(&self, id: &ComponentId) -> Option<SequentialSlot<'_>> {
        self.registers
            .get(id)
            .map(|slot| SequentialSlot::Register(slot.value))
            .or_else(|| self.memory(id).map(SequentialSlot::Memory))
    }

    /// Overwrites a register, masking to its width.
    pub fn set_register(&mut self, id: &ComponentId, value: Value) -> Result<(), SimError> {
        let slot = self
            .registers
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownComponent(id.clone()))?;
        slot.value = mask_value(value, slot.width);
        Ok(())
    }

    /// Copies bytes into a memory starting at `offset`. Bytes past the end are dropped.
    pub fn write_memory(
        &mut self,
        id: &ComponentId,
        offset: usize,
        bytes: &[u8],
    ) -> Result<(), SimError> {
        let buffer = self
            .memories
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownComponent(id.clone()))?;
        if offset < buffer.len() {
            let end = buffer.len().min(offset.saturating_add(bytes.len()));
            buffer[offset..end].copy_from_slice(&bytes[..end - offset]);
        }
        Ok(())
    }

    /// Number of registers tracked.
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Number of memories tracked.
    pub fn memory_count(&self) -> usize {
        self.memories.len()
    }

    fn allocate(&mut self, component: &Component) {
        match &component.kind {
            ComponentKind::Register { bit_width } => {
                self.registers.insert(
                    component.id.clone(),
                    RegisterSlot {
                        value: 0,
                        width: *bit_width,
                    },
                );
            }
            ComponentKind::Memory { .. } => {
                self.memories
                    .insert(component.id.clone(), fresh_memory(&component.kind));
            }
            _ => {}
        }
    }
}

fn fresh_memory(kind: &ComponentKind) -> Vec<u8> {
    let mut buffer = vec![0; kind.memory_capacity().unwrap_or(0)];
    if let ComponentKind::Memory { init, .. } = kind {
        let n = init.len().min(buffer.len());
        buffer[..n].copy_from_slice(&init[..n]);
    }
    buffer
}
