//! Step-back support for debugging.
use log::debug;

use crate::{
    error::Chip8Result,
    vm::{Chip8Vm, Flow, Snapshot},
};

/// Stack of machine snapshots, most recent last.
///
/// A debugger steps the VM through [`History::step`], which records the
/// state before each instruction, and can then walk backwards with
/// [`History::rewind`]. The history is unbounded.
#[derive(Debug, Default, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Record the current machine state.
    pub fn record(&mut self, vm: &Chip8Vm) {
        self.snapshots.push(vm.snapshot());
    }

    /// Record the current state, then execute one instruction.
    ///
    /// The snapshot is kept even when the step fails, so the failing
    /// instruction can be rewound to and inspected.
    pub fn step(&mut self, vm: &mut Chip8Vm) -> Chip8Result<Flow> {
        self.record(vm);
        vm.step()
    }

    /// Restore the most recent snapshot.
    ///
    /// Returns `false`, leaving the VM untouched, when there is nothing
    /// to rewind to.
    pub fn rewind(&mut self, vm: &mut Chip8Vm) -> bool {
        match self.snapshots.pop() {
            Some(snapshot) => {
                debug!(
                    "rewind to {:04X}, {} snapshots left",
                    snapshot.cpu().pc(),
                    self.snapshots.len()
                );
                vm.restore(snapshot);
                true
            }
            None => false,
        }
    }
}
