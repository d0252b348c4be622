//! Organism execution context

use crate::lineage::LineageMarker;
use biota_spec::{wrap_address, NUM_REGISTERS};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One organism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Instruction pointer (0-4095)
    pub ip: usize,

    /// General-purpose registers r0-r3
    pub registers: [i32; NUM_REGISTERS],

    /// Cleared by DIE, a fault, or the age limit
    pub alive: bool,

    /// Turns executed since creation
    pub age: u64,

    /// 0 for roots, parent depth + 1 for spawned children
    pub depth: u32,

    /// Cosmetic lineage hue
    pub marker: LineageMarker,
}

impl Process {
    /// Root process at `ip` (wrapped) with a random marker
    pub fn root<R: Rng + ?Sized>(ip: usize, rng: &mut R) -> Self {
        Self {
            ip: wrap_address(ip as i64),
            registers: [0; NUM_REGISTERS],
            alive: true,
            age: 0,
            depth: 0,
            marker: LineageMarker::random(rng),
        }
    }

    /// Child of `self` starting at `ip`, marker drifted from the parent's
    pub fn child<R: Rng + ?Sized>(&self, ip: usize, rng: &mut R) -> Self {
        Self {
            ip: wrap_address(ip as i64),
            registers: [0; NUM_REGISTERS],
            alive: true,
            age: 0,
            depth: self.depth.saturating_add(1),
            marker: self.marker.drift(rng),
        }
    }

    /// Mark dead. Removal happens at the start of the next cycle.
    #[inline]
    pub fn kill(&mut self) {
        self.alive = false;
    }
}
