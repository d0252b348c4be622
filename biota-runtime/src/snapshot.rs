//! Engine export and import
//!
//! A snapshot holds everything needed to resume a run exactly: memory and
//! ownership, the process list, counters, tunables, the population history
//! and the state of both random streams. Import is all-or-nothing: a
//! snapshot is validated completely before any engine state changes.

use crate::config::Tunables;
use crate::engine::Engine;
use crate::error::{Result, RuntimeError};
use crate::lineage::LineageMarker;
use crate::memory::Memory;
use crate::process::Process;
use biota_spec::{Word, MEMORY_SIZE};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub version: u32,
    pub memory: Vec<Word>,
    pub owners: Vec<Option<LineageMarker>>,
    pub processes: Vec<Process>,
    pub cycles: u64,
    pub mutations: u64,
    pub mutation_rate: f64,
    pub max_age: u64,
    pub max_processes: usize,
    pub history: Vec<u32>,
    pub history_capacity: usize,
    pub rng: ChaCha8Rng,
    pub lineage_rng: ChaCha8Rng,
}

impl EngineSnapshot {
    /// Check every field against the engine's invariants
    pub fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(RuntimeError::UnsupportedSnapshotVersion {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }
        if self.memory.len() != MEMORY_SIZE {
            return Err(RuntimeError::invalid_snapshot(format!(
                "memory has {} cells, expected {}",
                self.memory.len(),
                MEMORY_SIZE
            )));
        }
        if self.owners.len() != MEMORY_SIZE {
            return Err(RuntimeError::invalid_snapshot(format!(
                "ownership map has {} entries, expected {}",
                self.owners.len(),
                MEMORY_SIZE
            )));
        }
        if self.owners.iter().flatten().any(|m| !m.is_valid()) {
            return Err(RuntimeError::invalid_snapshot("ownership marker out of range"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(RuntimeError::invalid_snapshot(format!(
                "mutation rate {} outside [0, 1]",
                self.mutation_rate
            )));
        }
        if self.history_capacity == 0 {
            return Err(RuntimeError::invalid_snapshot("history capacity is zero"));
        }
        if self.history.len() > self.history_capacity {
            return Err(RuntimeError::invalid_snapshot(format!(
                "history holds {} samples, capacity is {}",
                self.history.len(),
                self.history_capacity
            )));
        }

        for (index, process) in self.processes.iter().enumerate() {
            if process.ip >= MEMORY_SIZE {
                return Err(RuntimeError::invalid_snapshot(format!(
                    "process {} has ip {} outside memory",
                    index, process.ip
                )));
            }
            if !process.marker.is_valid() {
                return Err(RuntimeError::invalid_snapshot(format!(
                    "process {} has an invalid lineage marker",
                    index
                )));
            }
        }

        let alive = self.processes.iter().filter(|p| p.alive).count();
        if alive > self.max_processes {
            return Err(RuntimeError::invalid_snapshot(format!(
                "{} live processes exceed the cap of {}",
                alive, self.max_processes
            )));
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode and validate
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Self = bincode::deserialize(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl Engine {
    /// Capture the complete engine state
    pub fn export(&self) -> EngineSnapshot {
        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            memory: self.memory.cells().to_vec(),
            owners: self.memory.owners().to_vec(),
            processes: self.processes.clone(),
            cycles: self.cycles,
            mutations: self.mutations,
            mutation_rate: self.tunables.mutation_rate,
            max_age: self.tunables.max_age,
            max_processes: self.max_processes,
            history: self.history.iter().copied().collect(),
            history_capacity: self.history_capacity,
            rng: self.rng.clone(),
            lineage_rng: self.lineage_rng.clone(),
        }
    }

    /// Build an engine from a snapshot
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Result<Self> {
        snapshot.validate()?;

        let memory = Memory::from_parts(snapshot.memory, snapshot.owners)?;
        let history: VecDeque<u32> = snapshot.history.into_iter().collect();

        Ok(Self {
            memory,
            processes: snapshot.processes,
            cycles: snapshot.cycles,
            mutations: snapshot.mutations,
            tunables: Tunables {
                mutation_rate: snapshot.mutation_rate,
                max_age: snapshot.max_age,
            },
            max_processes: snapshot.max_processes,
            history,
            history_capacity: snapshot.history_capacity,
            rng: snapshot.rng,
            lineage_rng: snapshot.lineage_rng,
        })
    }

    /// Replace this engine's state with the snapshot's.
    ///
    /// On error the engine is left untouched.
    pub fn import(&mut self, snapshot: EngineSnapshot) -> Result<()> {
        let restored = Self::from_snapshot(snapshot)?;
        debug!(
            cycle = restored.cycles,
            processes = restored.processes.len(),
            "snapshot imported"
        );
        *self = restored;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use biota_spec::AddressingMode::{Immediate as Imm, Relative as Rel};
    use biota_spec::{encode, Opcode};

    fn running_engine() -> Engine {
        let config = EngineConfig::default().with_seed(11).with_mutation_rate(0.2);
        let mut engine = Engine::new(config);
        engine.seed(
            100,
            &[
                encode(Opcode::Mov, Rel, 0, Rel, 50),
                encode(Opcode::Spwn, Rel, 40, Imm, 0),
                encode(Opcode::Jmp, Rel, -2, Imm, 0),
            ],
        );
        engine.run(5);
        engine
    }

    #[test]
    fn test_export_import_identity() {
        let engine = running_engine();
        let restored = Engine::from_snapshot(engine.export()).unwrap();
        assert_eq!(restored, engine);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let engine = running_engine();
        let bytes = engine.export().to_bytes().unwrap();
        let snapshot = EngineSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(snapshot, engine.export());
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut snapshot = running_engine().export();
        snapshot.version = 99;
        assert!(matches!(
            snapshot.validate(),
            Err(RuntimeError::UnsupportedSnapshotVersion { expected: 1, found: 99 })
        ));
    }

    #[test]
    fn test_rejects_truncated_memory() {
        let mut snapshot = running_engine().export();
        snapshot.memory.truncate(100);
        assert!(matches!(
            snapshot.validate(),
            Err(RuntimeError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_process() {
        let mut snapshot = running_engine().export();
        snapshot.processes[0].ip = MEMORY_SIZE;
        assert!(snapshot.validate().is_err());
    }

    fn out_of_range_marker() -> LineageMarker {
        // how a corrupted file would carry it
        let bytes = bincode::serialize(&400u16).unwrap();
        bincode::deserialize(&bytes).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_owner() {
        let mut snapshot = running_engine().export();
        snapshot.owners[7] = Some(out_of_range_marker());
        assert!(matches!(
            snapshot.validate(),
            Err(RuntimeError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_rejects_process_marker() {
        let mut snapshot = running_engine().export();
        snapshot.processes[0].marker = out_of_range_marker();
        assert!(matches!(
            snapshot.validate(),
            Err(RuntimeError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_rejects_population_over_cap() {
        let mut snapshot = running_engine().export();
        assert!(snapshot.processes.iter().any(|p| p.alive));
        snapshot.max_processes = 0;
        assert!(matches!(
            snapshot.validate(),
            Err(RuntimeError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_rate_and_history() {
        let mut snapshot = running_engine().export();
        snapshot.mutation_rate = 1.5;
        assert!(snapshot.validate().is_err());

        let mut snapshot = running_engine().export();
        snapshot.mutation_rate = f64::NAN;
        assert!(snapshot.validate().is_err());

        let mut snapshot = running_engine().export();
        snapshot.history_capacity = 2;
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_failed_import_leaves_engine_untouched() {
        let mut engine = running_engine();
        let before = engine.clone();
        let mut snapshot = engine.export();
        snapshot.owners.pop();
        assert!(engine.import(snapshot).is_err());
        assert_eq!(engine, before);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(matches!(
            EngineSnapshot::from_bytes(&[1, 2, 3]),
            Err(RuntimeError::Serialization(_))
        ));
    }
}
