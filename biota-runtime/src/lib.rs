//! # Biota Runtime
//!
//! Execute self-replicating programs in a shared, mutating address space.
//!
//! The engine owns a 4096-word circular memory and a list of processes.
//! Each cycle, every live process executes one instruction in round-robin
//! order. Writes that go through the interpreter may flip a random bit,
//! which is the source of variation in the population.
//!
//! ## Features
//!
//! - **Deterministic**: a seeded engine replays the same trajectory
//! - **Snapshots**: complete state export and all-or-nothing import
//! - **Lineage tracking**: cosmetic markers inherited with drift
//! - **Runtime tunables**: mutation rate and age limit, also settable from SYS
//!
//! ## Example
//!
//! ```rust
//! use biota_runtime::{Engine, EngineConfig};
//! use biota_spec::{encode, AddressingMode, Opcode};
//!
//! let mut engine = Engine::new(EngineConfig::default().with_seed(7));
//! let mov = encode(Opcode::Mov, AddressingMode::Immediate, 123, AddressingMode::Register, 0);
//! engine.seed(0, &[mov]);
//! engine.step();
//! assert_eq!(engine.processes()[0].registers[0], 123);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod execute;
pub mod lineage;
pub mod memory;
pub mod operand;
pub mod process;
pub mod snapshot;

pub use config::{EngineConfig, Tunables, DEFAULT_HISTORY_CAPACITY};
pub use engine::{Engine, PopulationStats};
pub use error::{Result, RuntimeError};
pub use execute::{execute, step_process, ExecContext, Flow, Outcome};
pub use lineage::LineageMarker;
pub use memory::Memory;
pub use process::Process;
pub use snapshot::{EngineSnapshot, SNAPSHOT_VERSION};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        let _ = EngineConfig::default();
        let _ = Memory::new();
        let _ = LineageMarker::new(0);
        assert_eq!(SNAPSHOT_VERSION, 1);
    }

    #[test]
    fn test_default_engine_is_empty() {
        let engine = Engine::default();
        assert!(engine.is_extinct());
        assert_eq!(engine.cycles(), 0);
        assert_eq!(engine.mutation_rate(), 0.001);
        assert_eq!(engine.max_processes(), 1000);
    }
}
