//! Scheduler for the biota engine

use crate::config::{EngineConfig, Tunables, DEFAULT_HISTORY_CAPACITY};
use crate::execute::{step_process, ExecContext, Flow};
use crate::memory::Memory;
use crate::process::Process;
use biota_spec::{wrap_address, Word};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Stream id of the cosmetic lineage generator
const LINEAGE_STREAM: u64 = 1;

/// Snapshot of population figures for display
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationStats {
    pub cycle: u64,
    pub population: usize,
    pub mutations: u64,
    pub max_depth: u32,
    pub mean_age: f64,
    pub owned_cells: usize,
}

/// Biota engine
///
/// Owns the address space, the process list and all tunables. Separate
/// engines share nothing and can run on separate threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub(crate) memory: Memory,

    /// Insertion order; dead entries linger until the next cycle starts
    pub(crate) processes: Vec<Process>,

    pub(crate) cycles: u64,

    pub(crate) mutations: u64,

    pub(crate) tunables: Tunables,

    pub(crate) max_processes: usize,

    /// One sample per executed cycle, oldest first
    pub(crate) history: VecDeque<u32>,

    pub(crate) history_capacity: usize,

    /// Simulation stream: mutation draws and RAND
    pub(crate) rng: ChaCha8Rng,

    /// Cosmetic stream: lineage markers only
    pub(crate) lineage_rng: ChaCha8Rng,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let mut lineage_rng = ChaCha8Rng::seed_from_u64(seed);
        lineage_rng.set_stream(LINEAGE_STREAM);

        let history_capacity = config.history_capacity.max(1);
        let history = VecDeque::with_capacity(history_capacity.min(DEFAULT_HISTORY_CAPACITY));
        debug!(seed, "engine created");

        Self {
            memory: Memory::new(),
            processes: Vec::new(),
            cycles: 0,
            mutations: 0,
            tunables: Tunables::from(&config),
            max_processes: config.max_processes,
            history,
            history_capacity,
            rng,
            lineage_rng,
        }
    }

    // ------------------------------------------------------------------
    // Load interface
    // ------------------------------------------------------------------

    /// Write words verbatim from `start`, bypassing mutation
    pub fn load(&mut self, start: usize, words: &[Word]) {
        self.memory.load(start, words);
    }

    /// Load words and place one root process at `start`.
    ///
    /// Returns the new process's index, or `None` if the population is full.
    pub fn seed(&mut self, start: usize, words: &[Word]) -> Option<usize> {
        self.load(start, words);
        self.spawn_root(start)
    }

    /// Create a root process at `ip`. Silently rejected at the population cap.
    pub fn spawn_root(&mut self, ip: usize) -> Option<usize> {
        if self.alive_count() >= self.max_processes {
            trace!(ip, "root placement rejected: population cap");
            return None;
        }
        self.processes.push(Process::root(ip, &mut self.lineage_rng));
        Some(self.processes.len() - 1)
    }

    // ------------------------------------------------------------------
    // Step interface
    // ------------------------------------------------------------------

    /// Advance one cycle.
    ///
    /// Every process alive at the start of the cycle executes exactly one
    /// instruction, in list order. Children spawned during the cycle are
    /// appended and first run in the next cycle. With no live processes this
    /// is a no-op and the cycle counter does not move.
    pub fn step(&mut self) {
        self.processes.retain(|p| p.alive);
        if self.processes.is_empty() {
            return;
        }

        let count = self.processes.len();
        for index in 0..count {
            self.run_turn(index);
        }

        self.cycles += 1;
        self.record_population();
        trace!(cycle = self.cycles, population = self.alive_count(), "cycle complete");
    }

    /// Step up to `cycles` times, stopping early on extinction.
    /// Returns the number of cycles executed.
    pub fn run(&mut self, cycles: u64) -> u64 {
        let start = self.cycles;
        for _ in 0..cycles {
            if self.is_extinct() {
                break;
            }
            self.step();
        }
        self.cycles - start
    }

    fn run_turn(&mut self, index: usize) {
        let process = &mut self.processes[index];
        let ip = process.ip;
        let mut ctx = ExecContext {
            memory: &mut self.memory,
            rng: &mut self.rng,
            tunables: &mut self.tunables,
            mutations: &mut self.mutations,
        };

        let (flow, spawn) = match step_process(process, &mut ctx) {
            Ok(outcome) => (outcome.flow, outcome.spawn),
            Err(err) => {
                debug!(ip, error = %err, "process fault");
                process.kill();
                (Flow::Next, None)
            }
        };

        if let Some(target) = spawn {
            self.spawn_child(index, target);
        }

        let max_age_hit = {
            let process = &mut self.processes[index];
            process.ip = flow.next_ip(ip);
            process.age += 1;
            self.tunables.is_expired(process.age)
        };
        if max_age_hit {
            let process = &mut self.processes[index];
            if process.alive {
                trace!(ip = process.ip, age = process.age, "process expired");
            }
            process.kill();
        }
    }

    fn spawn_child(&mut self, parent: usize, target: usize) {
        if self.alive_count() >= self.max_processes {
            trace!(target, "spawn rejected: population cap");
            return;
        }
        let child = self.processes[parent].child(target, &mut self.lineage_rng);
        self.processes.push(child);
    }

    fn record_population(&mut self) {
        let population = u32::try_from(self.alive_count()).unwrap_or(u32::MAX);
        self.history.push_back(population);
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
        }
    }

    // ------------------------------------------------------------------
    // Runtime-tunable parameters
    // ------------------------------------------------------------------

    /// Set the mutation probability, clamped to [0, 1]
    pub fn set_mutation_rate(&mut self, rate: f64) {
        self.tunables.set_mutation_rate(rate);
    }

    /// Set the age limit (0 = unlimited)
    pub fn set_max_age(&mut self, max_age: u64) {
        self.tunables.set_max_age(max_age);
    }

    pub fn mutation_rate(&self) -> f64 {
        self.tunables.mutation_rate
    }

    pub fn max_age(&self) -> u64 {
        self.tunables.max_age
    }

    pub fn max_processes(&self) -> usize {
        self.max_processes
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    pub fn history(&self) -> &VecDeque<u32> {
        &self.history
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn alive_count(&self) -> usize {
        self.processes.iter().filter(|p| p.alive).count()
    }

    pub fn is_extinct(&self) -> bool {
        self.alive_count() == 0
    }

    /// Clear memory, processes and counters. Tunables and random streams
    /// are kept.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.processes.clear();
        self.cycles = 0;
        self.mutations = 0;
        self.history.clear();
    }

    pub fn stats(&self) -> PopulationStats {
        let alive = self.processes.iter().filter(|p| p.alive);
        let (population, total_age, max_depth) = alive.fold((0usize, 0u64, 0u32), |acc, p| {
            (acc.0 + 1, acc.1.saturating_add(p.age), acc.2.max(p.depth))
        });
        let mean_age = if population == 0 {
            0.0
        } else {
            total_age as f64 / population as f64
        };

        PopulationStats {
            cycle: self.cycles,
            population,
            mutations: self.mutations,
            max_depth,
            mean_age,
            owned_cells: self.memory.owned_cells(),
        }
    }

    /// Word at any signed address, wrapped
    pub fn word_at(&self, addr: i64) -> Word {
        self.memory.read_wrapped(addr)
    }

    /// Index of the first live process whose ip is `addr` (wrapped)
    pub fn process_at(&self, addr: i64) -> Option<usize> {
        let addr = wrap_address(addr);
        self.processes.iter().position(|p| p.alive && p.ip == addr)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
