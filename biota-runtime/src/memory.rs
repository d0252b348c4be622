//! Address space
//!
//! 4096 words plus a parallel owner table. Every public accessor that takes
//! a signed offset wraps it; the `usize` accessors expect an already wrapped
//! address and report [`RuntimeError::OutOfBounds`] otherwise.

use crate::error::{Result, RuntimeError};
use crate::lineage::LineageMarker;
use biota_spec::{wrap_address, Word, MEMORY_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Word>,
    owners: Vec<Option<LineageMarker>>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            cells: vec![0; MEMORY_SIZE],
            owners: vec![None; MEMORY_SIZE],
        }
    }

    /// Rebuild from exported tables, checking both have exactly 4096 cells
    pub fn from_parts(cells: Vec<Word>, owners: Vec<Option<LineageMarker>>) -> Result<Self> {
        if cells.len() != MEMORY_SIZE {
            return Err(RuntimeError::invalid_snapshot(format!(
                "memory has {} cells, expected {}",
                cells.len(),
                MEMORY_SIZE
            )));
        }
        if owners.len() != MEMORY_SIZE {
            return Err(RuntimeError::invalid_snapshot(format!(
                "owner table has {} cells, expected {}",
                owners.len(),
                MEMORY_SIZE
            )));
        }
        if let Some(addr) = owners.iter().position(|o| o.map_or(false, |m| !m.is_valid())) {
            return Err(RuntimeError::invalid_snapshot(format!(
                "owner of cell {addr} is not a valid hue"
            )));
        }
        Ok(Memory { cells, owners })
    }

    #[inline]
    pub fn read(&self, addr: usize) -> Result<Word> {
        self.cells
            .get(addr)
            .copied()
            .ok_or(RuntimeError::OutOfBounds { address: addr })
    }

    /// Read at any signed offset, wrapped into the address space
    #[inline]
    pub fn read_wrapped(&self, addr: i64) -> Word {
        self.cells[wrap_address(addr)]
    }

    /// Store a word and stamp its owner. No mutation is applied here.
    pub fn store(&mut self, addr: usize, value: Word, owner: Option<LineageMarker>) -> Result<()> {
        if addr >= MEMORY_SIZE {
            return Err(RuntimeError::OutOfBounds { address: addr });
        }
        self.cells[addr] = value;
        self.owners[addr] = owner;
        Ok(())
    }

    /// Write `words` verbatim from `start`, wrapping at the end of the
    /// address space. Written cells lose their owner.
    pub fn load(&mut self, start: usize, words: &[Word]) {
        for (offset, &word) in words.iter().enumerate() {
            let addr = wrap_address(start as i64 + offset as i64);
            self.cells[addr] = word;
            self.owners[addr] = None;
        }
    }

    /// Copy `len` words starting at `start`, wrapping
    pub fn window(&self, start: usize, len: usize) -> Vec<Word> {
        (0..len)
            .map(|offset| self.read_wrapped(start as i64 + offset as i64))
            .collect()
    }

    #[inline]
    pub fn owner(&self, addr: usize) -> Option<LineageMarker> {
        self.owners.get(addr).copied().flatten()
    }

    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    pub fn owners(&self) -> &[Option<LineageMarker>] {
        &self.owners
    }

    /// Cells written by some process since they were last loaded
    pub fn owned_cells(&self) -> usize {
        self.owners.iter().filter(|o| o.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.owners.fill(None);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let mem = Memory::new();
        assert_eq!(mem.cells().len(), MEMORY_SIZE);
        assert!(mem.cells().iter().all(|&w| w == 0));
        assert_eq!(mem.owned_cells(), 0);
    }

    #[test]
    fn test_read_bounds() {
        let mem = Memory::new();
        assert_eq!(mem.read(4095).unwrap(), 0);
        assert!(matches!(
            mem.read(4096),
            Err(RuntimeError::OutOfBounds { address: 4096 })
        ));
    }

    #[test]
    fn test_read_wrapped() {
        let mut mem = Memory::new();
        mem.store(4095, 7, None).unwrap();
        assert_eq!(mem.read_wrapped(-1), 7);
        assert_eq!(mem.read_wrapped(8191), 7);
    }

    #[test]
    fn test_store_stamps_owner() {
        let mut mem = Memory::new();
        let marker = LineageMarker::new(42);
        mem.store(10, 0xDEAD_BEEF, Some(marker)).unwrap();
        assert_eq!(mem.read(10).unwrap(), 0xDEAD_BEEF);
        assert_eq!(mem.owner(10), Some(marker));
        assert_eq!(mem.owned_cells(), 1);
        assert!(mem.store(4096, 1, None).is_err());
    }

    #[test]
    fn test_load_wraps_and_clears_owner() {
        let mut mem = Memory::new();
        mem.store(0, 1, Some(LineageMarker::new(1))).unwrap();
        mem.load(4094, &[10, 20, 30]);
        assert_eq!(mem.read(4094).unwrap(), 10);
        assert_eq!(mem.read(4095).unwrap(), 20);
        assert_eq!(mem.read(0).unwrap(), 30);
        assert_eq!(mem.owner(0), None);
        assert_eq!(mem.window(4094, 3), vec![10, 20, 30]);
    }

    #[test]
    fn test_from_parts_validates() {
        assert!(matches!(
            Memory::from_parts(vec![0; 12], vec![None; MEMORY_SIZE]),
            Err(RuntimeError::InvalidSnapshot { .. })
        ));
        assert!(matches!(
            Memory::from_parts(vec![0; MEMORY_SIZE], vec![None; 12]),
            Err(RuntimeError::InvalidSnapshot { .. })
        ));

        let mut owners = vec![None; MEMORY_SIZE];
        owners[3] = Some(LineageMarker::new(5));
        let mem = Memory::from_parts(vec![0; MEMORY_SIZE], owners).unwrap();
        assert_eq!(mem.owner(3), Some(LineageMarker::new(5)));
    }

    #[test]
    fn test_clear() {
        let mut mem = Memory::new();
        mem.store(5, 5, Some(LineageMarker::new(5))).unwrap();
        mem.clear();
        assert_eq!(mem.read(5).unwrap(), 0);
        assert_eq!(mem.owner(5), None);
    }
}
