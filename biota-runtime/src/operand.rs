//! Operand resolution
//!
//! Turns an operand into a value (read side) or a writable cell (write side)
//! relative to the issuing process.

use crate::error::Result;
use crate::memory::Memory;
use crate::process::Process;
use biota_spec::{register_index, wrap_address, AddressingMode, Operand};

/// Write-side resolution of an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// A wrapped memory cell
    Cell(usize),
    /// Immediate operand: nothing to write to
    Immediate,
    /// Register operand: not a memory cell. Behaves like `Immediate` for
    /// jumps and spawns; destination writes handle registers separately.
    Register,
}

impl Location {
    #[inline]
    pub fn cell(self) -> Option<usize> {
        match self {
            Location::Cell(addr) => Some(addr),
            Location::Immediate | Location::Register => None,
        }
    }
}

/// Effective address held in a register, wrapped into the address space
#[inline]
fn register_address(process: &Process, operand: Operand) -> usize {
    wrap_address(i64::from(process.registers[register_index(operand.value)]))
}

/// Read-side resolution
pub fn resolve_value(process: &Process, operand: Operand, memory: &Memory) -> Result<i32> {
    let value = match operand.mode {
        AddressingMode::Immediate => operand.value,
        AddressingMode::Relative => {
            let addr = wrap_address(process.ip as i64 + i64::from(operand.value));
            memory.read(addr)? as i32
        }
        AddressingMode::Register => process.registers[register_index(operand.value)],
        AddressingMode::RegIndirect => memory.read(register_address(process, operand))? as i32,
    };
    Ok(value)
}

/// Write-side resolution
pub fn resolve_address(process: &Process, operand: Operand) -> Location {
    match operand.mode {
        AddressingMode::Immediate => Location::Immediate,
        AddressingMode::Relative => {
            Location::Cell(wrap_address(process.ip as i64 + i64::from(operand.value)))
        }
        AddressingMode::Register => Location::Register,
        AddressingMode::RegIndirect => Location::Cell(register_address(process, operand)),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::lineage::LineageMarker;
    use biota_spec::MEMORY_SIZE;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_relative_in_range(ip in 0usize..MEMORY_SIZE, offset in any::<i32>()) {
            let p = Process {
                ip,
                registers: [0; 4],
                alive: true,
                age: 0,
                depth: 0,
                marker: LineageMarker::new(0),
            };
            let addr = resolve_address(&p, Operand::relative(offset)).cell().unwrap();
            prop_assert!(addr < MEMORY_SIZE);
            prop_assert_eq!(addr as i64, (ip as i64 + i64::from(offset)).rem_euclid(4096));
        }

        #[test]
        fn test_indirect_in_range(reg in any::<i32>(), index in -2048i32..2048) {
            let mut registers = [0; 4];
            registers[register_index(index)] = reg;
            let p = Process {
                ip: 0,
                registers,
                alive: true,
                age: 0,
                depth: 0,
                marker: LineageMarker::new(0),
            };
            let addr = resolve_address(&p, Operand::indirect(index)).cell().unwrap();
            prop_assert!(addr < MEMORY_SIZE);
        }
    }
}
