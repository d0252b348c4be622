//! # Biota Instruction Set
//!
//! 32-bit two-operand instruction set executed by the biota engine.
//!
//! ## Key Features
//! - 4096-word circular address space, all addressing taken modulo 4096
//! - 16 opcode slots (14 defined, the rest execute as NOP)
//! - 4 addressing modes per operand: immediate, relative, register, register-indirect
//! - 12-bit signed operand values, sign-extended on decode
//! - 4 signed 32-bit registers per process

pub mod encoding;
pub mod error;
pub mod format;
pub mod instruction;
pub mod mode;
pub mod opcode;
pub mod register;

pub use encoding::{decode, encode};
pub use error::BiotaError;
pub use format::disassemble;
pub use instruction::{Instruction, Operand};
pub use mode::AddressingMode;
pub use opcode::Opcode;
pub use register::{register_index, NUM_REGISTERS};

/// Number of words in the address space
pub const MEMORY_SIZE: usize = 4096;

/// Default cap on concurrently alive processes
pub const MAX_PROCESSES: usize = 1000;

/// Default per-write mutation probability
pub const DEFAULT_MUTATION_RATE: f64 = 0.001;

/// Storage and instruction unit
pub type Word = u32;

/// Wrap any signed offset into `[0, MEMORY_SIZE)`.
#[inline]
pub fn wrap_address(addr: i64) -> usize {
    addr.rem_euclid(MEMORY_SIZE as i64) as usize
}

/// Accept an address only if it is already inside the address space
pub fn check_address(addr: usize) -> Result<usize, BiotaError> {
    if addr < MEMORY_SIZE {
        Ok(addr)
    } else {
        Err(BiotaError::InvalidAddress(addr))
    }
}
