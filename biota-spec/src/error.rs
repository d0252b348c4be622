//! # Error Types for the Biota instruction set

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BiotaError {
    #[error("Invalid opcode: {0:#x}")]
    InvalidOpcode(u8),

    #[error("Invalid addressing mode: {0}")]
    InvalidMode(u8),

    #[error("Address out of range: {0} (valid range: 0-4095)")]
    InvalidAddress(usize),
}
