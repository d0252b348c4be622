//! Operand addressing modes

use crate::error::BiotaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Addressing mode (2 bits). Every bit pattern is a valid mode.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    /// The operand value itself
    Immediate = 0,
    /// The word at `ip + value`
    Relative = 1,
    /// Register `|value| % 4`
    Register = 2,
    /// The word at the address held in register `|value| % 4`
    RegIndirect = 3,
}

impl AddressingMode {
    /// Mode width in bits
    pub const BITS: u32 = 2;

    /// Mode mask (0x3 for 2 bits)
    pub const MASK: u32 = 0x3;

    pub const ALL: [AddressingMode; 4] = [
        AddressingMode::Immediate,
        AddressingMode::Relative,
        AddressingMode::Register,
        AddressingMode::RegIndirect,
    ];

    /// Decode the low 2 bits of `bits`. Total: never fails.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & Self::MASK {
            0 => AddressingMode::Immediate,
            1 => AddressingMode::Relative,
            2 => AddressingMode::Register,
            _ => AddressingMode::RegIndirect,
        }
    }

    #[inline]
    pub const fn to_bits(self) -> u32 {
        self as u32
    }

    /// Operand prefix used by the formatter
    pub const fn sigil(self) -> char {
        match self {
            AddressingMode::Immediate => '#',
            AddressingMode::Relative => '$',
            AddressingMode::Register => '%',
            AddressingMode::RegIndirect => '@',
        }
    }
}

impl TryFrom<u8> for AddressingMode {
    type Error = BiotaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if u32::from(value) > Self::MASK {
            return Err(BiotaError::InvalidMode(value));
        }
        Ok(Self::from_bits(u32::from(value)))
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressingMode::Immediate => "immediate",
            AddressingMode::Relative => "relative",
            AddressingMode::Register => "register",
            AddressingMode::RegIndirect => "reg-indirect",
        };
        f.write_str(name)
    }
}
