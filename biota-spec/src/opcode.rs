//! # Biota Opcode Definitions
//!
//! Opcodes occupy the top 4 bits of a word (0x0-0xF).
//!
//! ## Opcode Map
//!
//! - 0x0-0x3: Data (NOP, MOV, ADD, SUB)
//! - 0x4-0x6: Control flow (JMP, JZ, JNZ)
//! - 0x7: Reproduction (SPWN)
//! - 0x8-0x9: Skip (SEQ, SNE)
//! - 0xA-0xB: Environment (RAND, SYS)
//! - 0xC-0xD: Unassigned, executed as NOP
//! - 0xE: Packed field add (ADDF)
//! - 0xF: DIE

use crate::error::BiotaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction opcode (4 bits)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// NOP: no effect
    Nop = 0x0,
    /// MOV: dst = a
    Mov = 0x1,
    /// ADD: dst = dst + a
    Add = 0x2,
    /// SUB: dst = dst - a
    Sub = 0x3,
    /// JMP: ip = addr(a)
    Jmp = 0x4,
    /// JZ: if b == 0 { ip = addr(a) }
    Jz = 0x5,
    /// JNZ: if b != 0 { ip = addr(a) }
    Jnz = 0x6,
    /// SPWN: new process at addr(a)
    Spwn = 0x7,
    /// SEQ: if a == b skip next word
    Seq = 0x8,
    /// SNE: if a != b skip next word
    Sne = 0x9,
    /// RAND: dst = random address
    Rand = 0xA,
    /// SYS: engine reconfiguration, command a, argument b
    Sys = 0xB,
    /// ADDF: dst fields [25:14] and [11:0] += a fields, no carry between them
    Addf = 0xE,
    /// DIE: terminate the executing process
    Die = 0xF,
}

impl Opcode {
    /// Opcode width in bits
    pub const BITS: u32 = 4;

    /// Opcode mask (0xF for 4 bits)
    pub const MASK: u32 = 0xF;

    /// All defined opcodes, in numeric order
    pub const ALL: [Opcode; 14] = [
        Opcode::Nop,
        Opcode::Mov,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Jmp,
        Opcode::Jz,
        Opcode::Jnz,
        Opcode::Spwn,
        Opcode::Seq,
        Opcode::Sne,
        Opcode::Rand,
        Opcode::Sys,
        Opcode::Addf,
        Opcode::Die,
    ];

    /// Try to convert from the raw 4-bit field. Unassigned slots yield `None`.
    pub fn from_bits(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Opcode::Nop),
            0x1 => Some(Opcode::Mov),
            0x2 => Some(Opcode::Add),
            0x3 => Some(Opcode::Sub),
            0x4 => Some(Opcode::Jmp),
            0x5 => Some(Opcode::Jz),
            0x6 => Some(Opcode::Jnz),
            0x7 => Some(Opcode::Spwn),
            0x8 => Some(Opcode::Seq),
            0x9 => Some(Opcode::Sne),
            0xA => Some(Opcode::Rand),
            0xB => Some(Opcode::Sys),
            0xE => Some(Opcode::Addf),
            0xF => Some(Opcode::Die),
            _ => None,
        }
    }

    /// Convert to the raw 4-bit field
    #[inline]
    pub const fn to_bits(self) -> u8 {
        self as u8
    }

    /// Lowercase mnemonic
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Mov => "mov",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Jmp => "jmp",
            Opcode::Jz => "jz",
            Opcode::Jnz => "jnz",
            Opcode::Spwn => "spwn",
            Opcode::Seq => "seq",
            Opcode::Sne => "sne",
            Opcode::Rand => "rand",
            Opcode::Sys => "sys",
            Opcode::Addf => "addf",
            Opcode::Die => "die",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = BiotaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_bits(value).ok_or(BiotaError::InvalidOpcode(value))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_bits(op.to_bits()), Some(op));
        }
    }

    #[test]
    fn test_try_from_rejects_unassigned() {
        assert_eq!(Opcode::try_from(0xF), Ok(Opcode::Die));
        assert_eq!(Opcode::try_from(12), Err(BiotaError::InvalidOpcode(12)));
        assert_eq!(Opcode::try_from(0x40), Err(BiotaError::InvalidOpcode(0x40)));
    }

    #[test]
    fn test_unassigned_slots() {
        assert_eq!(Opcode::from_bits(0xC), None);
        assert_eq!(Opcode::from_bits(0xD), None);
        assert_eq!(Opcode::from_bits(0x10), None);
    }

    #[test]
    fn test_opcode_values() {
        assert_eq!(Opcode::Mov.to_bits(), 1);
        assert_eq!(Opcode::Spwn.to_bits(), 7);
        assert_eq!(Opcode::Sys.to_bits(), 11);
        assert_eq!(Opcode::Addf.to_bits(), 14);
        assert_eq!(Opcode::Die.to_bits(), 15);
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Opcode::Spwn.to_string(), "spwn");
        assert_eq!(Opcode::Addf.mnemonic(), "addf");
    }
}
