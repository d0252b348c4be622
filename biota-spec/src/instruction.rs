//! Decoded instruction view
//!
//! An [`Instruction`] is a transient, structured view of a word. It keeps
//! the raw 4-bit opcode so that unassigned slots survive a decode and can be
//! executed as NOP.

use crate::encoding::encode_raw;
use crate::mode::AddressingMode;
use crate::opcode::Opcode;
use crate::Word;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One operand: addressing mode plus sign-extended 12-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand {
    pub mode: AddressingMode,
    pub value: i32,
}

impl Operand {
    #[inline]
    pub const fn new(mode: AddressingMode, value: i32) -> Self {
        Self { mode, value }
    }

    pub const fn immediate(value: i32) -> Self {
        Self::new(AddressingMode::Immediate, value)
    }

    pub const fn relative(value: i32) -> Self {
        Self::new(AddressingMode::Relative, value)
    }

    pub const fn register(index: i32) -> Self {
        Self::new(AddressingMode::Register, index)
    }

    pub const fn indirect(index: i32) -> Self {
        Self::new(AddressingMode::RegIndirect, index)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mode.sigil(), self.value)
    }
}

/// Decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    /// Raw opcode field (0-15)
    pub opcode: u8,
    /// Source-like operand
    pub a: Operand,
    /// Destination-like operand
    pub b: Operand,
}

impl Instruction {
    pub const fn new(opcode: Opcode, a: Operand, b: Operand) -> Self {
        Self {
            opcode: opcode.to_bits(),
            a,
            b,
        }
    }

    /// Defined opcode, or `None` for an unassigned slot
    #[inline]
    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_bits(self.opcode)
    }

    /// Re-encode into a word (values truncated to 12 bits)
    #[inline]
    pub const fn encode(&self) -> Word {
        encode_raw(
            self.opcode as u32,
            self.a.mode.to_bits(),
            self.a.value,
            self.b.mode.to_bits(),
            self.b.value,
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode() {
            Some(Opcode::Nop) => f.write_str("nop"),
            Some(Opcode::Die) => f.write_str("die"),
            Some(Opcode::Rand) => write!(f, "rand {}", self.b),
            Some(op @ (Opcode::Jmp | Opcode::Spwn)) => write!(f, "{} {}", op, self.a),
            Some(op) => write!(f, "{} {}, {}", op, self.a, self.b),
            None => write!(f, "op{} {}, {}", self.opcode, self.a, self.b),
        }
    }
}
