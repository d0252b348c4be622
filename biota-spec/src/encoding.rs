//! # Instruction Encoding Constants and Helpers
//!
//! Centralized bit layout for biota words.
//!
//! ## Word Format (32-bit, MSB to LSB)
//!
//! ```text
//! [opcode:4][mode_a:2][val_a:12][mode_b:2][val_b:12]
//!  31..28    27..26    25..14    13..12    11..0
//! ```
//!
//! Operand values are 12-bit two's complement, range [-2048, 2047].
//! Encoding truncates out-of-range inputs, it never rejects them.

use crate::instruction::{Instruction, Operand};
use crate::mode::AddressingMode;
use crate::opcode::Opcode;
use crate::Word;

// ============================================================================
// Bit Position Constants
// ============================================================================

/// Opcode field: bits 28-31 (4 bits)
pub const OPCODE_SHIFT: u32 = 28;

/// Operand A mode: bits 26-27 (2 bits)
pub const MODE_A_SHIFT: u32 = 26;

/// Operand A value: bits 14-25 (12 bits)
pub const VAL_A_SHIFT: u32 = 14;

/// Operand B mode: bits 12-13 (2 bits)
pub const MODE_B_SHIFT: u32 = 12;

/// Operand B value: bits 0-11 (12 bits)
pub const VAL_B_SHIFT: u32 = 0;

// ============================================================================
// Field Masks
// ============================================================================

/// Opcode mask (4 bits)
pub const OPCODE_MASK: u32 = 0xF;

/// Mode mask (2 bits)
pub const MODE_MASK: u32 = 0x3;

/// Value field mask (12 bits)
pub const FIELD_MASK: u32 = 0xFFF;

/// Sign bit of a 12-bit value field
pub const FIELD_SIGN_BIT: u32 = 11;

/// Modulus of a value field (2^12)
pub const FIELD_MODULUS: u32 = 1 << 12;

/// Smallest encodable operand value
pub const FIELD_MIN: i32 = -2048;

/// Largest encodable operand value
pub const FIELD_MAX: i32 = 2047;

/// Both value fields of a word, in place: bits [25:14] and [11:0]
pub const VALUE_FIELDS_MASK: u32 = (FIELD_MASK << VAL_A_SHIFT) | (FIELD_MASK << VAL_B_SHIFT);

// ============================================================================
// Field Extraction Functions
// ============================================================================

/// Extract opcode (bits 28-31)
#[inline]
pub const fn extract_opcode(word: Word) -> u32 {
    (word >> OPCODE_SHIFT) & OPCODE_MASK
}

/// Extract operand A mode (bits 26-27)
#[inline]
pub const fn extract_mode_a(word: Word) -> u32 {
    (word >> MODE_A_SHIFT) & MODE_MASK
}

/// Extract raw operand A value (bits 14-25)
#[inline]
pub const fn extract_val_a(word: Word) -> u32 {
    (word >> VAL_A_SHIFT) & FIELD_MASK
}

/// Extract operand B mode (bits 12-13)
#[inline]
pub const fn extract_mode_b(word: Word) -> u32 {
    (word >> MODE_B_SHIFT) & MODE_MASK
}

/// Extract raw operand B value (bits 0-11)
#[inline]
pub const fn extract_val_b(word: Word) -> u32 {
    (word >> VAL_B_SHIFT) & FIELD_MASK
}

/// Sign-extend a 12-bit field into [-2048, 2047]
#[inline]
pub const fn sign_extend_12(field: u32) -> i32 {
    let field = field & FIELD_MASK;
    if field & (1 << FIELD_SIGN_BIT) != 0 {
        // field - 2^12
        field as i32 - FIELD_MODULUS as i32
    } else {
        field as i32
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Pack raw field values. Every input is masked to its field width.
#[inline]
pub const fn encode_raw(opcode: u32, mode_a: u32, val_a: i32, mode_b: u32, val_b: i32) -> Word {
    ((opcode & OPCODE_MASK) << OPCODE_SHIFT)
        | ((mode_a & MODE_MASK) << MODE_A_SHIFT)
        | (((val_a as u32) & FIELD_MASK) << VAL_A_SHIFT)
        | ((mode_b & MODE_MASK) << MODE_B_SHIFT)
        | (((val_b as u32) & FIELD_MASK) << VAL_B_SHIFT)
}

/// Encode a defined opcode with typed operand modes.
#[inline]
pub const fn encode(
    opcode: Opcode,
    mode_a: AddressingMode,
    val_a: i32,
    mode_b: AddressingMode,
    val_b: i32,
) -> Word {
    encode_raw(
        opcode.to_bits() as u32,
        mode_a.to_bits(),
        val_a,
        mode_b.to_bits(),
        val_b,
    )
}

/// Decode a word. Total: every 32-bit pattern decodes.
#[inline]
pub fn decode(word: Word) -> Instruction {
    Instruction {
        opcode: extract_opcode(word) as u8,
        a: Operand {
            mode: AddressingMode::from_bits(extract_mode_a(word)),
            value: sign_extend_12(extract_val_a(word)),
        },
        b: Operand {
            mode: AddressingMode::from_bits(extract_mode_b(word)),
            value: sign_extend_12(extract_val_b(word)),
        },
    }
}

// ============================================================================
// Packed Field Arithmetic
// ============================================================================

/// Add the two value fields of `src` to those of `dst`, each modulo 4096.
///
/// No carry crosses between the fields, and every bit of `dst` outside
/// [`VALUE_FIELDS_MASK`] is preserved.
#[inline]
pub const fn packed_field_add(dst: Word, src: Word) -> Word {
    let hi = (extract_val_a(dst) + extract_val_a(src)) & FIELD_MASK;
    let lo = (extract_val_b(dst) + extract_val_b(src)) & FIELD_MASK;
    (dst & !VALUE_FIELDS_MASK) | (hi << VAL_A_SHIFT) | (lo << VAL_B_SHIFT)
}
