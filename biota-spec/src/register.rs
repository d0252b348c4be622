//! Register selection

/// Number of registers per process
pub const NUM_REGISTERS: usize = 4;

/// Select a register from a signed operand value.
///
/// Uses `|value| % 4` so both positive and negative encodings reach all
/// four registers.
#[inline]
pub fn register_index(value: i32) -> usize {
    (value.unsigned_abs() % NUM_REGISTERS as u32) as usize
}
