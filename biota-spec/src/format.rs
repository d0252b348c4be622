//! Memory listing for inspection

use crate::encoding::decode;
use crate::{wrap_address, Word};
use std::fmt::Write;

/// Render `words` as a listing, one instruction per line, with addresses
/// starting at `base` and wrapping at the end of the address space.
///
/// ```text
/// 0800  10004080  mov $0, $128
/// ```
pub fn disassemble(words: &[Word], base: usize) -> String {
    let mut out = String::new();
    for (offset, &word) in words.iter().enumerate() {
        let addr = wrap_address(base as i64 + offset as i64);
        // writing to a String cannot fail
        let _ = writeln!(out, "{:04x}  {:08x}  {}", addr, word, decode(word));
    }
    out
}
