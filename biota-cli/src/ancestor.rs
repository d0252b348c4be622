//! Demo ancestor payload

use biota_spec::AddressingMode::{Immediate, Relative};
use biota_spec::{encode, Opcode, Word};

/// Relocating replicator.
///
/// `length` copies of `MOV $0, $offset` move the copy block `offset` words
/// ahead, then `SPWN` starts a child on the copy and the parent dies.
pub fn relocating_replicator(length: usize, offset: i32) -> Vec<Word> {
    let mut program: Vec<Word> = (0..length)
        .map(|_| encode(Opcode::Mov, Relative, 0, Relative, offset))
        .collect();
    let spawn_offset = offset - length as i32;
    program.push(encode(Opcode::Spwn, Relative, spawn_offset, Immediate, 0));
    program.push(encode(Opcode::Die, Immediate, 0, Immediate, 0));
    program
}
