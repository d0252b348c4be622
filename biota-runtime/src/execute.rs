//! Instruction execution for the biota engine

use crate::config::Tunables;
use crate::error::Result;
use crate::lineage::LineageMarker;
use crate::memory::Memory;
use crate::operand::{resolve_address, resolve_value, Location};
use crate::process::Process;
use biota_spec::encoding::packed_field_add;
use biota_spec::{
    decode, register_index, wrap_address, AddressingMode, Instruction, Opcode, Operand, MEMORY_SIZE,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// SYS command: set mutation rate to `arg / 1000`
pub const SYS_SET_MUTATION_RATE: i32 = 1;

/// SYS command: set the age limit to `arg`
pub const SYS_SET_MAX_AGE: i32 = 2;

/// Engine state an instruction may touch besides its own process
pub struct ExecContext<'a> {
    pub memory: &'a mut Memory,
    pub rng: &'a mut ChaCha8Rng,
    pub tunables: &'a mut Tunables,
    pub mutations: &'a mut u64,
}

impl ExecContext<'_> {
    /// Monitored write: the only path by which organisms change memory.
    ///
    /// With probability `mutation_rate` one uniformly chosen bit of `value`
    /// is flipped and the mutation counter incremented before the store.
    pub fn write(&mut self, addr: usize, value: i32, writer: LineageMarker) -> Result<()> {
        let target = wrap_address(addr as i64);
        let mut word = value as u32;
        if self.rng.gen::<f64>() < self.tunables.mutation_rate {
            let bit = self.rng.gen_range(0..32);
            word ^= 1 << bit;
            *self.mutations += 1;
        }
        self.memory.store(target, word, Some(writer))
    }
}

/// Where the instruction pointer goes after a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// ip + 1
    Next,
    /// ip + 2
    Skip,
    /// Absolute, already wrapped
    Jump(usize),
}

impl Flow {
    #[inline]
    pub fn next_ip(self, ip: usize) -> usize {
        match self {
            Flow::Next => wrap_address(ip as i64 + 1),
            Flow::Skip => wrap_address(ip as i64 + 2),
            Flow::Jump(target) => target,
        }
    }
}

/// Result of one executed instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub flow: Flow,
    /// Start address of a requested child; the scheduler applies the cap
    pub spawn: Option<usize>,
}

impl Outcome {
    const NEXT: Outcome = Outcome {
        flow: Flow::Next,
        spawn: None,
    };

    fn flow(flow: Flow) -> Self {
        Outcome { flow, spawn: None }
    }
}

/// Fetch, decode and execute the word at the process's instruction pointer
pub fn step_process(process: &mut Process, ctx: &mut ExecContext<'_>) -> Result<Outcome> {
    let word = ctx.memory.read(process.ip)?;
    execute(&decode(word), process, ctx)
}

/// Execute a single instruction. Does not move the instruction pointer.
pub fn execute(
    inst: &Instruction,
    process: &mut Process,
    ctx: &mut ExecContext<'_>,
) -> Result<Outcome> {
    let Some(opcode) = inst.opcode() else {
        return Ok(Outcome::NEXT);
    };

    let outcome = match opcode {
        Opcode::Nop => Outcome::NEXT,

        Opcode::Mov => {
            let value = resolve_value(process, inst.a, ctx.memory)?;
            write_destination(process, inst.b, ctx, |_| value)?;
            Outcome::NEXT
        }

        Opcode::Add => {
            let value = resolve_value(process, inst.a, ctx.memory)?;
            write_destination(process, inst.b, ctx, |current| current.wrapping_add(value))?;
            Outcome::NEXT
        }

        Opcode::Sub => {
            let value = resolve_value(process, inst.a, ctx.memory)?;
            write_destination(process, inst.b, ctx, |current| current.wrapping_sub(value))?;
            Outcome::NEXT
        }

        Opcode::Jmp => Outcome::flow(jump_target(process, inst.a)),

        Opcode::Jz => {
            if resolve_value(process, inst.b, ctx.memory)? == 0 {
                Outcome::flow(jump_target(process, inst.a))
            } else {
                Outcome::NEXT
            }
        }

        Opcode::Jnz => {
            if resolve_value(process, inst.b, ctx.memory)? != 0 {
                Outcome::flow(jump_target(process, inst.a))
            } else {
                Outcome::NEXT
            }
        }

        Opcode::Spwn => Outcome {
            flow: Flow::Next,
            spawn: resolve_address(process, inst.a).cell(),
        },

        Opcode::Seq => {
            let a = resolve_value(process, inst.a, ctx.memory)?;
            let b = resolve_value(process, inst.b, ctx.memory)?;
            Outcome::flow(if a == b { Flow::Skip } else { Flow::Next })
        }

        Opcode::Sne => {
            let a = resolve_value(process, inst.a, ctx.memory)?;
            let b = resolve_value(process, inst.b, ctx.memory)?;
            Outcome::flow(if a != b { Flow::Skip } else { Flow::Next })
        }

        Opcode::Rand => {
            let value = ctx.rng.gen_range(0..MEMORY_SIZE as i32);
            write_destination(process, inst.b, ctx, |_| value)?;
            Outcome::NEXT
        }

        Opcode::Sys => {
            let command = resolve_value(process, inst.a, ctx.memory)?;
            let argument = resolve_value(process, inst.b, ctx.memory)?;
            system_call(command, argument, ctx.tunables);
            Outcome::NEXT
        }

        Opcode::Addf => {
            let value = resolve_value(process, inst.a, ctx.memory)?;
            write_destination(process, inst.b, ctx, |current| {
                packed_field_add(current as u32, value as u32) as i32
            })?;
            Outcome::NEXT
        }

        Opcode::Die => {
            process.kill();
            Outcome::NEXT
        }
    };

    Ok(outcome)
}

fn jump_target(process: &Process, operand: Operand) -> Flow {
    match resolve_address(process, operand).cell() {
        Some(target) => Flow::Jump(target),
        None => Flow::Next,
    }
}

/// Destination handling shared by MOV, ADD, SUB, RAND and ADDF.
///
/// A register operand is updated in place. A memory operand goes through the
/// monitored write. An immediate operand discards the result.
fn write_destination<F>(
    process: &mut Process,
    dst: Operand,
    ctx: &mut ExecContext<'_>,
    compute: F,
) -> Result<()>
where
    F: FnOnce(i32) -> i32,
{
    if dst.mode == AddressingMode::Register {
        let reg = &mut process.registers[register_index(dst.value)];
        *reg = compute(*reg);
        return Ok(());
    }

    match resolve_address(process, dst) {
        Location::Cell(addr) => {
            let current = ctx.memory.read(addr)? as i32;
            ctx.write(addr, compute(current), process.marker)
        }
        Location::Immediate | Location::Register => Ok(()),
    }
}

fn system_call(command: i32, argument: i32, tunables: &mut Tunables) {
    match command {
        SYS_SET_MUTATION_RATE => {
            let rate = f64::from(argument.clamp(0, 1000)) / 1000.0;
            tunables.set_mutation_rate(rate);
            tracing::debug!(rate, "SYS: mutation rate changed");
        }
        SYS_SET_MAX_AGE => {
            let max_age = argument.max(0) as u64;
            tunables.set_max_age(max_age);
            tracing::debug!(max_age, "SYS: max age changed");
        }
        _ => {}
    }
}
