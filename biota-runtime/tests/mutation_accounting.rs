//! Mutation counter and bit-flip behavior

use biota_runtime::{Engine, EngineConfig};
use biota_spec::AddressingMode::{Immediate as Imm, Register as Reg, Relative as Rel};
use biota_spec::{encode, Opcode};

fn engine_at_rate(rate: f64) -> Engine {
    Engine::new(EngineConfig::default().with_seed(17).with_mutation_rate(rate))
}

#[test]
fn test_certain_mutation_flips_exactly_one_bit() {
    let mut engine = engine_at_rate(1.0);
    engine.seed(0, &[encode(Opcode::Mov, Imm, 5, Rel, 10)]);
    engine.step();

    assert_eq!(engine.mutations(), 1);
    assert_eq!((engine.word_at(10) ^ 5).count_ones(), 1);
}

#[test]
fn test_every_monitored_write_counts() {
    let mut engine = engine_at_rate(1.0);
    engine.seed(
        0,
        &[
            encode(Opcode::Mov, Imm, 1, Rel, 20),
            encode(Opcode::Add, Imm, 1, Rel, 20),
            encode(Opcode::Addf, Imm, 1, Rel, 20),
            encode(Opcode::Rand, Imm, 0, Rel, 20),
        ],
    );
    engine.run(4);
    assert_eq!(engine.mutations(), 4);
}

#[test]
fn test_register_and_control_flow_never_mutate() {
    let mut engine = engine_at_rate(1.0);
    engine.seed(
        0,
        &[
            encode(Opcode::Mov, Imm, 1, Reg, 0),
            encode(Opcode::Add, Imm, 1, Reg, 0),
            encode(Opcode::Seq, Imm, 0, Imm, 1),
            encode(Opcode::Nop, Imm, 0, Imm, 0),
            encode(Opcode::Mov, Imm, 1, Imm, 0),
            encode(Opcode::Jmp, Rel, 0, Imm, 0),
        ],
    );
    engine.run(10);
    assert_eq!(engine.mutations(), 0);
    assert_eq!(engine.processes()[0].registers[0], 2);
}

#[test]
fn test_zero_rate_never_mutates() {
    let mut engine = engine_at_rate(0.0);
    engine.seed(0, &[encode(Opcode::Mov, Rel, 0, Rel, 1)]);
    // the MOV copies itself forward one cell per cycle
    engine.run(500);
    assert_eq!(engine.mutations(), 0);
    assert_eq!(engine.word_at(499), engine.word_at(0));
}

#[test]
fn test_load_bypasses_mutation() {
    let mut engine = engine_at_rate(1.0);
    engine.load(0, &[0xDEAD_BEEF, 0x1234_5678]);
    assert_eq!(engine.word_at(0), 0xDEAD_BEEF);
    assert_eq!(engine.word_at(1), 0x1234_5678);
    assert_eq!(engine.mutations(), 0);
    assert_eq!(engine.memory().owned_cells(), 0);
}

#[test]
fn test_runtime_rate_change_takes_effect() {
    let mut engine = engine_at_rate(0.0);
    engine.seed(
        0,
        &[
            encode(Opcode::Mov, Imm, 3, Rel, 50),
            encode(Opcode::Mov, Imm, 3, Rel, 50),
        ],
    );
    engine.step();
    assert_eq!(engine.mutations(), 0);

    engine.set_mutation_rate(1.0);
    engine.step();
    assert_eq!(engine.mutations(), 1);
}
