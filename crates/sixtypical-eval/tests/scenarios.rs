//! End-to-end evaluation of complete programs.
//!
//! Each test builds (or loads) a whole program, runs it from `main`, and
//! inspects the final machine state.

use std::path::PathBuf;

use sixtypical_ast::model::{flag_z, reg_a, reg_x};
use sixtypical_ast::{Instr, LocationRef, Program, Ref, Routine, Type};
use sixtypical_eval::{EvalError, Evaluator, StepBudget, eval_program};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Count a cell down from 5 with `repeat { dec counter } until z`.
///
/// The loop exits on `z` rather than on `counter` itself: `until` stops once
/// its operand reads non-zero, so testing `counter` would leave after one pass.
#[test]
fn test_countdown_loop() {
    let counter = LocationRef::new(Type::Byte, "counter");
    let program = Program::new()
        .with_defn(counter.clone(), Some(0))
        .with_routine(Routine::new(
            "main",
            vec![
                Instr::Ld {
                    dest: reg_a(),
                    src: Ref::constant(5),
                },
                Instr::St {
                    dest: counter.clone().into(),
                    src: reg_a(),
                },
                Instr::Repeat {
                    src: flag_z(),
                    block: vec![Instr::Dec {
                        dest: counter.into(),
                    }]
                    .into(),
                },
            ],
        ));

    let ctx = eval_program(&program).unwrap();
    assert_eq!(ctx.value("counter"), Some(0));
    assert_eq!(ctx.value("z"), Some(1));
    assert_eq!(ctx.value("n"), Some(0));
    assert_eq!(ctx.value("c"), Some(0));
    assert_eq!(ctx.value("a"), Some(5));
}

/// `call` comes back: the instruction after it sees the callee's work.
#[test]
fn test_call_then_resume() {
    let program = Program::new()
        .with_routine(Routine::new("helper", vec![Instr::Inc { dest: reg_a() }]))
        .with_routine(Routine::new(
            "main",
            vec![
                Instr::Call {
                    location: LocationRef::new(Type::Routine, "helper"),
                },
                Instr::Ld {
                    dest: reg_x(),
                    src: reg_a(),
                },
            ],
        ));

    let ctx = eval_program(&program).unwrap();
    assert_eq!(ctx.value("a"), Some(1));
    assert_eq!(ctx.value("x"), Some(1));
}

/// 16-bit addition through byte parts, loaded from JSON.
///
/// `main` calls the low half, then jumps to the high half; the trailing
/// `inc sum` after the `goto` must never run.
#[test]
fn test_word_addition_from_json() {
    let program = Program::load(fixture("word_add.json")).unwrap();
    let ctx = eval_program(&program).unwrap();

    assert_eq!(ctx.value("sum"), Some(0x0200));
    assert_eq!(ctx.value("lhs"), Some(0x01ff));
    assert_eq!(ctx.value("c"), Some(0));

    let dump = ctx.to_string();
    assert!(dump.starts_with("a: 2\n"));
    assert!(dump.contains("sum: 512"));
    assert!(!dump.contains("add_low"));
}

/// A program that never terminates is bounded from the outside only.
#[test]
fn test_runaway_program_needs_external_budget() {
    let program = Program::new().with_routine(Routine::new(
        "main",
        vec![Instr::Goto {
            location: LocationRef::new(Type::Routine, "main"),
        }],
    ));

    let mut evaluator = Evaluator::new().with_observer(StepBudget::new(10_000));
    let err = evaluator.eval_program(&program).unwrap_err();
    assert_eq!(err, EvalError::StepBudgetExhausted { steps: 10_000 });
}
