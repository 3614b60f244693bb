//! Integration tests for the public `ConditionEngine` API.
//!
//! The engine unit tests cover the pass mechanics on a bare `Vec`; these
//! drive it the way firmware code does: a shared context struct, rules
//! built from the `conditions` helpers, and rules added after startup.

use bootcause::app::ports::BootStatePort;
use bootcause::boot::{ResetReason, WakeupCause};
use bootcause::conditions::reset::on_reset;
use bootcause::conditions::wakeup::on_wakeup;
use bootcause::engine::{Action, Condition, ConditionEngine, EvaluationOutcome, Rule};

// ── Shared context ────────────────────────────────────────────

#[derive(Debug, Default)]
struct Board {
    reset: Option<ResetReason>,
    wakeup: Option<WakeupCause>,
    fired: Vec<&'static str>,
    panics: u32,
}

impl Board {
    fn booted(reset: ResetReason, wakeup: WakeupCause) -> Self {
        Self {
            reset: Some(reset),
            wakeup: Some(wakeup),
            ..Self::default()
        }
    }
}

impl BootStatePort for Board {
    fn reset_reason(&self) -> ResetReason {
        self.reset.unwrap_or(ResetReason::Unknown)
    }

    fn wakeup_cause(&self) -> WakeupCause {
        self.wakeup.unwrap_or(WakeupCause::Undefined)
    }
}

fn fire(tag: &'static str) -> impl FnMut(&mut Board) + 'static {
    move |board: &mut Board| board.fired.push(tag)
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn every_true_rule_fires_in_registration_order() {
    let mut engine = ConditionEngine::new(
        vec![
            Rule::new(|_: &Board| false, fire("a")),
            Rule::new(|_: &Board| true, fire("b")),
            Rule::new(|_: &Board| true, fire("c")),
        ],
        None,
    );
    let mut board = Board::default();

    let outcome = engine.evaluate(&mut board);

    assert_eq!(board.fired, ["b", "c"]);
    assert_eq!(
        outcome,
        EvaluationOutcome {
            matched: 2,
            unmatched: 1
        }
    );
}

#[test]
fn default_runs_only_when_nothing_matched() {
    let mut engine =
        ConditionEngine::new(vec![Rule::new(|_: &Board| false, fire("a"))], None).with_default(fire("d"));
    let mut board = Board::default();

    let outcome = engine.evaluate(&mut board);

    assert_eq!(board.fired, ["d"]);
    assert_eq!(outcome.matched, 0);
    assert_eq!(outcome.unmatched, 1);
}

#[test]
fn empty_engine_runs_default() {
    let mut engine: ConditionEngine<Board> = ConditionEngine::default().with_default(fire("d"));
    let mut board = Board::default();

    let outcome = engine.evaluate(&mut board);

    assert_eq!(board.fired, ["d"]);
    assert_eq!(outcome.total(), 0);
}

#[test]
fn empty_engine_without_default_is_a_no_op() {
    let mut engine: ConditionEngine<Board> = ConditionEngine::default();
    let mut board = Board::default();

    assert_eq!(engine.evaluate(&mut board), EvaluationOutcome::default());
    assert!(board.fired.is_empty());
}

// ── Boot-state rules on a user context ────────────────────────

#[test]
fn reset_and_wakeup_helpers_share_one_context() {
    let mut engine = ConditionEngine::new(
        vec![
            on_reset(ResetReason::DeepSleep, fire("deep-sleep")),
            on_reset(ResetReason::Panic, fire("panic")),
            on_wakeup(WakeupCause::Ext0, fire("ext0")),
            on_wakeup(WakeupCause::Timer, fire("timer")),
        ],
        None,
    )
    .with_default(fire("unknown"));

    let mut board = Board::booted(ResetReason::DeepSleep, WakeupCause::Timer);
    let outcome = engine.evaluate(&mut board);

    assert_eq!(board.fired, ["deep-sleep", "timer"]);
    assert_eq!(outcome.matched, 2);
    assert_eq!(outcome.unmatched, 2);
}

#[test]
fn counter_lives_in_the_context_not_a_global() {
    let mut engine = ConditionEngine::new(
        vec![on_reset(ResetReason::Panic, |board: &mut Board| board.panics += 1)],
        None,
    );

    let mut first = Board::booted(ResetReason::Panic, WakeupCause::Undefined);
    let mut second = Board::booted(ResetReason::Panic, WakeupCause::Undefined);
    engine.analyze(&mut first);
    engine.analyze(&mut first);
    engine.analyze(&mut second);

    assert_eq!(first.panics, 2);
    assert_eq!(second.panics, 1);
}

#[test]
fn conditions_are_retested_every_pass() {
    let mut engine = ConditionEngine::new(
        vec![on_reset(ResetReason::Brownout, fire("brownout"))],
        None,
    )
    .with_default(fire("default"));
    let mut board = Board::booted(ResetReason::PowerOn, WakeupCause::Undefined);

    assert_eq!(engine.evaluate(&mut board).matched, 0);
    board.reset = Some(ResetReason::Brownout);
    assert_eq!(engine.evaluate(&mut board).matched, 1);

    assert_eq!(board.fired, ["default", "brownout"]);
}

#[test]
fn same_context_same_result() {
    let mut engine = ConditionEngine::new(
        vec![
            Rule::new(|_: &Board| true, |_: &mut Board| {}),
            Rule::new(|_: &Board| false, |_: &mut Board| {}),
        ],
        None,
    );
    let mut board = Board::default();

    let first = engine.evaluate(&mut board);
    let second = engine.evaluate(&mut board);
    assert_eq!(first, second);
}

// ── Dynamic registration ──────────────────────────────────────

#[test]
fn rule_added_after_a_pass_applies_from_the_next_one() {
    let mut engine = ConditionEngine::new(vec![Rule::new(|_: &Board| false, fire("a"))], None)
        .with_default(fire("d"));
    let mut board = Board::default();

    assert_eq!(engine.evaluate(&mut board).total(), 1);
    engine.add_rule(|_: &Board| true, fire("late"));
    let outcome = engine.evaluate(&mut board);

    assert_eq!(outcome.total(), 2);
    assert_eq!(outcome.matched, 1);
    assert_eq!(board.fired, ["d", "late"]);
}

#[test]
fn duplicate_rules_fire_independently() {
    let mut engine: ConditionEngine<Board> = ConditionEngine::default();
    engine.add_rule(|_: &Board| true, fire("x"));
    engine.add_rule(|_: &Board| true, fire("x"));
    let mut board = Board::default();

    assert_eq!(engine.evaluate(&mut board).matched, 2);
    assert_eq!(board.fired, ["x", "x"]);
}

// ── Trait implementors ────────────────────────────────────────

/// Fires on the n-th test and never again.
struct NthPass {
    remaining: u32,
}

impl Condition<Board> for NthPass {
    fn test(&mut self, _: &Board) -> bool {
        match self.remaining {
            0 => false,
            1 => {
                self.remaining = 0;
                true
            }
            _ => {
                self.remaining -= 1;
                false
            }
        }
    }
}

struct Tag(&'static str);

impl Action<Board> for Tag {
    fn run(&mut self, board: &mut Board) {
        board.fired.push(self.0);
    }
}

#[test]
fn stateful_condition_keeps_its_own_state() {
    let mut engine = ConditionEngine::default();
    engine.push(Rule::from_parts("third", NthPass { remaining: 3 }, Tag("third")));
    let mut board = Board::default();

    let matches: Vec<usize> = (0..5).map(|_| engine.evaluate(&mut board).matched).collect();

    assert_eq!(matches, [0, 0, 1, 0, 0]);
    assert_eq!(board.fired, ["third"]);
    assert_eq!(engine.rule_names().collect::<Vec<_>>(), ["third"]);
}

#[test]
fn unit_context_for_capture_only_closures() {
    use std::cell::Cell;
    use std::rc::Rc;

    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    let mut engine: ConditionEngine = ConditionEngine::default();
    engine.add_rule(|_: &()| true, move |_: &mut ()| seen.set(seen.get() + 1));

    engine.analyze(&mut ());
    engine.analyze(&mut ());

    assert_eq!(hits.get(), 2);
}
