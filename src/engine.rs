//! Condition/action rule engine.
//!
//! The engine holds an ordered list of [`Rule`]s and one optional default
//! action:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ConditionEngine<C>                                      │
//! │  ┌─────┬──────────────────┬─────────────────────────┐    │
//! │  │  #  │ condition        │ action                  │    │
//! │  ├─────┼──────────────────┼─────────────────────────┤    │
//! │  │  0  │ fn(&C) -> bool   │ fn(&mut C)              │    │
//! │  │  1  │ fn(&C) -> bool   │ fn(&mut C)              │    │
//! │  │ ... │                  │                         │    │
//! │  └─────┴──────────────────┴─────────────────────────┘    │
//! │  default: Option<fn(&mut C)>   (only when 0 matched)     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call to [`ConditionEngine::evaluate`] walks the table once in
//! registration order.  Each rule whose condition holds has its action run
//! immediately, before the next condition is tested.  This is not a
//! first-match dispatcher: every matching action fires.  After the pass the
//! default action runs exactly once if, and only if, nothing matched.
//!
//! All callables receive the same explicit context `C` (sensor handles,
//! counters, storage).  Use `C = ()` for rules that only capture what they
//! need.  The engine never inspects or validates the callables; whatever an
//! action does, including never returning, is the action's business.

use log::debug;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Condition / action traits
// ---------------------------------------------------------------------------

/// Predicate half of a rule.
///
/// Tested fresh on every evaluation pass; the engine caches nothing.
pub trait Condition<C> {
    fn test(&mut self, ctx: &C) -> bool;
}

/// Side-effect half of a rule.  The engine ignores whatever the action
/// considers success or failure.
pub trait Action<C> {
    fn run(&mut self, ctx: &mut C);
}

impl<C, F> Condition<C> for F
where
    F: FnMut(&C) -> bool,
{
    fn test(&mut self, ctx: &C) -> bool {
        self(ctx)
    }
}

impl<C, F> Action<C> for F
where
    F: FnMut(&mut C),
{
    fn run(&mut self, ctx: &mut C) {
        self(ctx);
    }
}

pub type BoxedCondition<C> = Box<dyn Condition<C>>;
pub type BoxedAction<C> = Box<dyn Action<C>>;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A condition paired with the action to run when it holds.
pub struct Rule<C> {
    name: &'static str,
    condition: BoxedCondition<C>,
    action: BoxedAction<C>,
}

impl<C> Rule<C> {
    /// Build an unnamed rule from two closures.
    pub fn new<P, A>(condition: P, action: A) -> Self
    where
        P: FnMut(&C) -> bool + 'static,
        A: FnMut(&mut C) + 'static,
    {
        Self::named("", condition, action)
    }

    /// Build a rule with a label used in debug logs.
    pub fn named<P, A>(name: &'static str, condition: P, action: A) -> Self
    where
        P: FnMut(&C) -> bool + 'static,
        A: FnMut(&mut C) + 'static,
    {
        Self {
            name,
            condition: Box::new(condition),
            action: Box::new(action),
        }
    }

    /// Build a rule from any [`Condition`] / [`Action`] implementors.
    pub fn from_parts(
        name: &'static str,
        condition: impl Condition<C> + 'static,
        action: impl Action<C> + 'static,
    ) -> Self {
        Self {
            name,
            condition: Box::new(condition),
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<C> core::fmt::Debug for Rule<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Match counts of a single evaluation pass.
///
/// `matched + unmatched` always equals the number of rules registered when
/// the pass started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct EvaluationOutcome {
    pub matched: usize,
    pub unmatched: usize,
}

impl EvaluationOutcome {
    /// Number of rules tested.
    pub fn total(&self) -> usize {
        self.matched + self.unmatched
    }

    /// True when the pass was a clean sweep (the default action's trigger).
    pub fn none_matched(&self) -> bool {
        self.matched == 0
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Ordered rule table plus an optional fallback action.
///
/// Both [`evaluate`](Self::evaluate) and [`add_rule`](Self::add_rule) take
/// `&mut self`, so the table cannot change while a pass is in progress.
/// Sharing an engine across threads or interrupt contexts needs an external
/// lock around the whole engine.
pub struct ConditionEngine<C = ()> {
    rules: Vec<Rule<C>>,
    default_action: Option<BoxedAction<C>>,
}

impl<C> ConditionEngine<C> {
    /// Construct the engine from an initial rule list and optional default.
    ///
    /// Nothing is validated: an empty list with no default is legal and
    /// simply does nothing.
    pub fn new(rules: Vec<Rule<C>>, default_action: Option<BoxedAction<C>>) -> Self {
        Self {
            rules,
            default_action,
        }
    }

    /// Install the default action, replacing any previous one.
    ///
    /// Meant for construction time, e.g.
    /// `ConditionEngine::new(rules, None).with_default(|ctx| ...)`.
    #[must_use]
    pub fn with_default<A>(mut self, action: A) -> Self
    where
        A: FnMut(&mut C) + 'static,
    {
        self.default_action = Some(Box::new(action));
        self
    }

    /// Run one evaluation pass and report the match counts.
    ///
    /// Rules are visited in registration order, each exactly once.  A
    /// matching rule's action runs before the next condition is tested, so
    /// an action that never returns stops the pass right there.  The
    /// default action runs once after the pass when no rule matched.
    pub fn evaluate(&mut self, ctx: &mut C) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome::default();

        for (index, rule) in self.rules.iter_mut().enumerate() {
            if rule.condition.test(ctx) {
                debug!("engine: rule #{} '{}' matched", index, rule.name);
                rule.action.run(ctx);
                outcome.matched += 1;
            } else {
                outcome.unmatched += 1;
            }
        }

        if outcome.none_matched() {
            if let Some(default) = self.default_action.as_mut() {
                debug!("engine: no rule matched, running default action");
                default.run(ctx);
            }
        }

        outcome
    }

    /// Void form of [`evaluate`](Self::evaluate): same pass, counts dropped.
    pub fn analyze(&mut self, ctx: &mut C) {
        let _ = self.evaluate(ctx);
    }

    /// Append a rule built from two closures.
    ///
    /// It takes part from the next evaluation pass onward.
    pub fn add_rule<P, A>(&mut self, condition: P, action: A)
    where
        P: FnMut(&C) -> bool + 'static,
        A: FnMut(&mut C) + 'static,
    {
        self.push(Rule::new(condition, action));
    }

    /// Append a prebuilt rule.
    pub fn push(&mut self, rule: Rule<C>) {
        self.rules.push(rule);
    }

    /// Append several prebuilt rules, keeping their order.
    pub fn extend(&mut self, rules: impl IntoIterator<Item = Rule<C>>) {
        self.rules.extend(rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn has_default(&self) -> bool {
        self.default_action.is_some()
    }

    /// Rule labels in evaluation order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(Rule::name)
    }
}

impl<C> Default for ConditionEngine<C> {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl<C> core::fmt::Debug for ConditionEngine<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConditionEngine")
            .field("rules", &self.rules)
            .field("has_default", &self.has_default())
            .finish()
    }
}
