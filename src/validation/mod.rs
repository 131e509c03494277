//! # Validation Chains
//!
//! Business rules that must hold before a topic or answer is mutated.
//!
//! Each rule is a [`Validator`] over one request type. A [`ValidatorChain`]
//! runs its rules in insertion order and stops at the first rejection,
//! handing that rule's error back unchanged. Passing every rule is the only
//! way through.
//!
//! Rules hold nothing but borrowed repositories (and policy values), so
//! a chain is cheap to assemble per operation. The service builds its
//! chains explicitly; see [`crate::service::ForumService`].
//!
//! ## Rules
//!
//! | Rule | Request | Rejects with |
//! |------|---------|--------------|
//! | [`TopicAcceptsAnswers`] | `NewAnswer` | `TopicNotFound`, `TopicNotOpen` |
//! | [`UserIsEnabled`] | any [`Authored`] | `UserNotFound`, `UserDisabled` |
//! | [`CourseExists`] | any [`CourseRef`] | `CourseNotFound` |
//! | [`AnswerIsLive`] | any [`AnswerRef`] | `AnswerNotFound`, `AnswerDeleted`, `TopicDeleted` |
//! | [`SolutionRequiresOpenTopic`] | `AnswerEdit` | `TopicClosedForSolutions`, `TopicNotOpen` |

mod rules;

pub use rules::{
    AnswerIsLive, AnswerRef, Authored, CourseExists, CourseRef, SolutionRequiresOpenTopic,
    TopicAcceptsAnswers, UserIsEnabled,
};

use crate::error::ForumResult;

/// A single business rule over requests of type `R`
pub trait Validator<R> {
    /// Short stable name, used in logs and for inspecting chain order
    fn name(&self) -> &'static str;

    /// Accepts the request or returns the violated rule
    fn validate(&self, request: &R) -> ForumResult<()>;
}

/// An ordered list of rules run before one kind of mutation
pub struct ValidatorChain<'a, R> {
    rules: Vec<Box<dyn Validator<R> + 'a>>,
}

impl<'a, R> ValidatorChain<'a, R> {
    /// Creates an empty chain (accepts everything)
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule; builder style
    pub fn with(mut self, rule: impl Validator<R> + 'a) -> Self {
        self.push(rule);
        self
    }

    /// Appends a rule
    pub fn push(&mut self, rule: impl Validator<R> + 'a) {
        self.rules.push(Box::new(rule));
    }

    /// Rule names in execution order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule in order, stopping at the first rejection
    pub fn validate(&self, request: &R) -> ForumResult<()> {
        for rule in &self.rules {
            if let Err(err) = rule.validate(request) {
                tracing::debug!(rule = rule.name(), error = %err, "request rejected");
                return Err(err);
            }
        }
        Ok(())
    }
}

impl<R> Default for ValidatorChain<'_, R> {
    fn default() -> Self {
        Self::new()
    }
}
