// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission rules stored at each (role, resource, action) slot.

use std::fmt;
use std::sync::Arc;

/// Predicate signature for conditional rules: the principal plus the resource
/// instance data, when the caller supplied it.
pub type Predicate<P, D> = dyn Fn(&P, Option<&D>) -> bool + Send + Sync;

/// Values a conditional predicate may return.
///
/// `Option<bool>` lets a predicate report "cannot decide" (for example when
/// resource data was not supplied); that outcome denies.
pub trait PredicateOutcome {
	fn granted(self) -> bool;
}

impl PredicateOutcome for bool {
	fn granted(self) -> bool {
		self
	}
}

impl PredicateOutcome for Option<bool> {
	fn granted(self) -> bool {
		self.unwrap_or(false)
	}
}

/// A caller-supplied predicate with an optional human-readable description.
pub struct Condition<P, D> {
	predicate: Arc<Predicate<P, D>>,
	description: Option<String>,
}

impl<P, D> Condition<P, D> {
	pub fn new<F, O>(predicate: F) -> Self
	where
		P: 'static,
		D: 'static,
		F: Fn(&P, Option<&D>) -> O + Send + Sync + 'static,
		O: PredicateOutcome,
	{
		let predicate: Arc<Predicate<P, D>> =
			Arc::new(move |user: &P, data: Option<&D>| predicate(user, data).granted());
		Self {
			predicate,
			description: None,
		}
	}

	/// Builder: set the description shown in permission reports.
	pub fn describe(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	/// Runs the predicate. A panicking predicate is not caught.
	pub fn evaluate(&self, user: &P, data: Option<&D>) -> bool {
		(self.predicate)(user, data)
	}
}

impl<P, D> Clone for Condition<P, D> {
	fn clone(&self) -> Self {
		Self {
			predicate: Arc::clone(&self.predicate),
			description: self.description.clone(),
		}
	}
}

impl<P, D> fmt::Debug for Condition<P, D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Condition")
			.field("description", &self.description)
			.finish_non_exhaustive()
	}
}

/// The rule configured for one (role, resource, action) slot.
///
/// A slot with no rule at all behaves exactly like [`PermissionRule::Denied`].
pub enum PermissionRule<P, D> {
	Allowed,
	Denied,
	Conditional(Condition<P, D>),
}

impl<P, D> PermissionRule<P, D> {
	/// Shorthand for an undescribed conditional rule.
	pub fn when<F, O>(predicate: F) -> Self
	where
		P: 'static,
		D: 'static,
		F: Fn(&P, Option<&D>) -> O + Send + Sync + 'static,
		O: PredicateOutcome,
	{
		PermissionRule::Conditional(Condition::new(predicate))
	}

	pub fn is_conditional(&self) -> bool {
		matches!(self, PermissionRule::Conditional(_))
	}

	/// Resolves the rule for one principal.
	pub fn evaluate(&self, user: &P, data: Option<&D>) -> bool {
		match self {
			PermissionRule::Allowed => true,
			PermissionRule::Denied => false,
			PermissionRule::Conditional(condition) => condition.evaluate(user, data),
		}
	}
}

impl<P, D> From<bool> for PermissionRule<P, D> {
	fn from(allowed: bool) -> Self {
		if allowed {
			PermissionRule::Allowed
		} else {
			PermissionRule::Denied
		}
	}
}

impl<P, D> From<Condition<P, D>> for PermissionRule<P, D> {
	fn from(condition: Condition<P, D>) -> Self {
		PermissionRule::Conditional(condition)
	}
}

impl<P, D> Clone for PermissionRule<P, D> {
	fn clone(&self) -> Self {
		match self {
			PermissionRule::Allowed => PermissionRule::Allowed,
			PermissionRule::Denied => PermissionRule::Denied,
			PermissionRule::Conditional(condition) => PermissionRule::Conditional(condition.clone()),
		}
	}
}

impl<P, D> fmt::Debug for PermissionRule<P, D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PermissionRule::Allowed => f.write_str("Allowed"),
			PermissionRule::Denied => f.write_str("Denied"),
			PermissionRule::Conditional(condition) => f.debug_tuple("Conditional").field(condition).finish(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Caller {
		id: &'static str,
	}

	struct Doc {
		owner: &'static str,
	}

	fn owner_only() -> PermissionRule<Caller, Doc> {
		PermissionRule::when(|caller: &Caller, doc: Option<&Doc>| {
			doc.map(|doc| doc.owner == caller.id)
		})
	}

	#[test]
	fn booleans_convert_to_fixed_rules() {
		let allowed: PermissionRule<Caller, Doc> = true.into();
		let denied: PermissionRule<Caller, Doc> = false.into();
		let caller = Caller { id: "u1" };
		assert!(allowed.evaluate(&caller, None));
		assert!(!denied.evaluate(&caller, None));
		assert!(!allowed.is_conditional());
	}

	#[test]
	fn conditional_rule_consults_predicate() {
		let rule = owner_only();
		let doc = Doc { owner: "u1" };
		assert!(rule.is_conditional());
		assert!(rule.evaluate(&Caller { id: "u1" }, Some(&doc)));
		assert!(!rule.evaluate(&Caller { id: "u2" }, Some(&doc)));
	}

	#[test]
	fn undecided_predicate_denies() {
		let rule = owner_only();
		assert!(!rule.evaluate(&Caller { id: "u1" }, None));
	}

	#[test]
	fn description_survives_clone() {
		let condition: Condition<Caller, Doc> = Condition::new(|_: &Caller, _: Option<&Doc>| true)
			.describe("Always, for testing");
		let rule = PermissionRule::from(condition);
		let cloned = rule.clone();
		match cloned {
			PermissionRule::Conditional(c) => assert_eq!(c.description(), Some("Always, for testing")),
			other => panic!("expected conditional rule, got {other:?}"),
		}
	}
}
