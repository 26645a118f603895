//! Bridge to an external validation framework.
//!
//! The widget never validates anything itself. After each selection change it
//! asks a [`ValidationProvider`] to re-check its control, and on the next
//! scheduler turn reads back the verdict to style the toggle button.
//!
//! # Providers
//!
//! - [`NoValidation`]: the inert default; nothing has rules
//! - [`FieldRules`]: a small built-in rule engine (required, length, range,
//!   pattern, equal-to, custom predicates)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use horizon_multiselect::widget::{FieldRules, Rule, ValidationProvider};
//!
//! let rules = Arc::new(FieldRules::new());
//! rules.add_rule("Languages", Rule::Required);
//! rules.add_rule("Languages", Rule::MaxLength(3));
//!
//! assert!(rules.has_rules("Languages"));
//! ```
//!
//! # Markup Rules
//!
//! [`FieldRules::register_markup_rules`] reads the `data-val-*` attributes
//! written by the server-side emitters, so a rendered page and the provider
//! agree on the rules.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use regex::Regex;

use horizon_multiselect_core::logging::targets;

use super::control::{Control, ControlValue, Form};
use crate::error::{Error, Result};

/// Capability the widget needs from a validation framework.
pub trait ValidationProvider: Send + Sync {
    /// Whether `field` has any validation rules.
    fn has_rules(&self, field: &str) -> bool;

    /// Re-validate `field` with its current value. Returns the verdict.
    fn validate(&self, field: &str, value: &ControlValue) -> bool;

    /// The last verdict for `field`, if it was ever validated.
    fn is_valid(&self, field: &str) -> Option<bool>;
}

impl<V: ValidationProvider + ?Sized> ValidationProvider for Arc<V> {
    fn has_rules(&self, field: &str) -> bool {
        (**self).has_rules(field)
    }

    fn validate(&self, field: &str, value: &ControlValue) -> bool {
        (**self).validate(field, value)
    }

    fn is_valid(&self, field: &str) -> Option<bool> {
        (**self).is_valid(field)
    }
}

impl<V: ValidationProvider + ?Sized> ValidationProvider for Box<V> {
    fn has_rules(&self, field: &str) -> bool {
        (**self).has_rules(field)
    }

    fn validate(&self, field: &str, value: &ControlValue) -> bool {
        (**self).validate(field, value)
    }

    fn is_valid(&self, field: &str) -> Option<bool> {
        (**self).is_valid(field)
    }
}

/// A provider with no rules for any field.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl ValidationProvider for NoValidation {
    fn has_rules(&self, _field: &str) -> bool {
        false
    }

    fn validate(&self, _field: &str, _value: &ControlValue) -> bool {
        true
    }

    fn is_valid(&self, _field: &str) -> Option<bool> {
        None
    }
}

// ============================================================================
// Rules
// ============================================================================

type Predicate = Arc<dyn Fn(&ControlValue) -> bool + Send + Sync>;

/// One validation rule.
///
/// Every rule except [`Rule::Required`] passes for an empty value.
#[derive(Clone)]
pub enum Rule {
    /// The value must not be empty.
    Required,
    /// At least this many items (selection lists) or characters (text).
    MinLength(usize),
    /// At most this many items (selection lists) or characters (text).
    MaxLength(usize),
    /// The value parses as a number within `min..=max`.
    Range { min: f64, max: f64 },
    /// The whole value matches the pattern.
    Pattern(Regex),
    /// The value equals another field of the same form.
    EqualTo(String),
    /// A named predicate.
    Custom { name: String, check: Predicate },
}

impl Rule {
    /// Compile an anchored pattern rule.
    pub fn pattern(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{pattern})$");
        Regex::new(&anchored)
            .map(Rule::Pattern)
            .map_err(|e| Error::invalid_pattern(pattern, e))
    }

    /// Create a named predicate rule.
    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&ControlValue) -> bool + Send + Sync + 'static,
    {
        Rule::Custom {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// The rule's adapter name, as used in `data-val-{name}` attributes.
    pub fn name(&self) -> &str {
        match self {
            Rule::Required => "required",
            Rule::MinLength(_) => "minlength",
            Rule::MaxLength(_) => "maxlength",
            Rule::Range { .. } => "range",
            Rule::Pattern(_) => "regex",
            Rule::EqualTo(_) => "equalto",
            Rule::Custom { name, .. } => name,
        }
    }

    fn check(&self, value: &ControlValue, form: Option<&Form>) -> bool {
        if let Rule::Required = self {
            return !value.is_empty();
        }
        if value.is_empty() {
            return true;
        }
        match self {
            Rule::Required => true,
            Rule::MinLength(min) => value.len() >= *min,
            Rule::MaxLength(max) => value.len() <= *max,
            Rule::Range { min, max } => value
                .as_text()
                .trim()
                .parse::<f64>()
                .is_ok_and(|n| n >= *min && n <= *max),
            Rule::Pattern(regex) => regex.is_match(&value.as_text()),
            Rule::EqualTo(other) => match form.and_then(|f| f.value_of(other)) {
                Some(other_value) => other_value.as_text() == value.as_text(),
                None => {
                    tracing::debug!(target: targets::VALIDATION, other = %other, "equal-to target not found");
                    false
                }
            },
            Rule::Custom { check, .. } => check(value),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "Required"),
            Rule::MinLength(n) => write!(f, "MinLength({n})"),
            Rule::MaxLength(n) => write!(f, "MaxLength({n})"),
            Rule::Range { min, max } => write!(f, "Range({min}..={max})"),
            Rule::Pattern(regex) => write!(f, "Pattern({})", regex.as_str()),
            Rule::EqualTo(other) => write!(f, "EqualTo({other})"),
            Rule::Custom { name, .. } => write!(f, "Custom({name})"),
        }
    }
}

// ============================================================================
// Field Rules Provider
// ============================================================================

/// A built-in provider holding rules per field name.
#[derive(Default)]
pub struct FieldRules {
    rules: Mutex<HashMap<String, Vec<Rule>>>,
    verdicts: Mutex<HashMap<String, bool>>,
    failures: Mutex<HashMap<String, Vec<String>>>,
    form: Mutex<Weak<Form>>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve equal-to rules against `form` using builder pattern.
    pub fn with_form(self, form: &Arc<Form>) -> Self {
        *self.form.lock() = Arc::downgrade(form);
        self
    }

    pub fn add_rule(&self, field: &str, rule: Rule) {
        tracing::trace!(target: targets::VALIDATION, field, rule = rule.name(), "added rule");
        self.rules
            .lock()
            .entry(field.to_string())
            .or_default()
            .push(rule);
    }

    /// Names of the rules registered for `field`.
    pub fn rule_names(&self, field: &str) -> Vec<String> {
        self.rules
            .lock()
            .get(field)
            .map(|rules| rules.iter().map(|r| r.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// Names of the rules that failed in the last validation of `field`.
    pub fn failed_rules(&self, field: &str) -> Vec<String> {
        self.failures.lock().get(field).cloned().unwrap_or_default()
    }

    /// Register the rules described by a control's `data-val-*` attributes.
    ///
    /// Does nothing unless `data-val="true"`. Returns the number of rules
    /// added. Rules with unknown adapter names are skipped.
    pub fn register_markup_rules(&self, control: &Control) -> Result<usize> {
        if control.attribute("data-val").as_deref() != Some("true") {
            return Ok(0);
        }
        let param = |suffix: &str| control.attribute(&format!("data-val-{suffix}"));
        let count = |suffix: &str| param(suffix).and_then(|v| v.trim().parse::<usize>().ok());
        let number = |suffix: &str| param(suffix).and_then(|v| v.trim().parse::<f64>().ok());

        let mut added = 0;
        for (name, _) in control.attributes() {
            let lower = name.to_ascii_lowercase();
            let Some(adapter) = lower.strip_prefix("data-val-") else {
                continue;
            };
            if adapter.contains('-') {
                continue;
            }
            let rule = match adapter {
                "required" => Some(Rule::Required),
                "minlength" => count("minlength-min").map(Rule::MinLength),
                "maxlength" => count("maxlength-max").map(Rule::MaxLength),
                "range" => number("range-min")
                    .zip(number("range-max"))
                    .map(|(min, max)| Rule::Range { min, max }),
                "regex" => match param("regex-pattern") {
                    Some(pattern) => Some(Rule::pattern(&pattern)?),
                    None => None,
                },
                "equalto" => param("equalto-other")
                    .map(|other| Rule::EqualTo(other.trim_start_matches("*.").to_string())),
                other => {
                    tracing::debug!(target: targets::VALIDATION, adapter = other, "no adapter for markup rule");
                    None
                }
            };
            if let Some(rule) = rule {
                self.add_rule(control.name(), rule);
                added += 1;
            }
        }
        Ok(added)
    }
}

impl ValidationProvider for FieldRules {
    fn has_rules(&self, field: &str) -> bool {
        self.rules.lock().get(field).is_some_and(|r| !r.is_empty())
    }

    fn validate(&self, field: &str, value: &ControlValue) -> bool {
        let rules = self.rules.lock().get(field).cloned().unwrap_or_default();
        let form = self.form.lock().upgrade();
        let failed: Vec<String> = rules
            .iter()
            .filter(|rule| !rule.check(value, form.as_deref()))
            .map(|rule| rule.name().to_string())
            .collect();
        let valid = failed.is_empty();
        tracing::debug!(target: targets::VALIDATION, field, valid, ?failed, "validated field");
        self.verdicts.lock().insert(field.to_string(), valid);
        self.failures.lock().insert(field.to_string(), failed);
        valid
    }

    fn is_valid(&self, field: &str) -> Option<bool> {
        self.verdicts.lock().get(field).copied()
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("rules", &*self.rules.lock())
            .field("verdicts", &*self.verdicts.lock())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(FieldRules: Send, Sync);
