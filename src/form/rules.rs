//! Ready-made [`Rule`]s for common text checks.
//!
//! These are plain predicates; anything `Fn(&str) -> Result<(), RuleViolation>`
//! works just as well.

use regex::Regex;

use super::controller::{FormError, FormResult};
use super::validation::{Rule, RuleViolation};

/// Fails when the value has fewer than `min` characters.
pub fn min_length(min: usize) -> impl Rule {
    move |value: &str| {
        if value.chars().count() < min {
            Err(RuleViolation::new(format!(
                "Characters must be at least {min} long"
            )))
        } else {
            Ok(())
        }
    }
}

/// Fails when the value has more than `max` characters.
pub fn max_length(max: usize) -> impl Rule {
    move |value: &str| {
        if value.chars().count() > max {
            Err(RuleViolation::new(format!(
                "Characters must be at most {max} long"
            )))
        } else {
            Ok(())
        }
    }
}

/// Fails with `message` unless `pattern` matches somewhere in the value.
pub fn pattern(pattern: &str, message: impl Into<String>) -> FormResult<impl Rule> {
    let regex = Regex::new(pattern).map_err(|error| FormError::InvalidPattern(error.to_string()))?;
    let message = message.into();
    Ok(move |value: &str| {
        if regex.is_match(value) {
            Ok(())
        } else {
            Err(RuleViolation::new(message.clone()))
        }
    })
}

/// Fails with `message` when `predicate` returns false.
pub fn rule<P>(message: impl Into<String>, predicate: P) -> impl Rule
where
    P: Fn(&str) -> bool + Send + Sync,
{
    let message = message.into();
    move |value: &str| {
        if predicate(value) {
            Ok(())
        } else {
            Err(RuleViolation::new(message.clone()))
        }
    }
}
