use super::controller::{FormController, FormResult, read_lock};
use super::declaration::FieldSpec;
use super::reducer::PendingValidation;
use super::state::{FieldKey, FieldStatus};

/// A failed rule. The message is shown to the user as-is.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("{message}")]
pub struct RuleViolation {
    message: String,
}

impl RuleViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An opaque predicate over a field value.
pub trait Rule: Send + Sync {
    fn check(&self, value: &str) -> Result<(), RuleViolation>;
}

impl<F> Rule for F
where
    F: Fn(&str) -> Result<(), RuleViolation> + Send + Sync,
{
    fn check(&self, value: &str) -> Result<(), RuleViolation> {
        (self)(value)
    }
}

/// What running a field's rules concluded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// Empty optional field, rules were not run.
    Skipped,
    Passed,
    Failed(RuleViolation),
}

impl Verdict {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Status committed for this verdict. An empty value never shows as
    /// `Error`, even on a required field whose rules fail.
    pub fn status(&self, value: &str) -> FieldStatus {
        match self {
            Self::Skipped => FieldStatus::Standard,
            Self::Passed => FieldStatus::Success,
            Self::Failed(_) if value.is_empty() => FieldStatus::Standard,
            Self::Failed(violation) => FieldStatus::error(violation.message()),
        }
    }
}

/// Runs `spec`'s rules against `value`, stopping at the first failure.
pub fn evaluate(spec: &FieldSpec, value: &str) -> Verdict {
    if value.is_empty() && !spec.is_required() {
        return Verdict::Skipped;
    }
    match spec.rules().iter().try_for_each(|rule| rule.check(value)) {
        Ok(()) => Verdict::Passed,
        Err(violation) => Verdict::Failed(violation),
    }
}

impl FormController {
    /// Re-evaluates one field and commits its status. A verdict for a value
    /// that was replaced mid-check is returned but neither committed nor
    /// reported to the field's handlers.
    pub fn validate_field(&self, name: &str) -> FormResult<Verdict> {
        let key = self.key_of(name)?;
        self.validate_field_with(&key, &mut |_| {})
    }

    /// Validates every declared field in declaration order and reports
    /// whether any of them failed. All fields are refreshed.
    pub fn validate_all(&self) -> FormResult<bool> {
        let mut has_error = false;
        for spec in self.fields.iter() {
            self.validate_field_with(spec.key(), &mut |_| has_error = true)?;
        }
        tracing::debug!(has_error, "validated all form fields");
        Ok(has_error)
    }

    /// Second half of a value change: validates the field that changed.
    pub fn run_pending(&self, pending: PendingValidation) -> FormResult<Verdict> {
        self.validate_field_with(pending.field(), &mut |_| {})
    }

    pub(super) fn validate_field_with(
        &self,
        key: &FieldKey,
        on_failure: &mut dyn FnMut(&str),
    ) -> FormResult<Verdict> {
        let spec = self.spec(key)?;
        let value = read_lock(&self.state, "reading value for field validation")?
            .form
            .value(key.as_str())
            .map(str::to_owned)
            .ok_or_else(|| self.unknown_field(key.as_str()))?;

        let verdict = evaluate(spec, &value);
        let status = verdict.status(&value);
        tracing::debug!(field = %key, status = status.as_str(), "validated form field");
        if !self.commit_status(key, &value, status)? {
            return Ok(verdict);
        }

        let spawner = self.options.spawner.as_deref();
        match &verdict {
            Verdict::Skipped => {}
            Verdict::Passed => spec.notify_success(&value, spawner),
            Verdict::Failed(violation) => {
                on_failure(violation.message());
                spec.notify_error(violation.message(), spawner);
            }
        }
        Ok(verdict)
    }
}
