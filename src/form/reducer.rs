use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::controller::{FormError, FormResult};
use super::state::{FieldKey, FieldStatus, FormState};

/// A state transition request. The reducer is the only code that applies these.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum Action {
    ChangeValue { field: FieldKey, value: String },
    ValidateField { field: FieldKey, status: FieldStatus },
    ResetFields,
}

impl Action {
    pub fn change_value(field: impl Into<FieldKey>, value: impl Into<String>) -> Self {
        Self::ChangeValue {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validate_field(field: impl Into<FieldKey>, status: FieldStatus) -> Self {
        Self::ValidateField {
            field: field.into(),
            status,
        }
    }

    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::ChangeValue { .. } => ActionKind::ChangeValue,
            Self::ValidateField { .. } => ActionKind::ValidateField,
            Self::ResetFields => ActionKind::ResetFields,
        }
    }

    pub fn field(&self) -> Option<&FieldKey> {
        match self {
            Self::ChangeValue { field, .. } | Self::ValidateField { field, .. } => Some(field),
            Self::ResetFields => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ActionKind {
    ChangeValue,
    ValidateField,
    ResetFields,
}

impl ActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChangeValue => "changeValue",
            Self::ValidateField => "validateField",
            Self::ResetFields => "resetFields",
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = FormError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "changeValue" => Ok(Self::ChangeValue),
            "validateField" => Ok(Self::ValidateField),
            "resetFields" => Ok(Self::ResetFields),
            other => Err(FormError::InvalidAction {
                kind: other.to_string(),
                reason: "unknown action type".to_string(),
            }),
        }
    }
}

/// Re-validation owed to a field whose value just changed.
///
/// Produced by [`apply`] for every `ChangeValue`. Whoever committed the new
/// state is expected to run it right away so the status catches up with the
/// value.
#[must_use = "a changed field stays at its previous status until the pending validation runs"]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingValidation {
    field: FieldKey,
}

impl PendingValidation {
    pub fn field(&self) -> &FieldKey {
        &self.field
    }

    pub fn into_field(self) -> FieldKey {
        self.field
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    pub state: FormState,
    pub pending: Option<PendingValidation>,
}

/// Pure transition function. The input state is left untouched.
pub fn reduce(state: &FormState, action: &Action) -> FormResult<FormState> {
    let mut next = state.clone();
    match action {
        Action::ChangeValue { field, value } => {
            let slot = next
                .values
                .get_mut(field)
                .ok_or_else(|| undeclared_target(action, field))?;
            slot.clone_from(value);
        }
        Action::ValidateField { field, status } => {
            let slot = next
                .statuses
                .get_mut(field)
                .ok_or_else(|| undeclared_target(action, field))?;
            slot.clone_from(status);
        }
        Action::ResetFields => {
            for value in next.values.values_mut() {
                value.clear();
            }
            for status in next.statuses.values_mut() {
                *status = FieldStatus::Standard;
            }
        }
    }
    tracing::trace!(
        action = %action.kind(),
        field = action.field().map(FieldKey::as_str),
        "applied form action"
    );
    Ok(next)
}

/// Reduces `action` and reports the follow-up validation it requires.
pub fn apply(state: &FormState, action: &Action) -> FormResult<Transition> {
    let next = reduce(state, action)?;
    let pending = match action {
        Action::ChangeValue { field, .. } => Some(PendingValidation {
            field: field.clone(),
        }),
        Action::ValidateField { .. } | Action::ResetFields => None,
    };
    Ok(Transition {
        state: next,
        pending,
    })
}

pub fn apply_change(
    state: &FormState,
    field: impl Into<FieldKey>,
    value: impl Into<String>,
) -> FormResult<(FormState, PendingValidation)> {
    let field = field.into();
    let action = Action::ChangeValue {
        field: field.clone(),
        value: value.into(),
    };
    Ok((reduce(state, &action)?, PendingValidation { field }))
}

impl FormState {
    /// Folds `actions` through the reducer starting from `self`.
    pub fn replay<'a, I>(self, actions: I) -> FormResult<FormState>
    where
        I: IntoIterator<Item = &'a Action>,
    {
        actions
            .into_iter()
            .try_fold(self, |state, action| reduce(&state, action))
    }
}

fn undeclared_target(action: &Action, field: &FieldKey) -> FormError {
    FormError::InvalidAction {
        kind: action.kind().to_string(),
        reason: format!("field `{field}` is not part of the form"),
    }
}
