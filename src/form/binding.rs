use std::fmt::{Debug, Formatter};

use super::controller::{
    FormController, FormError, FormResult, SubmitState, read_lock, transition_submit_state,
    write_lock,
};
use super::declaration::SubmitEvent;
use super::reducer::Action;
use super::state::{FieldKey, FieldStatus};

/// Change handler bound to one field.
#[derive(Clone)]
pub struct ChangeHandler {
    controller: FormController,
    field: FieldKey,
}

impl ChangeHandler {
    pub fn field(&self) -> &FieldKey {
        &self.field
    }

    /// Called by the input with its new value.
    pub fn call(&self, value: impl Into<String>) -> FormResult<()> {
        self.controller.change_value(&self.field, value)
    }
}

impl Debug for ChangeHandler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeHandler")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct InputBinding {
    pub value: String,
    pub on_change: ChangeHandler,
}

#[derive(Clone, Debug)]
pub struct FieldProps {
    pub name: FieldKey,
    pub input: InputBinding,
    pub info: FieldStatus,
}

/// Props of every declared field, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct FieldPropsSet {
    fields: Vec<FieldProps>,
}

impl FieldPropsSet {
    pub fn get(&self, name: &str) -> Option<&FieldProps> {
        self.fields.iter().find(|props| props.name == *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldProps> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for FieldPropsSet {
    type Item = FieldProps;
    type IntoIter = std::vec::IntoIter<FieldProps>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// A field failed validation; the event's default action was prevented.
    Blocked,
    Submitted,
}

/// Submit handler bound to the form element.
#[derive(Clone)]
pub struct SubmitBinding {
    controller: FormController,
}

impl SubmitBinding {
    pub fn call(&self, event: &mut dyn SubmitEvent) -> FormResult<SubmitOutcome> {
        self.controller.on_submit(event)
    }
}

impl Debug for SubmitBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitBinding").finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct FormBinding {
    pub no_validate: bool,
    pub on_submit: SubmitBinding,
}

impl FormController {
    pub fn form_props(&self) -> FormBinding {
        FormBinding {
            no_validate: self.options.no_validate,
            on_submit: SubmitBinding {
                controller: self.clone(),
            },
        }
    }

    /// Projects the current state onto input bindings for every declared field.
    pub fn field_props(&self) -> FormResult<FieldPropsSet> {
        let session = read_lock(&self.state, "projecting field props")?;
        let fields = self
            .field_keys()
            .map(|key| {
                let value = session.form.value(key.as_str()).unwrap_or_default();
                let info = session.form.status(key.as_str()).cloned().unwrap_or_default();
                FieldProps {
                    name: key.clone(),
                    input: InputBinding {
                        value: value.to_string(),
                        on_change: ChangeHandler {
                            controller: self.clone(),
                            field: key.clone(),
                        },
                    },
                    info,
                }
            })
            .collect();
        Ok(FieldPropsSet { fields })
    }

    pub fn field(&self, name: &str) -> FormResult<FieldProps> {
        let key = self.key_of(name)?;
        let session = read_lock(&self.state, "projecting single field props")?;
        Ok(FieldProps {
            input: InputBinding {
                value: session.form.value(name).unwrap_or_default().to_string(),
                on_change: ChangeHandler {
                    controller: self.clone(),
                    field: key.clone(),
                },
            },
            info: session.form.status(name).cloned().unwrap_or_default(),
            name: key,
        })
    }

    /// Validates every field, then either prevents the event's default
    /// action or hands the event to the submit callback.
    pub fn on_submit(&self, event: &mut dyn SubmitEvent) -> FormResult<SubmitOutcome> {
        {
            let mut session = write_lock(&self.state, "preparing submit")?;
            if session.submit_state == SubmitState::Submitting {
                return Err(FormError::AlreadySubmitting);
            }
            transition_submit_state(&mut session, SubmitState::Validating)?;
            session.submit_count = session.submit_count.saturating_add(1);
        }

        let has_error = self.validate_all().inspect_err(|error| {
            tracing::warn!(%error, "form submit aborted during validation");
            self.abort_submit();
        })?;
        if has_error {
            event.prevent_default();
            let mut session = write_lock(&self.state, "handling submit validation failure")?;
            transition_submit_state(&mut session, SubmitState::Failed)?;
            tracing::debug!(
                submit_count = session.submit_count,
                "form submit blocked by invalid fields"
            );
            return Ok(SubmitOutcome::Blocked);
        }

        {
            let mut session = write_lock(&self.state, "moving submit state to submitting")?;
            transition_submit_state(&mut session, SubmitState::Submitting)?;
        }
        let result = match self.on_submit.as_ref() {
            Some(handler) => handler.submit(event, &self.snapshot()?),
            None => Ok(()),
        };

        let mut session = write_lock(&self.state, "completing submit")?;
        let next = if result.is_ok() {
            SubmitState::Succeeded
        } else {
            SubmitState::Failed
        };
        transition_submit_state(&mut session, next)?;
        tracing::debug!(submit_state = ?next, "form submitted");
        result.map(|()| SubmitOutcome::Submitted)
    }

    pub fn reset_fields(&self) -> FormResult<()> {
        let pending = self.dispatch(Action::ResetFields)?;
        debug_assert!(pending.is_none(), "reset never schedules validation");
        Ok(())
    }

    /// Sets a field outside the input path, with the same re-validation a
    /// regular edit gets.
    pub fn manually_set_field(&self, name: &str, value: impl Into<String>) -> FormResult<()> {
        let key = self.key_of(name)?;
        self.change_value(&key, value)
    }
}
