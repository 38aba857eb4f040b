use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

#[cfg(feature = "serde")]
use serde::Serialize;

use super::declaration::{FieldSpec, FormDeclaration, SubmitHandler};
use super::hooks::HookSpawner;
use super::reducer::{self, Action, PendingValidation};
use super::state::{FieldKey, FieldStatus, FormState};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    /// Each value change re-validates the changed field.
    OnChange,
    /// Values change silently, statuses refresh on submit or explicit validation.
    OnSubmit,
}

#[derive(Clone)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    /// Forwarded to the form binding so renderers turn off native validation.
    pub no_validate: bool,
    pub spawner: Option<Arc<dyn HookSpawner>>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnChange,
            no_validate: true,
            spawner: None,
        }
    }
}

impl FormOptions {
    pub fn with_spawner(mut self, spawner: impl HookSpawner + 'static) -> Self {
        self.spawner = Some(Arc::new(spawner));
        self
    }
}

impl Debug for FormOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormOptions")
            .field("validate_mode", &self.validate_mode)
            .field("no_validate", &self.no_validate)
            .field("spawner", &self.spawner.is_some())
            .finish()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FormSnapshot {
    pub state: FormState,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub has_error: bool,
    pub is_dirty: bool,
}

impl FormSnapshot {
    pub fn value(&self, field: &str) -> Option<&str> {
        self.state.value(field)
    }

    pub fn status(&self, field: &str) -> Option<&FieldStatus> {
        self.state.status(field)
    }

    pub fn values(&self) -> &BTreeMap<FieldKey, String> {
        self.state.values()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("invalid {kind} action: {reason}")]
    InvalidAction { kind: String, reason: String },
    #[error("unknown form field `{0}`")]
    UnknownField(String),
    #[error("form field `{0}` is declared more than once")]
    DuplicateField(FieldKey),
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("invalid submit state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    #[error("form submit is already in progress")]
    AlreadySubmitting,
    #[error("invalid rule pattern: {0}")]
    InvalidPattern(String),
    #[error("submit failed: {0}")]
    Submit(String),
}

pub type FormResult<T> = Result<T, FormError>;

pub(super) type Listener = Arc<dyn Fn(&FormSnapshot) + Send + Sync>;

#[derive(Default)]
pub(super) struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

pub(super) struct SessionState {
    pub(super) form: FormState,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
}

/// A form validation session.
///
/// Cloning is cheap and every clone drives the same session, which is how
/// bound change and submit handlers reach it.
#[derive(Clone)]
pub struct FormController {
    pub(super) options: FormOptions,
    pub(super) fields: Arc<[FieldSpec]>,
    pub(super) on_submit: Option<Arc<dyn SubmitHandler>>,
    pub(super) initial: Arc<FormState>,
    pub(super) state: Arc<RwLock<SessionState>>,
    pub(super) listeners: Arc<RwLock<Listeners>>,
}

impl FormController {
    pub fn new(declaration: FormDeclaration) -> FormResult<Self> {
        declaration.check_unique()?;
        let FormDeclaration {
            fields,
            on_submit,
            options,
        } = declaration;
        let initial = FormState::new(
            fields
                .iter()
                .map(|spec| (spec.key().clone(), spec.initial_value())),
        );
        tracing::debug!(fields = fields.len(), "created form controller");
        Ok(Self {
            options,
            fields: fields.into(),
            on_submit,
            initial: Arc::new(initial.clone()),
            state: Arc::new(RwLock::new(SessionState {
                form: initial,
                submit_state: SubmitState::Idle,
                submit_count: 0,
            })),
            listeners: Arc::new(RwLock::new(Listeners::default())),
        })
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Declared field keys in declaration order.
    pub fn field_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.iter().map(FieldSpec::key)
    }

    /// Applies `action` through the reducer and commits the result.
    ///
    /// A value change hands back the validation it owes; the caller decides
    /// when to [`run_pending`](Self::run_pending) it.
    pub fn dispatch(&self, action: Action) -> FormResult<Option<PendingValidation>> {
        let pending = {
            let mut session = write_lock(&self.state, "dispatching form action")?;
            let transition = reducer::apply(&session.form, &action).inspect_err(|error| {
                tracing::warn!(%error, "rejected form action");
            })?;
            session.form = transition.state;
            transition.pending
        };
        self.notify_listeners()?;
        Ok(pending)
    }

    /// Commits a new value and, in `OnChange` mode, validates that field.
    pub fn change_value(&self, field: &FieldKey, value: impl Into<String>) -> FormResult<()> {
        let pending = self.dispatch(Action::change_value(field.clone(), value))?;
        match (pending, self.options.validate_mode) {
            (Some(pending), ValidationMode::OnChange) => {
                self.run_pending(pending)?;
            }
            (Some(_), ValidationMode::OnSubmit) | (None, _) => {}
        }
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let session = read_lock(&self.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            state: session.form.clone(),
            submit_state: session.submit_state,
            submit_count: session.submit_count,
            has_error: session.form.has_error(),
            is_dirty: session.form.values() != self.initial.values(),
        })
    }

    pub fn value(&self, name: &str) -> FormResult<String> {
        read_lock(&self.state, "reading field value")?
            .form
            .value(name)
            .map(str::to_owned)
            .ok_or_else(|| self.unknown_field(name))
    }

    pub fn status(&self, name: &str) -> FormResult<FieldStatus> {
        read_lock(&self.state, "reading field status")?
            .form
            .status(name)
            .cloned()
            .ok_or_else(|| self.unknown_field(name))
    }

    /// Calls `listener` with a fresh snapshot after every committed action.
    pub fn subscribe(
        &self,
        listener: impl Fn(&FormSnapshot) + Send + Sync + 'static,
    ) -> FormResult<Subscription> {
        let mut listeners = write_lock(&self.listeners, "subscribing to form changes")?;
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Arc::new(listener));
        Ok(Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        })
    }

    /// Commits `status` for `key` only while the field still holds `validated`.
    ///
    /// Returns `false` when another clone changed the value after it was read;
    /// the validation owed to the newer value commits instead.
    pub(super) fn commit_status(
        &self,
        key: &FieldKey,
        validated: &str,
        status: FieldStatus,
    ) -> FormResult<bool> {
        {
            let mut session = write_lock(&self.state, "committing field status")?;
            if session.form.value(key.as_str()) != Some(validated) {
                tracing::debug!(field = %key, "dropped stale field validation");
                return Ok(false);
            }
            let action = Action::validate_field(key.clone(), status);
            session.form = reducer::reduce(&session.form, &action).inspect_err(|error| {
                tracing::warn!(%error, "rejected form action");
            })?;
        }
        self.notify_listeners()?;
        Ok(true)
    }

    /// Records a submit that ended in an error before reaching the handler.
    /// Recovers a poisoned lock so the lifecycle never stays at `Validating`.
    pub(super) fn abort_submit(&self) {
        let mut session = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Err(error) = transition_submit_state(&mut session, SubmitState::Failed) {
            tracing::warn!(%error, "could not mark aborted submit as failed");
        }
    }

    pub(super) fn key_of(&self, name: &str) -> FormResult<FieldKey> {
        self.fields
            .iter()
            .find(|spec| *spec.key() == *name)
            .map(|spec| spec.key().clone())
            .ok_or_else(|| self.unknown_field(name))
    }

    pub(super) fn spec(&self, key: &FieldKey) -> FormResult<&FieldSpec> {
        self.fields
            .iter()
            .find(|spec| spec.key() == key)
            .ok_or_else(|| self.unknown_field(key.as_str()))
    }

    pub(super) fn unknown_field(&self, name: &str) -> FormError {
        tracing::warn!(field = name, "form field is not declared");
        FormError::UnknownField(name.to_string())
    }

    fn notify_listeners(&self) -> FormResult<()> {
        let listeners = read_lock(&self.listeners, "reading form listeners")?
            .entries
            .values()
            .cloned()
            .collect::<Vec<_>>();
        if listeners.is_empty() {
            return Ok(());
        }
        let snapshot = self.snapshot()?;
        for listener in listeners {
            listener(&snapshot);
        }
        Ok(())
    }
}

impl Debug for FormController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("options", &self.options)
            .field("fields", &self.fields)
            .field("on_submit", &self.on_submit.is_some())
            .finish_non_exhaustive()
    }
}

/// Keeps a change listener registered until dropped.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RwLock<Listeners>>,
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let mut listeners = match listeners.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        listeners.entries.remove(&self.id);
    }
}

pub(super) fn transition_submit_state(
    session: &mut SessionState,
    next: SubmitState,
) -> FormResult<()> {
    let current = session.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Submitting)
            | (SubmitState::Validating, SubmitState::Failed)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Failed)
            | (SubmitState::Succeeded, SubmitState::Validating)
            | (SubmitState::Failed, SubmitState::Validating)
            | (_, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    session.submit_state = next;
    Ok(())
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
