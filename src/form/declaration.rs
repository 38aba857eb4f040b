use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use super::controller::{FormError, FormOptions, FormResult, FormSnapshot};
use super::hooks::{
    AsyncHookFn, ErrorHandler, HookSpawner, SuccessHandler, boxed_async_hook, spawn_async_hook,
};
use super::model::FormModel;
use super::state::FieldKey;
use super::validation::Rule;

/// The submit event a form binding receives from the renderer.
pub trait SubmitEvent {
    fn prevent_default(&mut self);
    fn is_default_prevented(&self) -> bool;
}

/// Headless [`SubmitEvent`] for renderers without a native event object.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FormSubmitEvent {
    default_prevented: bool,
}

impl FormSubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmitEvent for FormSubmitEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub trait SubmitHandler: Send + Sync {
    fn submit(&self, event: &mut dyn SubmitEvent, snapshot: &FormSnapshot) -> FormResult<()>;
}

impl<F> SubmitHandler for F
where
    F: Fn(&mut dyn SubmitEvent, &FormSnapshot) -> FormResult<()> + Send + Sync,
{
    fn submit(&self, event: &mut dyn SubmitEvent, snapshot: &FormSnapshot) -> FormResult<()> {
        (self)(event, snapshot)
    }
}

#[derive(Clone)]
pub struct FieldSpec {
    key: FieldKey,
    initial_value: String,
    required: bool,
    rules: Vec<Arc<dyn Rule>>,
    on_success: Option<Arc<dyn SuccessHandler>>,
    on_error: Option<Arc<dyn ErrorHandler>>,
    on_success_async: Option<AsyncHookFn>,
    on_error_async: Option<AsyncHookFn>,
}

impl FieldSpec {
    pub fn new(name: impl Into<FieldKey>) -> Self {
        Self {
            key: name.into(),
            initial_value: String::new(),
            required: false,
            rules: Vec::new(),
            on_success: None,
            on_error: None,
            on_success_async: None,
            on_error_async: None,
        }
    }

    pub fn value(mut self, initial: impl Into<String>) -> Self {
        self.initial_value = initial.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Appends a rule. Rules run in the order they were added.
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn on_success(mut self, handler: impl SuccessHandler + 'static) -> Self {
        self.on_success = Some(Arc::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Spawns `hook` with the validated value through [`FormOptions::spawner`].
    pub fn on_success_async<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_success_async = Some(boxed_async_hook(hook));
        self
    }

    /// Spawns `hook` with the failure message through [`FormOptions::spawner`].
    pub fn on_error_async<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_error_async = Some(boxed_async_hook(hook));
        self
    }

    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    pub fn initial_value(&self) -> &str {
        &self.initial_value
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub(super) fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub(super) fn notify_success(&self, value: &str, spawner: Option<&dyn HookSpawner>) {
        if let Some(handler) = self.on_success.as_ref() {
            handler.on_success(value);
        }
        if let Some(hook) = self.on_success_async.as_ref() {
            spawn_async_hook(spawner, hook, value, self.key.as_str());
        }
    }

    pub(super) fn notify_error(&self, message: &str, spawner: Option<&dyn HookSpawner>) {
        if let Some(handler) = self.on_error.as_ref() {
            handler.on_error(message);
        }
        if let Some(hook) = self.on_error_async.as_ref() {
            spawn_async_hook(spawner, hook, message, self.key.as_str());
        }
    }
}

impl Debug for FieldSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("key", &self.key)
            .field("initial_value", &self.initial_value)
            .field("required", &self.required)
            .field("rules", &self.rules.len())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

/// Everything a [`super::FormController`] is built from.
#[derive(Clone, Default)]
pub struct FormDeclaration {
    pub(super) fields: Vec<FieldSpec>,
    pub(super) on_submit: Option<Arc<dyn SubmitHandler>>,
    pub(super) options: FormOptions,
}

impl FormDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares one field per model field, seeded with the model's values.
    pub fn from_model<M: FormModel>(model: &M) -> Self {
        model
            .to_values()
            .into_iter()
            .fold(Self::new(), |declaration, (key, value)| {
                declaration.field(FieldSpec::new(key).value(value))
            })
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Reconfigures an already declared field. Unknown names are left alone.
    pub fn with_field(mut self, name: &str, configure: impl FnOnce(FieldSpec) -> FieldSpec) -> Self {
        if let Some(index) = self.fields.iter().position(|spec| spec.key == *name) {
            let spec = self.fields.remove(index);
            self.fields.insert(index, configure(spec));
        }
        self
    }

    pub fn on_submit(mut self, handler: impl SubmitHandler + 'static) -> Self {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub(super) fn check_unique(&self) -> FormResult<()> {
        let mut seen = BTreeSet::new();
        for spec in &self.fields {
            if !seen.insert(spec.key.as_str()) {
                return Err(FormError::DuplicateField(spec.key.clone()));
            }
        }
        Ok(())
    }
}

impl Debug for FormDeclaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDeclaration")
            .field("fields", &self.fields)
            .field("on_submit", &self.on_submit.is_some())
            .field("options", &self.options)
            .finish()
    }
}
