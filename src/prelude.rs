pub use crate::form::rules::{max_length, min_length, pattern, rule};
pub use crate::form::{
    Action, FieldKey, FieldProps, FieldSpec, FieldStatus, FormController, FormDeclaration,
    FormError, FormModel, FormOptions, FormResult, FormSnapshot, FormSubmitEvent, RuleViolation,
    SubmitEvent, SubmitOutcome, ValidationMode,
};
pub use crate::interaction::{EventBinding, EventHub, EventTarget, HoverState, ListenerOptions};
