mod binding;
mod controller;
mod declaration;
mod hooks;
mod model;
mod reducer;
pub mod rules;
mod state;
mod validation;


pub use bindery_derive::FormModel;
pub use binding::{
    ChangeHandler, FieldProps, FieldPropsSet, FormBinding, InputBinding, SubmitBinding,
    SubmitOutcome,
};
pub use controller::{
    FormController, FormError, FormOptions, FormResult, FormSnapshot, SubmitState, Subscription,
    ValidationMode,
};
pub use declaration::{FieldSpec, FormDeclaration, FormSubmitEvent, SubmitEvent, SubmitHandler};
pub use hooks::{ErrorHandler, HookFuture, HookSpawner, SuccessHandler};
pub use model::FormModel;
pub use reducer::{
    Action, ActionKind, PendingValidation, Transition, apply, apply_change, reduce,
};
pub use state::{FieldKey, FieldStatus, FormState};
pub use validation::{Rule, RuleViolation, Verdict, evaluate};
