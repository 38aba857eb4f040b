use std::collections::BTreeMap;

use super::state::FieldKey;

/// A struct of `String` fields that maps onto a form, usually derived with
/// `#[derive(FormModel)]`.
pub trait FormModel: Sized {
    type Fields;

    fn fields() -> Self::Fields;

    /// Field keys in declaration order.
    fn field_keys() -> Vec<FieldKey>;

    fn to_values(&self) -> Vec<(FieldKey, String)>;

    /// Missing keys fall back to an empty string.
    fn from_values(values: &BTreeMap<FieldKey, String>) -> Self;
}
