use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of a declared form field.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct FieldKey(Arc<str>);

impl FieldKey {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for FieldKey {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for FieldKey {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Validation status of a single field.
///
/// Serializes as `{"status": "error", "message": "..."}` so renderers written
/// against a plain record shape can consume it directly.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "status", rename_all = "camelCase")
)]
pub enum FieldStatus {
    #[default]
    Standard,
    Success,
    Error {
        message: String,
    },
}

impl FieldStatus {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub const fn is_standard(&self) -> bool {
        matches!(self, Self::Standard)
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            Self::Standard | Self::Success => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Success => "success",
            Self::Error { .. } => "error",
        }
    }
}

/// Values and statuses of every declared field.
///
/// Both maps always hold the same key set. The only way to change a
/// `FormState` after construction is through [`super::reduce`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "FormStateRecord")
)]
pub struct FormState {
    pub(super) values: BTreeMap<FieldKey, String>,
    pub(super) statuses: BTreeMap<FieldKey, FieldStatus>,
}

impl FormState {
    /// Builds the initial state: every field at its initial value and `Standard`.
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldKey>,
        V: Into<String>,
    {
        let mut state = Self::default();
        for (key, value) in fields {
            let key = key.into();
            state.statuses.insert(key.clone(), FieldStatus::Standard);
            state.values.insert(key, value.into());
        }
        state
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn status(&self, field: &str) -> Option<&FieldStatus> {
        self.statuses.get(field)
    }

    pub fn values(&self) -> &BTreeMap<FieldKey, String> {
        &self.values
    }

    pub fn statuses(&self) -> &BTreeMap<FieldKey, FieldStatus> {
        &self.statuses
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.statuses.values().any(FieldStatus::is_error)
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct FormStateRecord {
    values: BTreeMap<FieldKey, String>,
    statuses: BTreeMap<FieldKey, FieldStatus>,
}

#[cfg(feature = "serde")]
impl TryFrom<FormStateRecord> for FormState {
    type Error = String;

    fn try_from(record: FormStateRecord) -> Result<Self, Self::Error> {
        if !record.values.keys().eq(record.statuses.keys()) {
            return Err("form state values and statuses must name the same fields".to_string());
        }
        Ok(Self {
            values: record.values,
            statuses: record.statuses,
        })
    }
}
