use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::domain::RecordKind;
use crate::ValidationError;

/// Check `id` against the domain pattern `^<prefix>\d+$`.
///
/// Digits are ASCII only. The input is neither trimmed nor case folded.
pub fn validate(kind: RecordKind, id: &str) -> bool {
    id.strip_prefix(kind.id_prefix())
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Record identifier that has passed [`validate`] for its domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId {
    kind: RecordKind,
    value: String,
}

impl RecordId {
    pub fn parse(kind: RecordKind, input: &str) -> Result<Self, ValidationError> {
        if !validate(kind, input) {
            return Err(ValidationError::invalid_id(kind));
        }

        Ok(Self {
            kind,
            value: input.to_owned(),
        })
    }

    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}
