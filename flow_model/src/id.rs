//! Identifier newtypes shared across the authored graph and session state.
//!
//! Ids are prefixed strings (`card_<uuid>`, `q_<uuid>`, ...) rather than bare
//! UUIDs so that a raw document or a log line is self-describing. Authored
//! documents may carry any non-empty string in these fields; the generated
//! form is only the default for ids minted at runtime.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mint a fresh random id with this type's prefix.
            pub fn new() -> Self {
                Self(format!(concat!($prefix, "_{}"), Uuid::new_v4()))
            }

            /// Wrap an authored id as-is, without checking its shape.
            pub fn from_raw(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the document carried an empty id.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from_raw(s))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_raw(s)
            }
        }
    };
}

prefixed_id!(
    /// Unique identifier for a conversation system.
    SystemId,
    "sys"
);

prefixed_id!(
    /// Unique identifier for a card.
    CardId,
    "card"
);

prefixed_id!(
    /// Unique identifier for a question within a card.
    QuestionId,
    "q"
);

prefixed_id!(
    /// Unique identifier for an answer.
    AnswerId,
    "ans"
);

prefixed_id!(
    /// Unique identifier for an action.
    ActionId,
    "act"
);

prefixed_id!(
    /// Unique identifier for a conversation context.
    ContextId,
    "ctx"
);
