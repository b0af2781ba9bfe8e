//! # Flow Model
//!
//! The authored half of Cardflow: systems, cards, questions, answers, and
//! the actions that wire them together, plus the validation that keeps a
//! document coherent. This crate is the single source of truth for document
//! shapes and contains no session or runtime logic.

pub mod action;
pub mod card;
pub mod condition;
pub mod defaults;
pub mod error;
pub mod id;
pub mod system;
pub mod validate;

pub use action::*;
pub use card::*;
pub use condition::*;
pub use defaults::*;
pub use error::*;
pub use id::*;
pub use system::*;
pub use validate::*;
