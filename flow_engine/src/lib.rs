//! # Flow Engine
//!
//! The runtime half of Cardflow. This crate takes authored documents from
//! `flow_model` and runs conversations over them: it compiles cards into
//! render-ready flows, finds cards for free-text queries, resolves answer
//! actions into typed outcomes, and tracks each conversation's position,
//! history, and data.
//!
//! ## Core Components
//!
//! - **compiler**: cards to presentable flows, plus per-visitor rendering
//! - **search**: lexical card matching with deterministic scoring, and
//!   link-based suggestions
//! - **dispatch**: guard evaluation and action-to-outcome resolution
//! - **context**: per-session state, the only mutable piece at runtime
//! - **store**: keyed document persistence for systems and contexts
//!
//! ## Design Philosophy
//!
//! - **Outcomes over effects**: dispatch describes what should happen;
//!   executing transfers, messages, and webhooks is the caller's job
//! - **Data over exceptions**: search misses, stale writes, and unknown
//!   action types are ordinary values
//! - **Deterministic core**: no randomness inside the engine; weighted and
//!   random selections come back as data for the caller to draw from

pub mod compiler;
pub mod context;
pub mod dispatch;
pub mod search;
pub mod store;

pub use compiler::*;
pub use context::*;
pub use dispatch::*;
pub use search::*;
pub use store::*;
