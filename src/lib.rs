//! # Sonic Library
//!
//! Core of the Sonic mood-based music recommender, shared by the `sonic`
//! binary, the integration tests and the benchmarks.
//!
//! ## Architecture
//!
//! - `gemini`: blocking client for the generative language API
//! - `prompt` / `response`: request construction and validated reply parsing
//! - `recommend`: the [`recommend::Recommender`] seam and query types
//! - `session` / `router`: conversation state and input dispatch
//! - `db`, `queue`, `history`, `settings`: SQLite persistence
//! - `links`, `languages`, `onboarding`: catalogue data for the front-end
//! - `repl`, `cli`, `completion`: terminal surfaces

pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod gemini;
pub mod history;
pub mod languages;
pub mod links;
pub mod onboarding;
pub mod prompt;
pub mod queue;
pub mod recommend;
pub mod repl;
pub mod response;
pub mod router;
pub mod session;
pub mod settings;
pub mod song;
