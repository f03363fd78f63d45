//! Core business logic - framework-agnostic ledger operations.
//!
//! Nothing in here knows about chat platforms or conversation state; functions take a
//! database connection (or transaction) plus plain values and return models or
//! structured outcomes the bot layer formats.

/// Budget accounting: expense application, overage detection, reset, upsert
pub mod budget;
/// Category management and per-category summaries
pub mod category;
/// Savings goals and deposits
pub mod goal;
/// Period reports and display helpers
pub mod report;
/// Transaction recording
pub mod transaction;
/// Lazy user registration
pub mod user;
