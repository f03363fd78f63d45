//! Conversation state machine - per-user multi-turn flows.
//!
//! A user is either idle or inside exactly one flow. Each flow is a linear chain of
//! steps whose working data lives in the [`ConversationState`] variant itself, so
//! leaving a flow (completion, cancel, error) discards it by resetting the state to
//! [`ConversationState::Idle`].

/// Per-user session store with per-user serialization
pub mod session;
/// Flow and step definitions with their working data
pub mod state;
/// Parsing and validation of free-text input
pub mod validation;

pub use session::SessionStore;
pub use state::{BudgetStep, ConversationState, DepositStep, GoalStep, TransactionStep};
pub use validation::{DateInput, ValidationError};
