//! Inbound events delivered by the chat transport.
//!
//! Callback payloads follow the `{action_tag}_{id}` convention; [`CallbackAction`] is
//! the typed form and the only place that knows the wire tags.

use std::fmt;

/// What the user sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// Free text or a menu-label tap
    Text(String),
    /// Raw callback data from an inline button
    Callback(String),
}

impl EventPayload {
    /// The trimmed text, if this is a text event
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.trim()),
            Self::Callback(_) => None,
        }
    }

    /// True if this is a text event equal to `label` (ignoring surrounding whitespace)
    #[must_use]
    pub fn is_label(&self, label: &str) -> bool {
        self.text() == Some(label)
    }

    /// The parsed callback action, if this is a well-formed callback
    #[must_use]
    pub fn callback(&self) -> Option<CallbackAction> {
        match self {
            Self::Callback(data) => CallbackAction::parse(data),
            Self::Text(_) => None,
        }
    }
}

/// One event from one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// External chat identifier of the sender
    pub sender: String,
    /// Event content
    pub payload: EventPayload,
}

impl InboundEvent {
    /// A text message (or menu-label tap) from `sender`
    pub fn text(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            payload: EventPayload::Text(text.into()),
        }
    }

    /// An inline button press from `sender`
    pub fn callback(sender: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            payload: EventPayload::Callback(data.into()),
        }
    }
}

const TRANSACTION_CATEGORY: &str = "transaction_cat_";
const BUDGET_CATEGORY: &str = "budget_cat_";
const DEPOSIT: &str = "deposit_";
const VIEW_CATEGORY: &str = "view_cat_";
const NEW_TRANSACTION_CATEGORY: &str = "new_transaction_category";
const NEW_BUDGET_CATEGORY: &str = "new_budget_category";

/// Typed inline-button action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Category chosen for the pending transaction
    TransactionCategory(i64),
    /// Category chosen for a budget
    BudgetCategory(i64),
    /// Goal chosen for a deposit
    Deposit(i64),
    /// Show a category's recent transactions
    ViewCategory(i64),
    /// Create a category for the pending transaction
    NewTransactionCategory,
    /// Create a category from the budget category picker
    NewBudgetCategory,
}

impl CallbackAction {
    /// Parses raw callback data. Unknown tags and non-numeric ids yield `None`.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            NEW_TRANSACTION_CATEGORY => return Some(Self::NewTransactionCategory),
            NEW_BUDGET_CATEGORY => return Some(Self::NewBudgetCategory),
            _ => {}
        }

        let tagged: [(&str, fn(i64) -> Self); 4] = [
            (TRANSACTION_CATEGORY, Self::TransactionCategory),
            (BUDGET_CATEGORY, Self::BudgetCategory),
            (DEPOSIT, Self::Deposit),
            (VIEW_CATEGORY, Self::ViewCategory),
        ];
        tagged.iter().find_map(|&(tag, build)| {
            data.strip_prefix(tag)
                .and_then(|id| id.parse().ok())
                .map(build)
        })
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransactionCategory(id) => write!(f, "{TRANSACTION_CATEGORY}{id}"),
            Self::BudgetCategory(id) => write!(f, "{BUDGET_CATEGORY}{id}"),
            Self::Deposit(id) => write!(f, "{DEPOSIT}{id}"),
            Self::ViewCategory(id) => write!(f, "{VIEW_CATEGORY}{id}"),
            Self::NewTransactionCategory => f.write_str(NEW_TRANSACTION_CATEGORY),
            Self::NewBudgetCategory => f.write_str(NEW_BUDGET_CATEGORY),
        }
    }
}
