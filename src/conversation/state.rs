//! Flow and step definitions.

use crate::{core::transaction::TransactionKind, entities::BudgetPeriod};

/// Steps of the transaction entry flow
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionStep {
    /// Waiting for the amount
    AwaitAmount {
        /// Income or expense, chosen from the main menu
        kind: TransactionKind,
    },
    /// Waiting for a category selection
    AwaitCategory {
        /// Income or expense
        kind: TransactionKind,
        /// Validated amount
        amount: f64,
    },
    /// Waiting for the name of a category to create and file the transaction under
    AwaitNewCategoryName {
        /// Income or expense
        kind: TransactionKind,
        /// Validated amount
        amount: f64,
    },
}

/// Steps of the savings goal creation flow
#[derive(Debug, Clone, PartialEq)]
pub enum GoalStep {
    /// Waiting for the goal name
    AwaitName,
    /// Waiting for the target amount
    AwaitTargetAmount {
        /// Validated goal name
        name: String,
    },
    /// Waiting for a deadline or the skip token
    AwaitTargetDate {
        /// Validated goal name
        name: String,
        /// Validated target amount
        target_amount: f64,
    },
}

/// Steps of the goal deposit flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositStep {
    /// Waiting for a goal selection
    AwaitGoalSelection,
    /// Waiting for the deposit amount
    AwaitAmount {
        /// Selected goal
        goal_id: i64,
    },
}

/// Steps of the budget creation flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetStep {
    /// Waiting for a category selection
    AwaitCategory,
    /// Waiting for the period token
    AwaitPeriod {
        /// Selected category
        category_id: i64,
    },
    /// Waiting for the limit
    AwaitAmount {
        /// Selected category
        category_id: i64,
        /// Validated period
        period: BudgetPeriod,
    },
}

/// Where a user currently is in the conversation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConversationState {
    /// No active flow
    #[default]
    Idle,
    /// Recording an income or expense
    Transaction(TransactionStep),
    /// Creating a standalone category; waiting for its name
    CategoryCreation,
    /// Creating a savings goal
    GoalCreation(GoalStep),
    /// Depositing into a savings goal
    GoalDeposit(DepositStep),
    /// Creating or overwriting a budget
    BudgetCreation(BudgetStep),
    /// Waiting for the report period choice
    Report,
}

impl ConversationState {
    /// True when no flow is active
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Name of the active flow, for logging
    #[must_use]
    pub const fn flow_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Transaction(_) => "transaction_entry",
            Self::CategoryCreation => "category_creation",
            Self::GoalCreation(_) => "goal_creation",
            Self::GoalDeposit(_) => "goal_deposit",
            Self::BudgetCreation(_) => "budget_creation",
            Self::Report => "report_generation",
        }
    }
}
