//! Transaction business logic - records income and expenses.
//!
//! Recording an expense also applies it to every budget of the chosen category. The
//! transaction insert and the budget increments run inside one database transaction, so
//! either all of them become durable or none do. Transactions are never updated or deleted.

use crate::{
    core::budget::{self, ExpenseOutcome},
    entities::{Category, Transaction, category, transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money coming in
    Income,
    /// Money going out, counted against budgets
    Expense,
}

impl TransactionKind {
    /// Whether this kind is stored with `is_income = true`
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.write_str("Income"),
            Self::Expense => f.write_str("Expense"),
        }
    }
}

/// What recording a transaction produced.
#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    /// The committed transaction row
    pub transaction: transaction::Model,
    /// Category the transaction was filed under
    pub category: category::Model,
    /// Budget effects; empty for income
    pub budgets: ExpenseOutcome,
}

/// Records a transaction for `user_id` in one of their categories.
///
/// Expenses are applied to the category's budgets within the same database transaction.
///
/// # Errors
/// - `Error::InvalidAmount` if `amount` is not a finite number greater than zero
/// - `Error::CategoryNotFound` if the category does not exist or belongs to someone else
/// - `Error::Database` if any write fails; nothing is committed in that case
pub async fn record_transaction<C>(
    db: &C,
    user_id: i64,
    category_id: i64,
    amount: f64,
    kind: TransactionKind,
) -> Result<RecordedTransaction>
where
    C: TransactionTrait,
{
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    let category = Category::find_by_id(category_id)
        .filter(category::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let transaction = transaction::ActiveModel {
        user_id: Set(user_id),
        category_id: Set(category_id),
        amount: Set(amount),
        is_income: Set(kind.is_income()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let budgets = match kind {
        TransactionKind::Income => ExpenseOutcome::default(),
        TransactionKind::Expense => budget::apply_expense(&txn, category_id, amount).await?,
    };

    txn.commit().await?;

    debug!(
        transaction_id = transaction.id,
        user_id,
        category_id,
        amount,
        %kind,
        overages = budgets.overages.len(),
        "Recorded transaction"
    );

    Ok(RecordedTransaction {
        transaction,
        category,
        budgets,
    })
}

/// Most recent transactions of a category, newest first.
pub async fn recent_transactions_for_category<C>(
    db: &C,
    category_id: i64,
    limit: u64,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(transaction::Column::CategoryId.eq(category_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
