//! Savings goal business logic - goal creation and deposits.
//!
//! `current_amount` never decreases: the only mutation is a deposit, applied as an
//! atomic increment.

use crate::{
    entities::{SavingsGoal, savings_goal},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, sea_query::Expr, prelude::*};
use tracing::info;

/// Result of depositing into a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositOutcome {
    /// The goal after the deposit
    pub goal: savings_goal::Model,
    /// Amount deposited
    pub deposited: f64,
    /// True when the saved amount has reached the target
    pub completed: bool,
}

/// Whether a goal has reached its target.
#[must_use]
pub fn is_completed(goal: &savings_goal::Model) -> bool {
    goal.current_amount >= goal.target_amount
}

/// Creates a savings goal with zero saved.
///
/// # Errors
/// - `Error::InvalidInput` for an empty name or a deadline not strictly after `today`
/// - `Error::InvalidAmount` if `target_amount` is not a finite number greater than zero
pub async fn create_goal<C>(
    db: &C,
    user_id: i64,
    name: &str,
    target_amount: f64,
    target_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<savings_goal::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Goal name cannot be empty".to_string(),
        });
    }
    if !target_amount.is_finite() || target_amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: target_amount,
        });
    }
    if let Some(date) = target_date.filter(|date| *date <= today) {
        return Err(Error::InvalidInput {
            message: format!("Target date {date} is not in the future"),
        });
    }

    let goal = savings_goal::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        target_amount: Set(target_amount),
        current_amount: Set(0.0),
        target_date: Set(target_date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(goal_id = goal.id, user_id, "Created savings goal");
    Ok(goal)
}

/// Lists the user's goals in creation order.
pub async fn list_goals<C>(db: &C, user_id: i64) -> Result<Vec<savings_goal::Model>>
where
    C: ConnectionTrait,
{
    SavingsGoal::find()
        .filter(savings_goal::Column::UserId.eq(user_id))
        .order_by_asc(savings_goal::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a goal by id, but only if it belongs to `user_id`.
pub async fn get_goal_for_user<C>(
    db: &C,
    user_id: i64,
    goal_id: i64,
) -> Result<Option<savings_goal::Model>>
where
    C: ConnectionTrait,
{
    SavingsGoal::find_by_id(goal_id)
        .filter(savings_goal::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds `amount` to a goal's saved amount.
///
/// # Errors
/// - `Error::InvalidAmount` if `amount` is not a finite number greater than zero
/// - `Error::GoalNotFound` if the goal does not exist or belongs to someone else
pub async fn deposit<C>(db: &C, user_id: i64, goal_id: i64, amount: f64) -> Result<DepositOutcome>
where
    C: TransactionTrait,
{
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    get_goal_for_user(&txn, user_id, goal_id)
        .await?
        .ok_or(Error::GoalNotFound { id: goal_id })?;

    SavingsGoal::update_many()
        .col_expr(
            savings_goal::Column::CurrentAmount,
            Expr::col(savings_goal::Column::CurrentAmount).add(amount),
        )
        .filter(savings_goal::Column::Id.eq(goal_id))
        .exec(&txn)
        .await?;

    let goal = SavingsGoal::find_by_id(goal_id)
        .one(&txn)
        .await?
        .ok_or(Error::GoalNotFound { id: goal_id })?;

    txn.commit().await?;

    let completed = is_completed(&goal);
    info!(goal_id, user_id, amount, completed, "Deposited into savings goal");
    Ok(DepositOutcome {
        goal,
        deposited: amount,
        completed,
    })
}
