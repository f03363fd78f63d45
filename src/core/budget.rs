//! Budget accounting - keeps each budget's accumulated spend consistent with expenses.
//!
//! Budgets are matched by category id alone when an expense is applied. Categories are
//! already scoped to one user, so this only ever touches the owner's budgets.
//! Spend is incremented with a single `UPDATE ... SET current_spent = current_spent + ?`
//! so concurrent expenses cannot lose updates. There is no automatic period rollover:
//! spend only returns to zero through [`reset_all`] or by re-creating a budget.

use crate::{
    entities::{Budget, BudgetPeriod, Category, budget, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, sea_query::Expr, prelude::*};
use tracing::info;

/// Warning emitted when accumulated spend goes past a budget's limit.
#[derive(Debug, Clone, PartialEq)]
pub struct OverageNotice {
    /// Budget that was exceeded
    pub budget_id: i64,
    /// Name of the budget's category
    pub category_name: String,
    /// Budget period
    pub period: BudgetPeriod,
    /// Spending limit
    pub limit: f64,
    /// Spend after the expense was applied
    pub spent: f64,
    /// `spent - limit`, always positive
    pub overage: f64,
}

/// Budgets touched by one expense and the overages it caused.
#[derive(Debug, Clone, Default)]
pub struct ExpenseOutcome {
    /// Every budget of the category, after the increment
    pub updated: Vec<budget::Model>,
    /// One notice per budget now over its limit
    pub overages: Vec<OverageNotice>,
}

/// Whether a budget upsert inserted a new row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new budget row was inserted
    Created,
    /// An existing budget for the same category and period was overwritten
    Updated,
}

/// Builds an overage notice if the budget's spend is strictly above its limit.
///
/// Spending exactly the limit is not an overage.
#[must_use]
pub fn check_overage(budget: &budget::Model, category_name: &str) -> Option<OverageNotice> {
    (budget.current_spent > budget.amount).then(|| OverageNotice {
        budget_id: budget.id,
        category_name: category_name.to_string(),
        period: budget.period,
        limit: budget.amount,
        spent: budget.current_spent,
        overage: budget.current_spent - budget.amount,
    })
}

/// True when the budget is within its limit but has at most `alert_percent`% of it left.
#[must_use]
pub fn is_near_limit(budget: &budget::Model, alert_percent: f64) -> bool {
    if budget.amount <= 0.0 || budget.current_spent > budget.amount {
        return false;
    }
    let remaining = budget.amount - budget.current_spent;
    remaining / budget.amount * 100.0 <= alert_percent
}

/// Adds `amount` to the spend of every budget referencing `category_id`.
///
/// Runs on the caller's connection; callers pass the database transaction that also
/// inserts the expense so both commit together.
pub async fn apply_expense<C>(db: &C, category_id: i64, amount: f64) -> Result<ExpenseOutcome>
where
    C: ConnectionTrait,
{
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let result = Budget::update_many()
        .col_expr(
            budget::Column::CurrentSpent,
            Expr::col(budget::Column::CurrentSpent).add(amount),
        )
        .filter(budget::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(ExpenseOutcome::default());
    }

    let category_name = Category::find_by_id(category_id)
        .one(db)
        .await?
        .map(|c| c.name)
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let updated = Budget::find()
        .filter(budget::Column::CategoryId.eq(category_id))
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await?;

    let overages = updated
        .iter()
        .filter_map(|b| check_overage(b, &category_name))
        .collect();

    Ok(ExpenseOutcome { updated, overages })
}

/// Zeroes spend and restarts `start_date` for every budget the user owns.
///
/// Limits are left unchanged. Returns the number of budgets reset.
pub async fn reset_all<C>(db: &C, user_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Budget::update_many()
        .col_expr(budget::Column::CurrentSpent, Expr::value(0.0_f64))
        .col_expr(budget::Column::StartDate, Expr::value(chrono::Utc::now()))
        .filter(budget::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    info!(user_id, reset = result.rows_affected, "Reset budgets");
    Ok(result.rows_affected)
}

/// Creates the budget for `(user, category, period)` or overwrites the existing one.
///
/// Overwriting sets the new limit, zeroes spend and restarts `start_date`.
///
/// # Errors
/// - `Error::InvalidAmount` if `amount` is not a finite number greater than zero
/// - `Error::CategoryNotFound` if the category is not the user's
pub async fn upsert_budget<C>(
    db: &C,
    user_id: i64,
    category_id: i64,
    period: BudgetPeriod,
    amount: f64,
) -> Result<(budget::Model, UpsertOutcome)>
where
    C: ConnectionTrait,
{
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    Category::find_by_id(category_id)
        .filter(category::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let now = chrono::Utc::now();
    let existing = Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::CategoryId.eq(category_id))
        .filter(budget::Column::Period.eq(period))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        let mut active_model: budget::ActiveModel = existing.into();
        active_model.amount = Set(amount);
        active_model.current_spent = Set(0.0);
        active_model.start_date = Set(now);
        let updated = active_model.update(db).await?;
        return Ok((updated, UpsertOutcome::Updated));
    }

    let created = budget::ActiveModel {
        user_id: Set(user_id),
        category_id: Set(category_id),
        amount: Set(amount),
        period: Set(period),
        current_spent: Set(0.0),
        start_date: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok((created, UpsertOutcome::Created))
}

/// All of the user's budgets paired with their category, in creation order.
pub async fn list_budgets<C>(
    db: &C,
    user_id: i64,
) -> Result<Vec<(budget::Model, Option<category::Model>)>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .find_also_related(Category)
        .filter(budget::Column::UserId.eq(user_id))
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
