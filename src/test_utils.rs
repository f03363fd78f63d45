//! Shared test utilities for `FinanceBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        category, goal, user,
        transaction::{self, RecordedTransaction, TransactionKind},
    },
    entities::{self, Budget, BudgetPeriod},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a user with the given external chat id.
pub async fn create_test_user(
    db: &DatabaseConnection,
    external_id: &str,
) -> Result<entities::user::Model> {
    user::get_or_create_user(db, external_id).await
}

/// Fresh database with a single user, `"alice"`.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "alice").await?;
    Ok((db, user))
}

/// Creates a category owned by `user`.
pub async fn create_test_category(
    db: &DatabaseConnection,
    user: &entities::user::Model,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, user.id, name).await
}

/// Fresh database with user `"alice"` owning one category.
pub async fn setup_with_category(
    name: &str,
) -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::category::Model,
)> {
    let (db, user) = setup_with_user().await?;
    let category = create_test_category(&db, &user, name).await?;
    Ok((db, user, category))
}

/// Records a transaction through the normal path, so expenses hit budgets.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    user: &entities::user::Model,
    category: &entities::category::Model,
    amount: f64,
    kind: TransactionKind,
) -> Result<RecordedTransaction> {
    transaction::record_transaction(db, user.id, category.id, amount, kind).await
}

/// Creates a budget with zero spend.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    user: &entities::user::Model,
    category: &entities::category::Model,
    period: BudgetPeriod,
    amount: f64,
) -> Result<entities::budget::Model> {
    let (budget, _) =
        crate::core::budget::upsert_budget(db, user.id, category.id, period, amount).await?;
    Ok(budget)
}

/// Creates a goal without a deadline.
pub async fn create_test_goal(
    db: &DatabaseConnection,
    user: &entities::user::Model,
    name: &str,
    target_amount: f64,
) -> Result<entities::savings_goal::Model> {
    let today = chrono::Utc::now().date_naive();
    goal::create_goal(db, user.id, name, target_amount, None, today).await
}

/// Overwrites a budget's accumulated spend, bypassing the expense path.
pub async fn set_budget_spent(db: &DatabaseConnection, budget_id: i64, spent: f64) -> Result<()> {
    let budget = reload_budget(db, budget_id).await?;
    let mut active_model: entities::budget::ActiveModel = budget.into();
    active_model.current_spent = Set(spent);
    active_model.update(db).await?;
    Ok(())
}

/// Reads a budget back from the database.
pub async fn reload_budget(
    db: &DatabaseConnection,
    budget_id: i64,
) -> Result<entities::budget::Model> {
    Budget::find_by_id(budget_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::InvalidInput {
            message: format!("Budget {budget_id} not found"),
        })
}
