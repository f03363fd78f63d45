//! Database configuration module for `FinanceBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`;
//! the composite uniqueness rules (category name per user, budget per category and period)
//! are added as explicit unique indexes because they cannot be expressed on a single column.

use crate::entities::{Budget, Category, SavingsGoal, Transaction, User, budget, category};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/finance_buddy.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Creates the directory holding a file-backed `SQLite` database, if missing.
fn ensure_sqlite_directory(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database at `database_url` and makes sure every
/// table and index exists.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    ensure_sqlite_directory(database_url)?;
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all ledger tables and their unique indexes. Safe to call on every start.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Parents first so foreign keys resolve
    create_table(db, &schema, User).await?;
    create_table(db, &schema, Category).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, SavingsGoal).await?;
    create_table(db, &schema, Budget).await?;

    let category_name_index = Index::create()
        .name("idx_categories_user_name")
        .table(Category)
        .col(category::Column::UserId)
        .col(category::Column::Name)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&category_name_index)).await?;

    let budget_period_index = Index::create()
        .name("idx_budgets_user_category_period")
        .table(Budget)
        .col(budget::Column::UserId)
        .col(budget::Column::CategoryId)
        .col(budget::Column::Period)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&budget_period_index)).await?;

    Ok(())
}
