//! Category business logic - creation with per-user uniqueness and summaries.

use crate::{
    entities::{Category, Transaction, category, transaction},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};

/// A category together with its transaction statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    /// The summarised category
    pub category: category::Model,
    /// Number of transactions filed under it
    pub transaction_count: u64,
    /// Sum of all their amounts, income and expense alike
    pub total: f64,
}

/// Lists the user's categories in creation order.
pub async fn list_categories<C>(db: &C, user_id: i64) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .order_by_asc(category::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by id, but only if it belongs to `user_id`.
pub async fn get_category_for_user<C>(
    db: &C,
    user_id: i64,
    category_id: i64,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(category::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds one of the user's categories by its exact (trimmed) name.
pub async fn find_category_by_name<C>(
    db: &C,
    user_id: i64,
    name: &str,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category for the user.
///
/// The name is trimmed. Empty names are rejected with `Error::InvalidInput` and names the
/// user already owns with `Error::DuplicateCategory`; in both cases nothing is written.
pub async fn create_category<C>(db: &C, user_id: i64, name: &str) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput {
            message: "Category name cannot be empty".to_string(),
        });
    }

    if find_category_by_name(db, user_id, name).await?.is_some() {
        return Err(Error::DuplicateCategory {
            name: name.to_string(),
        });
    }

    category::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Sum of all transaction amounts filed under a category.
pub async fn category_total<C>(db: &C, category_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let total: Option<Option<f64>> = Transaction::find()
        .select_only()
        .column_as(transaction::Column::Amount.sum(), "total")
        .filter(transaction::Column::CategoryId.eq(category_id))
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or(0.0))
}

/// Builds a summary (transaction count and total) for each of the user's categories.
pub async fn category_summaries<C>(db: &C, user_id: i64) -> Result<Vec<CategorySummary>>
where
    C: ConnectionTrait,
{
    let categories = list_categories(db, user_id).await?;
    let mut summaries = Vec::with_capacity(categories.len());

    for category in categories {
        let transaction_count = Transaction::find()
            .filter(transaction::Column::CategoryId.eq(category.id))
            .count(db)
            .await?;
        let total = category_total(db, category.id).await?;
        summaries.push(CategorySummary {
            category,
            transaction_count,
            total,
        });
    }

    Ok(summaries)
}
