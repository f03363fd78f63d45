//! Budget entity - A spending limit for one category over one period.
//!
//! A budget is unique per `(user_id, category_id, period)`. `current_spent`
//! accumulates expense transactions and only goes back to zero through an explicit
//! reset or by re-creating the budget; there is no automatic period rollover.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reset cadence of a budget
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum BudgetPeriod {
    /// One day
    #[sea_orm(string_value = "day")]
    Day,
    /// One week
    #[sea_orm(string_value = "week")]
    Week,
    /// One month
    #[sea_orm(string_value = "month")]
    Month,
    /// One year
    #[sea_orm(string_value = "year")]
    Year,
}

impl BudgetPeriod {
    /// Lowercase token stored in the database and shown to users
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user (internal id)
    pub user_id: i64,
    /// Category whose expenses count against this budget
    pub category_id: i64,
    /// Spending limit, always positive
    pub amount: f64,
    /// Reset cadence
    pub period: BudgetPeriod,
    /// Expenses accumulated since `start_date`
    pub current_spent: f64,
    /// When the budget was created or last reset
    pub start_date: DateTimeUtc,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// Each budget belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
