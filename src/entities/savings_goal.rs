//! Savings goal entity - A named target amount the user saves towards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Savings goal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    /// Unique identifier for the goal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user (internal id)
    pub user_id: i64,
    /// Goal name as typed by the user
    pub name: String,
    /// Amount to reach, always positive
    pub target_amount: f64,
    /// Amount saved so far; only grows through deposits
    pub current_amount: f64,
    /// Optional deadline, strictly in the future when the goal was created
    pub target_date: Option<Date>,
    /// When the goal was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `SavingsGoal` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each goal belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
