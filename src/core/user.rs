//! User registration. Users are created on first contact and never removed.

use crate::{
    entities::{User, user},
    errors::Result,
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Finds the user with the given chat identifier, creating the row on first contact.
pub async fn get_or_create_user<C>(db: &C, external_id: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = User::find()
        .filter(user::Column::ExternalId.eq(external_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let created = user::ActiveModel {
        external_id: Set(external_id.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id = created.id, external_id, "Registered new user");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_get_or_create_user_creates_once() -> Result<()> {
        let db = setup_test_db().await?;

        let first = get_or_create_user(&db, "42").await?;
        let second = get_or_create_user(&db, "42").await?;

        assert_eq!(first, second);
        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_distinct_external_ids_get_distinct_users() -> Result<()> {
        let db = setup_test_db().await?;

        let alice = get_or_create_user(&db, "100").await?;
        let bob = get_or_create_user(&db, "200").await?;

        assert_ne!(alice.id, bob.id);
        assert_eq!(bob.external_id, "200");
        Ok(())
    }
}
