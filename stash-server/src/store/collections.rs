use sqlx::PgPool;
use uuid::Uuid;

use stash_core::models::{share_slug, Collection, SavedLink};

pub const DEFAULT_COLOR: &str = "#FF6B35";

pub async fn create_collection(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    color: Option<&str>,
) -> Result<Collection, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (user_id, name, color)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(color.unwrap_or(DEFAULT_COLOR))
    .fetch_one(pool)
    .await
}

pub async fn list_collections(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(
        "SELECT * FROM collections WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn delete_collection(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM collections WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark a collection public (generating its share slug) or private again
/// (clearing it). Returns the updated row, or None when not owned.
pub async fn set_public(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    is_public: bool,
) -> Result<Option<Collection>, sqlx::Error> {
    let existing = sqlx::query_as::<_, Collection>(
        "SELECT * FROM collections WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(existing) = existing else {
        return Ok(None);
    };

    let slug = is_public.then(|| share_slug(&existing.name, existing.id));

    sqlx::query_as::<_, Collection>(
        r#"
        UPDATE collections
        SET is_public = $3, share_slug = $4
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(is_public)
    .bind(&slug)
    .fetch_optional(pool)
    .await
}

/// Resolve a public share slug to the collection and its links. Owner
/// scoping does not apply here — this is the one unauthenticated read.
pub async fn get_shared(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<(Collection, Vec<SavedLink>)>, sqlx::Error> {
    let collection = sqlx::query_as::<_, Collection>(
        "SELECT * FROM collections WHERE share_slug = $1 AND is_public = TRUE",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    let Some(collection) = collection else {
        return Ok(None);
    };

    let links = sqlx::query_as::<_, SavedLink>(
        "SELECT * FROM saved_links WHERE collection_id = $1 ORDER BY created_at DESC",
    )
    .bind(collection.id)
    .fetch_all(pool)
    .await?;

    Ok(Some((collection, links)))
}
