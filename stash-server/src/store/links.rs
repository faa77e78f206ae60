use sqlx::PgPool;
use uuid::Uuid;

use stash_core::models::{EnrichmentResult, SavedLink};
use stash_core::platform::Platform;

/// Fields supplied by the caller when saving a link. Enrichment fields are
/// never part of a create.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub url: String,
    pub title: String,
    pub platform: Platform,
    pub thumbnail: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub collection_id: Option<Uuid>,
}

pub async fn create_link(
    pool: &PgPool,
    user_id: Uuid,
    link: NewLink,
) -> Result<SavedLink, sqlx::Error> {
    sqlx::query_as::<_, SavedLink>(
        r#"
        INSERT INTO saved_links (user_id, url, title, platform, thumbnail, notes, tags, collection_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&link.url)
    .bind(&link.title)
    .bind(link.platform)
    .bind(&link.thumbnail)
    .bind(&link.notes)
    .bind(&link.tags)
    .bind(link.collection_id)
    .fetch_one(pool)
    .await
}

/// Owner's full link set, most recent first. Search intentionally reads the
/// whole corpus — the AI call does the matching, there is no index.
pub async fn list_links(pool: &PgPool, user_id: Uuid) -> Result<Vec<SavedLink>, sqlx::Error> {
    sqlx::query_as::<_, SavedLink>(
        "SELECT * FROM saved_links WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_link(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<SavedLink>, sqlx::Error> {
    sqlx::query_as::<_, SavedLink>("SELECT * FROM saved_links WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Returns false when the row was not owned by the caller or already gone.
pub async fn delete_link(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM saved_links WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Write one enrichment pass onto a row. Empty fields never clobber existing
/// data (NULL binds fall through the COALESCE), and og_image mirrors into
/// thumbnail only when no thumbnail exists yet. Returns false when the row
/// vanished before the write — the late write of a deleted link is a no-op.
pub async fn apply_enrichment(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    result: &EnrichmentResult,
) -> Result<bool, sqlx::Error> {
    if result.is_empty() {
        return Ok(true);
    }

    let updated = sqlx::query(
        r#"
        UPDATE saved_links SET
            title          = COALESCE($3, title),
            og_image       = COALESCE($4, og_image),
            og_description = COALESCE($5, og_description),
            favicon        = COALESCE($6, favicon),
            summary        = COALESCE($7, summary),
            ai_tags        = COALESCE($8, ai_tags),
            thumbnail      = COALESCE(thumbnail, $4),
            updated_at     = now()
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&result.title)
    .bind(&result.og_image)
    .bind(&result.og_description)
    .bind(&result.favicon)
    .bind(&result.summary)
    .bind(&result.ai_tags)
    .execute(pool)
    .await?;

    Ok(updated.rows_affected() > 0)
}

/// Flip the highlight flag; returns the new state, or None when not owned.
pub async fn toggle_highlight(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<bool>, sqlx::Error> {
    let row: Option<(bool,)> = sqlx::query_as(
        r#"
        UPDATE saved_links
        SET is_highlighted = NOT is_highlighted, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING is_highlighted
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(v,)| v))
}

pub async fn set_reminder(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    reminder_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE saved_links SET reminder_at = $3, updated_at = now() WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .bind(reminder_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn move_to_collection(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    collection_id: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE saved_links SET collection_id = $3, updated_at = now() WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .bind(collection_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
