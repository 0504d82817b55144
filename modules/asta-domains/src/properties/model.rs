use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use asta_core::NewProperty;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub location_name: String,
    pub lat: f64,
    pub lng: f64,
    pub property_type: String,
    /// Comma-joined in the store; use [`Property::vibe_tags`] for the list.
    pub vibe_features: String,
    pub description: String,
    pub geo_accuracy: String,
    pub status: String,
    pub votes_good: i32,
    pub votes_bad: i32,
    pub votes_scam: i32,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Tags as a list, split back out of the store's delimited column.
    pub fn vibe_tags(&self) -> Vec<String> {
        self.vibe_features
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_active(limit: i64, offset: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM properties
            WHERE status = 'active'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Case-insensitive substring match on the location name, active
    /// records only. Powers the bot's "find <area>" intent.
    pub async fn search_by_location(query: &str, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM properties
            WHERE status = 'active' AND location_name ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(format!("%{}%", query.trim()))
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Tag field of every record, for trend aggregation.
    pub async fn all_vibe_features(pool: &PgPool) -> Result<Vec<String>> {
        let rows = sqlx::query_as::<_, (String,)>("SELECT vibe_features FROM properties")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    async fn insert(new: &NewProperty, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO properties
                (title, price, location_name, lat, lng, property_type,
                 vibe_features, description, geo_accuracy, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(new.price)
        .bind(&new.location_name)
        .bind(new.lat)
        .bind(new.lng)
        .bind(new.property_type.as_str())
        .bind(new.vibe_features.join(", "))
        .bind(&new.description)
        .bind(new.geo_accuracy.as_str())
        .bind(new.status.as_str())
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Persistence boundary: single attempt, no retry. A store failure is
    /// logged and surfaced as `None`; the caller decides whether the lost
    /// record is worth resubmitting.
    pub async fn save(new: &NewProperty, pool: &PgPool) -> Option<Self> {
        match Self::insert(new, pool).await {
            Ok(property) => Some(property),
            Err(e) => {
                warn!(title = new.title.as_str(), error = %e, "Failed to save property");
                None
            }
        }
    }
}

/// One tag with its frequency across records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub value: String,
    pub count: i64,
}
