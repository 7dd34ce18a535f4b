use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Therapist profile, owned 1:1 by a user with the therapist role.
/// `rating` and `total_reviews` are placeholders until the review system
/// lands; only seeded data populates them today.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TherapistProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub specialization: String,
    pub experience_years: i32,
    pub education: Option<String>,
    pub languages: Option<serde_json::Value>,
    pub availability: Option<serde_json::Value>,
    pub hourly_rate: Option<f64>,
    pub bio: Option<String>,
    pub verified: bool,
    pub rating: f64,
    pub total_reviews: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Optional directory filters; every one of them is ANDed onto the base
/// predicate (owning user must hold the therapist role).
#[derive(Debug, Default, Clone)]
pub struct DirectoryFilter {
    pub specialization: Option<String>,
    pub verified: Option<bool>,
    pub min_rating: Option<f64>,
}

const PROFILE_COLUMNS: &str = "t.id, t.user_id, t.first_name, t.last_name, t.license_number, \
     t.specialization, t.experience_years, t.education, t.languages, t.availability, \
     t.hourly_rate, t.bio, t.verified, t.rating, t.total_reviews, t.created_at, t.updated_at";

// NULL filter parameters fall through, so one statement covers every
// combination of filters.
const DIRECTORY_PREDICATE: &str = "u.role = 'therapist'
       AND ($1::text IS NULL OR t.specialization ILIKE '%' || $1 || '%')
       AND ($2::boolean IS NULL OR t.verified = $2)
       AND ($3::float8 IS NULL OR t.rating >= $3)";

impl TherapistProfile {
    /// Total directory matches for the given filters, recomputed per call.
    pub async fn count_directory(db: &PgPool, filter: &DirectoryFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*)
             FROM therapist_profiles t
             JOIN users u ON u.id = t.user_id
             WHERE {DIRECTORY_PREDICATE}"
        ))
        .bind(filter.specialization.as_deref())
        .bind(filter.verified)
        .bind(filter.min_rating)
        .fetch_one(db)
        .await
    }

    /// One page of the directory. A page past the end simply comes back empty.
    pub async fn list_directory(
        db: &PgPool,
        filter: &DirectoryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TherapistProfile>(&format!(
            "SELECT {PROFILE_COLUMNS}
             FROM therapist_profiles t
             JOIN users u ON u.id = t.user_id
             WHERE {DIRECTORY_PREDICATE}
             ORDER BY t.created_at DESC, t.id
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.specialization.as_deref())
        .bind(filter.verified)
        .bind(filter.min_rating)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TherapistProfile>(&format!(
            "SELECT {PROFILE_COLUMNS}
             FROM therapist_profiles t
             WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TherapistProfile>(&format!(
            "SELECT {PROFILE_COLUMNS}
             FROM therapist_profiles t
             WHERE t.user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await
    }
}
