use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Patient profile, owned 1:1 by a user with the patient role. Created by a
/// separate profile-completion flow, not by registration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PatientProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub therapy_history: Option<String>,
    pub preferences: Option<serde_json::Value>,
    pub emergency_contact: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PatientProfile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PatientProfile>(
            r#"
            SELECT id, user_id, first_name, last_name, date_of_birth, gender, location,
                   therapy_history, preferences, emergency_contact, created_at, updated_at
            FROM patient_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
    }
}
