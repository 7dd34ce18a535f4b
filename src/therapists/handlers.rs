use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    audit::{client_ip, AuditEvent},
    error::ApiError,
    extract::{ApiPath, ApiQuery},
    state::AppState,
    therapists::{
        dto::{PageMeta, TherapistListQuery, TherapistListResponse, TherapistResponse},
        repo::{DirectoryFilter, TherapistProfile},
    },
};

pub fn therapist_routes() -> Router<AppState> {
    Router::new()
        .route("/therapists", get(list_therapists))
        .route("/therapists/:id", get(get_therapist))
}

#[instrument(skip(state))]
pub async fn list_therapists(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<TherapistListQuery>,
) -> Result<Json<TherapistListResponse>, ApiError> {
    let page = query.page();
    let per_page = query.per_page();
    let filter = DirectoryFilter {
        specialization: query.specialization.clone(),
        verified: query.verified,
        min_rating: query.min_rating,
    };

    // Count and page are two statements over a shifting set; the metadata is
    // recomputed on every call rather than cached.
    let total = TherapistProfile::count_directory(&state.db, &filter).await?;
    let therapists =
        TherapistProfile::list_directory(&state.db, &filter, per_page, query.offset()).await?;

    info!(page, per_page, total, "therapist directory listed");
    state
        .audit
        .record(
            AuditEvent::info(format!("Therapists list requested - page {page}"))
                .endpoint("/api/therapists")
                .source_ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(TherapistListResponse {
        therapists,
        pagination: PageMeta::compute(page, per_page, total),
    }))
}

#[instrument(skip(state))]
pub async fn get_therapist(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TherapistResponse>, ApiError> {
    let therapist = TherapistProfile::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Therapist not found".into()))?;

    state
        .audit
        .record(
            AuditEvent::info(format!("Therapist profile viewed: {id}"))
                .endpoint("/api/therapists/:id")
                .source_ip(client_ip(&headers)),
        )
        .await;

    Ok(Json(TherapistResponse { therapist }))
}
