//! Tour inquiry route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::inquiries::{
    validate_reply, InquiryAdminView, InquiryRecord, InquiryReply, NewInquiry, NewReply,
};
use crate::tours::TourDefinition;
use crate::AppState;

/// POST /inquiries
///
/// The price is captured from the tour as it is at submission time.
pub async fn submit_inquiry(
    State(state): State<AppState>,
    Json(inquiry): Json<NewInquiry>,
) -> Result<(StatusCode, Json<InquiryRecord>)> {
    let tour: Option<TourDefinition> = match inquiry.tour_id {
        Some(id) => match db::get_tour(&state.db, id).await {
            Ok(tour) => Some(tour),
            Err(AppError::NotFound) => {
                tracing::warn!("Inquiry references unknown tour: {}", id);
                None
            }
            Err(e) => return Err(e),
        },
        None => None,
    };
    let rates = state
        .rates
        .get_rates(&state.cache, &state.config.base_currency)
        .await;

    let record = InquiryRecord::capture(inquiry, tour.as_ref(), &rates, Utc::now())?;
    db::create_inquiry(&state.db, &record).await?;

    tracing::info!(
        inquiry_id = %record.id(),
        tour_id = ?record.tour_id(),
        "Inquiry submitted"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /inquiries
pub async fn list_inquiries(State(state): State<AppState>) -> Result<Json<Vec<InquiryAdminView>>> {
    let (records, rates) = tokio::join!(
        db::list_inquiries(&state.db),
        state
            .rates
            .get_rates(&state.cache, &state.config.base_currency)
    );

    let views = records?
        .into_iter()
        .map(|record| InquiryAdminView::new(record, &rates))
        .collect();
    Ok(Json(views))
}

/// DELETE /inquiries/:id
pub async fn delete_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    db::delete_inquiry(&state.db, id).await?;
    tracing::info!(inquiry_id = %id, "Inquiry deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /inquiries/:id/reply
pub async fn reply_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(reply): Json<NewReply>,
) -> Result<(StatusCode, Json<InquiryReply>)> {
    validate_reply(&reply)?;
    let reply = InquiryReply::new(reply, Utc::now());
    db::attach_reply(&state.db, id, &reply).await?;

    tracing::info!(inquiry_id = %id, "Reply recorded");
    Ok((StatusCode::CREATED, Json(reply)))
}
