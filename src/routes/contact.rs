//! Contact form route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::contact::{ContactSubmission, NewContact};
use crate::db;
use crate::error::Result;
use crate::inquiries::{validate_reply, InquiryReply, NewReply};
use crate::AppState;

/// POST /contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(contact): Json<NewContact>,
) -> Result<(StatusCode, Json<ContactSubmission>)> {
    let submission = ContactSubmission::from_new(contact, Utc::now())?;
    db::create_contact(&state.db, &submission).await?;

    tracing::info!(submission_id = %submission.id, "Contact form submitted");
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /contact/inquiries
pub async fn list_contacts(State(state): State<AppState>) -> Result<Json<Vec<ContactSubmission>>> {
    Ok(Json(db::list_contacts(&state.db).await?))
}

/// DELETE /contact/inquiries/:id
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    db::delete_contact(&state.db, id).await?;
    tracing::info!(submission_id = %id, "Contact submission deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /contact/inquiries/:id/reply
pub async fn reply_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(reply): Json<NewReply>,
) -> Result<(StatusCode, Json<InquiryReply>)> {
    validate_reply(&reply)?;
    let reply = InquiryReply::new(reply, Utc::now());
    db::attach_contact_reply(&state.db, id, &reply).await?;

    tracing::info!(submission_id = %id, "Contact reply recorded");
    Ok((StatusCode::CREATED, Json(reply)))
}
