//! Tour route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::tours::requests::{
    AddNightOptionRequest, ConfirmNightsRequest, CurrencyQuery, QuoteQuery,
    RemoveNightOptionRequest, UploadImagesRequest,
};
use crate::tours::responses::{
    ImageUploadResponse, QuoteResponse, TourDetailResponse, TourSummaryResponse,
};
use crate::tours::{
    add_night_option, compute_total, confirm_nights, default_selection, listing_quote,
    remove_night_option, validate_tour, RateTable, SelectionState, TourDefinition,
};
use crate::validation::{ValidationError, ValidationResult};
use crate::AppState;

/// Load a tour through the cache
async fn load_tour(state: &AppState, id: Uuid) -> Result<Arc<TourDefinition>> {
    if let Some(cached) = state.cache.tours.get(&id).await {
        tracing::debug!("Cache HIT for tour: {}", id);
        return Ok(cached);
    }

    tracing::debug!("Cache MISS for tour: {}", id);
    let tour = Arc::new(db::get_tour(&state.db, id).await?);
    state.cache.tours.insert(id, Arc::clone(&tour)).await;
    Ok(tour)
}

/// Load all tours through the cache
async fn load_listing(state: &AppState) -> Result<Arc<Vec<Arc<TourDefinition>>>> {
    if let Some(cached) = state.cache.listing().await {
        tracing::debug!("Cache HIT for tour listing");
        return Ok(cached);
    }

    tracing::debug!("Cache MISS for tour listing");
    let tours: Vec<Arc<TourDefinition>> = db::list_tours(&state.db)
        .await?
        .into_iter()
        .map(Arc::new)
        .collect();
    state.cache.set_listing(tours.clone()).await;
    Ok(Arc::new(tours))
}

async fn load_rates(state: &AppState) -> Arc<RateTable> {
    state
        .rates
        .get_rates(&state.cache, &state.config.base_currency)
        .await
}

fn display_currency(state: &AppState, requested: Option<String>) -> String {
    requested
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_else(|| state.config.base_currency.clone())
}

/// GET /tours
pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<Vec<TourSummaryResponse>>> {
    let (tours, rates) = tokio::join!(load_listing(&state), load_rates(&state));
    let tours = tours?;
    let currency = display_currency(&state, query.currency);
    let today = Utc::now().date_naive();

    let cards = tours
        .iter()
        .map(|tour| TourSummaryResponse {
            id: tour.id,
            title: tour.title.clone(),
            country: tour.country.clone(),
            cover_image: tour.tour_images.first().cloned(),
            available_meal_plans: tour.meal_categories.available_count(),
            bookable: tour.is_bookable(today),
            quote: QuoteResponse::new(listing_quote(tour), &rates, &currency),
        })
        .collect();

    Ok(Json(cards))
}

/// GET /tours/:id
pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<TourDetailResponse>> {
    let (tour, rates) = tokio::join!(load_tour(&state, id), load_rates(&state));
    let tour = tour?;
    let currency = display_currency(&state, query.currency);

    let mut selection = SelectionState::new();
    selection.sync(&tour);
    let quote = compute_total(&tour, selection.selection());

    Ok(Json(TourDetailResponse {
        selection: selection.selection().clone(),
        available_meal_plans: tour.meal_categories.available_count(),
        bookable: tour.is_bookable(Utc::now().date_naive()),
        quote: QuoteResponse::new(quote, &rates, &currency),
        tour: (*tour).clone(),
    }))
}

/// GET /tours/:id/quote
///
/// Without any selection parameter the tour's default selection is priced.
pub async fn quote_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>> {
    let (tour, rates) = tokio::join!(load_tour(&state, id), load_rates(&state));
    let tour = tour?;

    let selection = if query.is_empty() {
        default_selection(&tour)
    } else {
        query.selection()
    };
    let currency = display_currency(&state, query.currency);

    Ok(Json(QuoteResponse::new(
        compute_total(&tour, &selection),
        &rates,
        &currency,
    )))
}

/// POST /tours
///
/// Always creates a new tour; an `id` in the body is ignored.
pub async fn create_tour(
    State(state): State<AppState>,
    Json(tour): Json<TourDefinition>,
) -> Result<(StatusCode, Json<TourDefinition>)> {
    validate_tour(&tour).into_result()?;

    let tour = tour.into_new(Utc::now());
    db::save_tour(&state.db, &tour).await?;
    state.cache.invalidate_tour(tour.id).await;

    tracing::info!(tour_id = %tour.id, title = %tour.title, "Tour created");
    Ok((StatusCode::CREATED, Json(tour)))
}

/// PUT /tours/:id
pub async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut tour): Json<TourDefinition>,
) -> Result<Json<TourDefinition>> {
    validate_tour(&tour).into_result()?;

    let existing = load_tour(&state, id).await?;
    tour.id = id;
    tour.created_at = existing.created_at;
    tour.updated_at = Utc::now();
    db::update_tour(&state.db, &tour).await?;
    state.cache.invalidate_tour(id).await;

    tracing::info!(tour_id = %id, "Tour updated");
    Ok(Json(tour))
}

/// DELETE /tours/:id
pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    db::delete_tour(&state.db, id).await?;
    state.cache.invalidate_tour(id).await;

    tracing::info!(tour_id = %id, "Tour deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /tours/draft/nights
pub async fn draft_nights(Json(request): Json<ConfirmNightsRequest>) -> Result<Json<TourDefinition>> {
    let nights = request.bounded_nights()?;
    Ok(Json(confirm_nights(request.tour, nights)?))
}

/// POST /tours/draft/options
pub async fn draft_add_option(
    Json(request): Json<AddNightOptionRequest>,
) -> Result<Json<TourDefinition>> {
    Ok(Json(add_night_option(request.tour, request.option)?))
}

/// POST /tours/draft/options/remove
pub async fn draft_remove_option(
    Json(request): Json<RemoveNightOptionRequest>,
) -> Json<TourDefinition> {
    Json(remove_night_option(request.tour, request.nights, request.index))
}

/// POST /tours/draft/validate
pub async fn draft_validate(Json(tour): Json<TourDefinition>) -> Json<ValidationResult> {
    Json(validate_tour(&tour))
}

/// POST /tours/images
///
/// Every image gets an entry; failed uploads carry an error message instead
/// of a URL.
pub async fn upload_images(
    State(state): State<AppState>,
    Json(request): Json<UploadImagesRequest>,
) -> Result<Json<Vec<ImageUploadResponse>>> {
    if request.images.is_empty() {
        return Err(ValidationError::single("images", "Please select at least one image.").into());
    }

    let results = state.uploader.upload_batch(&request.images).await;
    let responses = results
        .into_iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(url) => ImageUploadResponse {
                index,
                url: Some(url),
                error: None,
            },
            Err(e) => ImageUploadResponse {
                index,
                url: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok(Json(responses))
}
