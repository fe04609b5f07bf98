use crate::core::ratings::RatingPolicy;
use crate::core::selector::{SelectedPlace, SelectionError, Selector};
use crate::models::{
    Coordinate, ErrorResponse, HealthResponse, NearbyRequest, NearbyResponse, PlaceStatus,
    ResolveQuery, ResolveResponse, SubmitRatingRequest, SubmitRatingResponse,
};
use crate::services::{AggregatorError, DirectoryMirror, RatingAggregator};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub mirror: Arc<DirectoryMirror>,
    pub aggregator: Arc<RatingAggregator>,
    pub selector: Selector,
    pub default_center: Coordinate,
}

/// Configure all place-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/places/nearby", web::post().to(nearby))
        .route("/places/resolve", web::get().to(resolve))
        .route("/places/{id}/rating", web::post().to(submit_rating))
        .route("/places/{id}/status", web::get().to(place_status));
}

/// Health check endpoint
///
/// Reports degraded until the mirror has received its first snapshot.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.mirror.has_snapshot() {
        "healthy"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Reference point for a nearby selection: the request's coordinate when
/// fully given, the configured default center otherwise
fn reference_or_default(req: &NearbyRequest, default_center: Coordinate) -> Coordinate {
    match (req.latitude, req.longitude) {
        (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude),
        _ => default_center,
    }
}

fn build_status(selected: &SelectedPlace, policy: &RatingPolicy) -> PlaceStatus {
    let place = &selected.place;
    PlaceStatus {
        id: place.id.clone(),
        name: place.name.clone(),
        latitude: place.latitude,
        longitude: place.longitude,
        category_tags: place.category_tags.clone(),
        distance_km: selected.distance_km,
        rating: place.aggregate(),
        rating_count: place.rating_count,
        band: policy.band_for(place),
        display_value: policy.normalized_value(place),
    }
}

/// Nearby selection endpoint
///
/// POST /api/v1/places/nearby
///
/// Request body:
/// ```json
/// {
///   "latitude": 34.0689,
///   "longitude": -118.4452,
///   "previousIds": ["string"]
/// }
/// ```
///
/// `previousIds` is the caller's selection so far; the response merges in
/// newly discovered places without dropping carried ones.
async fn nearby(
    state: web::Data<AppState>,
    req: web::Json<NearbyRequest>,
) -> impl Responder {
    let reference = reference_or_default(&req, state.default_center);
    let snapshot = state.mirror.current();

    let result = match state.selector.select(reference, &snapshot, &req.previous_ids) {
        Ok(result) => result,
        Err(e @ SelectionError::InvalidCoordinate { .. }) => {
            tracing::info!("Rejected nearby request: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_coordinate".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "selection_failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let policy = state.aggregator.policy();
    let places: Vec<PlaceStatus> = result
        .places
        .iter()
        .map(|selected| build_status(selected, policy))
        .collect();

    tracing::debug!(
        "Nearby selection at ({}, {}): {} places (catalog {})",
        reference.latitude,
        reference.longitude,
        places.len(),
        result.total_catalog
    );

    HttpResponse::Ok().json(NearbyResponse {
        places,
        total_catalog: result.total_catalog,
    })
}

/// Name resolution endpoint
///
/// GET /api/v1/places/resolve?name=Powell%20Library
///
/// Resolves a place name to its coordinate so the caller can re-center a
/// nearby selection there.
async fn resolve(
    state: web::Data<AppState>,
    query: web::Query<ResolveQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let snapshot = state.mirror.current();

    match state.selector.resolve_by_name(&query.name, &snapshot) {
        Ok(place) => HttpResponse::Ok().json(ResolveResponse {
            id: place.id.clone(),
            name: place.name.clone(),
            coordinate: place.coordinate(),
        }),
        Err(e @ SelectionError::NotFound(_)) => {
            tracing::info!("Name resolution miss: {}", query.name);
            HttpResponse::NotFound().json(ErrorResponse {
                error: "not_found".to_string(),
                message: e.to_string(),
                status_code: 404,
            })
        }
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: "resolution_failed".to_string(),
            message: e.to_string(),
            status_code: 500,
        }),
    }
}

/// Rating submission endpoint
///
/// POST /api/v1/places/{id}/rating
///
/// Request body:
/// ```json
/// {
///   "raterId": "string",
///   "value": 4
/// }
/// ```
async fn submit_rating(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<SubmitRatingRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rating submission: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_rating_value".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let place_id = path.into_inner();

    match state
        .aggregator
        .submit_rating(&place_id, req.rater_id.clone(), req.value)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(SubmitRatingResponse {
            success: true,
            event_id: uuid::Uuid::new_v4().to_string(),
            rating: outcome.rating,
            rating_count: outcome.rating_count,
        }),
        Err(e @ AggregatorError::Rating(_)) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_rating_value".to_string(),
            message: e.to_string(),
            status_code: 400,
        }),
        Err(e @ AggregatorError::UnknownPlace(_)) => {
            HttpResponse::NotFound().json(ErrorResponse {
                error: "not_found".to_string(),
                message: e.to_string(),
                status_code: 404,
            })
        }
        Err(e @ AggregatorError::Store(_)) => {
            tracing::error!("Rating write failed for {}: {}", place_id, e);
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "store_unavailable".to_string(),
                message: e.to_string(),
                status_code: 502,
            })
        }
    }
}

/// Per-place status endpoint
///
/// GET /api/v1/places/{id}/status
///
/// Returns the current aggregate, band and display value for one place.
async fn place_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let place_id = path.into_inner();
    let snapshot = state.mirror.current();

    let place = match snapshot.get(&place_id) {
        Some(place) => place,
        None => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "not_found".to_string(),
                message: format!("no place with id {}", place_id),
                status_code: 404,
            });
        }
    };

    let policy = state.aggregator.policy();

    HttpResponse::Ok().json(serde_json::json!({
        "id": place.id,
        "name": place.name,
        "rating": place.aggregate(),
        "ratingCount": place.rating_count,
        "band": policy.band_for(place),
        "displayValue": policy.normalized_value(place),
        "updatedAt": place.updated_at,
    }))
}
