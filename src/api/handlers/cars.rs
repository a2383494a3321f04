//! Handlers for the public car catalogue.

use axum::{Json, extract::State};
use tracing::{debug, error, warn};

use crate::api::dto::car::{CarListQuery, CarResponse};
use crate::api::dto::pagination::Paginated;
use crate::api::extract::{ApiPath, ApiQuery};
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Lists cars, newest first, each with its images.
///
/// # Endpoint
///
/// `GET /api/cars`
///
/// # Query Parameters
///
/// - `page` - page number, starting at 1 (default: 1)
/// - `page_size` - items per page (default: 10, max: 100)
/// - `brand`, `car_type`, `transmission`, `fuel_type` - exact match, case-insensitive
/// - `is_available` - `true` or `false`
/// - `search` - substring of name or brand
///
/// # Cache Strategy
///
/// Pages are cached under a key built from every query parameter for
/// `CACHE_TTL_SECONDS`. Car mutations drop all cached pages.
///
/// - **Cache hit**: Cached page is returned
/// - **Cache miss**: Query DB, spawn async cache write
/// - **Cache error or unreadable entry**: Log and fall back to DB
///
/// # Errors
///
/// Returns 404 Not Found for a page past the end.
pub async fn car_list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CarListQuery>,
) -> Result<Json<Paginated<CarResponse>>, AppError> {
    let page = query.pagination.resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let cache_key = query.cache_key(&page);

    match state.cache.get(&cache_key).await {
        Ok(Some(cached)) => match serde_json::from_str::<Paginated<CarResponse>>(&cached) {
            Ok(body) => {
                debug!("Cache HIT for {}", cache_key);
                return Ok(Json(body));
            }
            Err(e) => warn!(error = %e, cache_key, "Unreadable cache entry"),
        },
        Ok(None) => debug!("Cache MISS for {}", cache_key),
        Err(e) => error!("Cache error: {}", e),
    }

    let (cars, total) = state.car_service.list(query.to_filter(&page)).await?;
    let body = Paginated::new(
        page,
        total,
        cars.into_iter().map(CarResponse::from).collect(),
    )?;

    match serde_json::to_string(&body) {
        Ok(serialized) => {
            let cache = state.cache.clone();
            let ttl = state.cache_ttl_seconds;
            tokio::spawn(async move {
                if let Err(e) = cache.set(&cache_key, &serialized, Some(ttl)).await {
                    error!("Failed to cache car list: {}", e);
                }
            });
        }
        Err(e) => error!(error = %e, "Failed to serialize car list for cache"),
    }

    Ok(Json(body))
}

/// Returns a single car with its images.
///
/// # Endpoint
///
/// `GET /api/cars/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the car does not exist.
pub async fn car_detail_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<CarResponse>, AppError> {
    let car = state.car_service.get(id).await?;
    Ok(Json(CarResponse::from(car)))
}
