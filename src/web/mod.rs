//! Web API module for the shade catalog.
//!
//! This module exposes the catalog operations over HTTP so the data-entry
//! frontend can trigger rebuilds and submit shades.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api/build-product-database` - Rebuild a category taxonomy
//! - `POST /api/add-to-product-database` - Insert shades into a stored taxonomy
//! - `GET /api/product-database/{category}` - Fetch a stored taxonomy
//! - `POST /api/generate-all-data` - Regenerate the brand index
//! - `POST /api/update-all-data` - Register one product in the brand index

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::CatalogError;
use crate::models::{ProductCategory, ShadeRecord};
use crate::services::{
    BuildReport, CatalogBuilder, CatalogService, ConsideredProduct, RebuildOptions,
    RebuildSummary,
};
use crate::store::{BlobStore, FsBlobStore};
use crate::taxonomy::Taxonomy;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    config: Arc<Config>,
    /// Catalog operations over the configured store
    service: CatalogService,
}

impl AppState {
    /// Creates a state over a filesystem store rooted at `store_root`.
    pub fn new(config: Config, store_root: PathBuf) -> anyhow::Result<Self> {
        config.validate()?;
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(store_root));
        Ok(Self::with_store(config, store))
    }

    /// Creates a state over any store.
    pub fn with_store(config: Config, store: Arc<dyn BlobStore>) -> Self {
        let builder = CatalogBuilder::new(
            crate::classifier::Classifier::default(),
            config.price_buckets(),
            config.backfill.min_per_bucket,
        );
        let service = CatalogService::new(store, builder, config.source.data_prefix.clone());
        Self {
            config: Arc::new(config),
            service,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Rebuild request body.
#[derive(Debug, Deserialize)]
pub struct BuildRequest {
    /// Category id
    #[serde(default)]
    pub category: Option<String>,
    /// Reclassify already catalogued products
    #[serde(default)]
    pub full: bool,
    /// Write the result back to the store
    #[serde(default)]
    pub publish: bool,
}

/// Rebuild response.
#[derive(Debug, Serialize)]
pub struct BuildResponse {
    /// Always true
    pub success: bool,
    /// Suggested download file name
    pub filename: String,
    /// Store key the taxonomy belongs at
    pub target_key_if_uploaded: String,
    /// Whether the taxonomy was written
    pub published: bool,
    /// When the build finished
    pub generated_at: DateTime<Utc>,
    /// Products that fed the build
    pub considered: Vec<ConsideredProduct>,
    /// Totals
    pub summary: RebuildSummary,
    /// Builder counters
    pub build: BuildReport,
    /// The merged, backfilled taxonomy
    pub dict: Taxonomy,
}

/// Add-shades request body.
#[derive(Debug, Deserialize)]
pub struct AddShadesRequest {
    /// Category id of the taxonomy to update
    #[serde(default)]
    pub product_category: Option<String>,
    /// Shade records
    #[serde(default)]
    pub shades: Option<Value>,
}

/// Add-shades response.
#[derive(Debug, Serialize)]
pub struct AddShadesResponse {
    /// Always true
    pub success: bool,
    /// Store key that was written
    pub key: String,
    /// Entries appended
    pub added: usize,
    /// Records that could not be read
    pub rejected: usize,
    /// Records skipped for an invalid hex color
    pub invalid_hex: usize,
}

/// Brand index response.
#[derive(Debug, Serialize)]
pub struct BrandIndexResponse {
    /// Always true
    pub success: bool,
    /// Brands written
    pub brands: usize,
}

/// Brand index update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateAllDataRequest {
    /// Brand name
    #[serde(default)]
    pub brand: Option<String>,
    /// Product name
    #[serde(default)]
    pub product: Option<String>,
    /// Product type, e.g. `"Face"`
    #[serde(default, rename = "type")]
    pub product_type: Option<String>,
}

/// Brand index update response.
#[derive(Debug, Serialize)]
pub struct UpdateAllDataResponse {
    /// Always true
    pub success: bool,
    /// False when the product was already listed
    pub added: bool,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn bad_request(error: ApiError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(error))
}

/// Maps core errors to HTTP statuses: input problems are 400, the rest 500.
fn catalog_error(context: &str, err: &CatalogError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        CatalogError::InvalidHex { .. }
        | CatalogError::UnclassifiableDepth { .. }
        | CatalogError::Configuration(_) => StatusCode::BAD_REQUEST,
        CatalogError::LoadFailure { .. }
        | CatalogError::Store(_)
        | CatalogError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!("{context}: {err}");
    }
    (status, Json(ApiError::with_details(context, err.to_string())))
}

fn join_error(err: &tokio::task::JoinError) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::with_details("Background task failed", err.to_string())),
    )
}

// ============================================================================
// Path Validation (Security)
// ============================================================================

/// Validates a category id before it becomes part of a store key.
fn validate_category(category: &str) -> Result<ProductCategory, ApiError> {
    if category.is_empty() {
        return Err(ApiError::new("Category cannot be empty"));
    }

    // Reject path traversal attempts
    if category.contains("..") || category.contains('/') || category.contains('\\') {
        return Err(ApiError::new(
            "Invalid category: path traversal not allowed",
        ));
    }

    // Reject hidden names
    if category.starts_with('.') {
        return Err(ApiError::new("Invalid category: hidden names not allowed"));
    }

    ProductCategory::parse(category)
        .map_err(|e| ApiError::with_details("Invalid category", e.to_string()))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/build-product-database - Rebuild a category.
async fn build_product_database(
    State(state): State<AppState>,
    Json(request): Json<BuildRequest>,
) -> ApiResult<BuildResponse> {
    let category = request
        .category
        .as_deref()
        .ok_or_else(|| bad_request(ApiError::new("Missing 'category'")))
        .and_then(|c| validate_category(c).map_err(bad_request))?;

    let options = RebuildOptions {
        full: request.full,
        publish: request.publish,
    };
    let service = state.service.clone();
    let report = tokio::task::spawn_blocking(move || service.rebuild(&category, options))
        .await
        .map_err(|e| join_error(&e))?
        .map_err(|e| catalog_error("Failed to build product database", &e))?;

    Ok(Json(BuildResponse {
        success: true,
        filename: report.filename,
        target_key_if_uploaded: report.target_key,
        published: report.published,
        generated_at: report.generated_at,
        considered: report.considered,
        summary: report.summary,
        build: report.build,
        dict: report.taxonomy,
    }))
}

/// POST /api/add-to-product-database - Insert shades into a stored taxonomy.
async fn add_to_product_database(
    State(state): State<AppState>,
    Json(request): Json<AddShadesRequest>,
) -> ApiResult<AddShadesResponse> {
    let (Some(category), Some(shades @ Value::Array(_))) =
        (request.product_category.as_deref(), request.shades.as_ref())
    else {
        return Err(bad_request(ApiError::new(
            "Missing or invalid 'product_category' or 'shades'.",
        )));
    };

    let category = validate_category(category).map_err(bad_request)?;
    let (records, rejected): (Vec<ShadeRecord>, usize) = ShadeRecord::parse_batch(shades)
        .map_err(|e| catalog_error("Invalid shades", &e))?;

    let service = state.service.clone();
    let report = tokio::task::spawn_blocking(move || service.add_shades(&category, &records))
        .await
        .map_err(|e| join_error(&e))?
        .map_err(|e| catalog_error("Product database update failed", &e))?;

    Ok(Json(AddShadesResponse {
        success: true,
        key: report.key,
        added: report.added,
        rejected,
        invalid_hex: report.build.invalid_hex,
    }))
}

/// GET /api/product-database/{category} - Fetch a stored taxonomy.
async fn get_product_database(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Taxonomy> {
    let category = validate_category(&category).map_err(bad_request)?;

    let service = state.service.clone();
    let lookup = {
        let category = category.clone();
        tokio::task::spawn_blocking(move || service.load_taxonomy(&category))
            .await
            .map_err(|e| join_error(&e))?
    };

    match lookup {
        Ok(Some(taxonomy)) => Ok(Json(taxonomy)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new(format!(
                "No product database for '{category}'"
            ))),
        )),
        Err(e) => Err(catalog_error("Failed to load product database", &e)),
    }
}

/// POST /api/generate-all-data - Regenerate the brand index.
async fn generate_all_data(State(state): State<AppState>) -> ApiResult<BrandIndexResponse> {
    let service = state.service.clone();
    let document = tokio::task::spawn_blocking(move || service.write_brand_index())
        .await
        .map_err(|e| join_error(&e))?
        .map_err(|e| catalog_error("Failed to generate all-data.json", &e))?;

    Ok(Json(BrandIndexResponse {
        success: true,
        brands: document.as_object().map_or(0, serde_json::Map::len),
    }))
}

/// POST /api/update-all-data - Register one product under its brand.
async fn update_all_data(
    State(state): State<AppState>,
    Json(request): Json<UpdateAllDataRequest>,
) -> ApiResult<UpdateAllDataResponse> {
    let present = |field: Option<String>| field.filter(|value| !value.trim().is_empty());
    let (Some(brand), Some(product), Some(product_type)) = (
        present(request.brand),
        present(request.product),
        present(request.product_type),
    ) else {
        return Err(bad_request(ApiError::new(
            "Missing 'brand', 'product' or 'type'.",
        )));
    };

    let service = state.service.clone();
    let added = tokio::task::spawn_blocking(move || {
        service.register_product(&brand, &product, &product_type)
    })
    .await
    .map_err(|e| join_error(&e))?
    .map_err(|e| catalog_error("Failed to update all-data.json", &e))?;

    Ok(Json(UpdateAllDataResponse {
        success: true,
        added,
    }))
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS for the data-entry frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Catalog endpoints
        .route(
            "/api/build-product-database",
            post(build_product_database),
        )
        .route(
            "/api/add-to-product-database",
            post(add_to_product_database),
        )
        .route(
            "/api/product-database/{category}",
            get(get_product_database),
        )
        .route("/api/generate-all-data", post(generate_all_data))
        .route("/api/update-all-data", post(update_all_data))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server.
///
/// # Arguments
///
/// * `config` - Application configuration
/// * `store_root` - Root directory of the blob store
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(
    config: Config,
    store_root: PathBuf,
    addr: SocketAddr,
) -> anyhow::Result<()> {
    info!("Serving store at {}", store_root.display());
    let state = AppState::new(config, store_root)?;
    let app = create_router(state);

    info!("Starting shade catalog web server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_category_valid() {
        assert!(validate_category("lip-gloss").is_ok());
        assert!(validate_category("foundation").is_ok());
        assert!(validate_category("contour").is_ok());
    }

    #[test]
    fn test_validate_category_path_traversal() {
        assert!(validate_category("../secret").is_err());
        assert!(validate_category("foo/../bar").is_err());
        assert!(validate_category("..").is_err());
        assert!(validate_category("a\\b").is_err());
    }

    #[test]
    fn test_validate_category_hidden_and_malformed() {
        assert!(validate_category(".env").is_err());
        assert!(validate_category("").is_err());
        assert!(validate_category("Lip Gloss").is_err());
    }

    #[test]
    fn test_catalog_error_status() {
        let (status, _) = catalog_error(
            "x",
            &CatalogError::Configuration("bad".to_string()),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = catalog_error(
            "x",
            &CatalogError::LoadFailure {
                key: "k".to_string(),
                reason: "r".to_string(),
            },
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
