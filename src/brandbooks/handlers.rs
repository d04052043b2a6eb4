//! Brandbook handlers. All of them require an authenticated user.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::models::{
    BrandItem, BrandbookResponse, CreateBrandbookRequest, CreateFileRequest, CreateItemRequest,
    UploadedFile,
};
use super::services::BrandbooksService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /brandbooks
pub async fn list_brandbooks(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(user): AuthedUser,
) -> Result<Json<Vec<BrandbookResponse>>, ApiError> {
    let brandbooks = BrandbooksService::new(state.db.clone())
        .list_for_owner(&user.id)
        .await?;
    Ok(Json(brandbooks))
}

/// POST /brandbooks
///
/// # Request Body
/// ```json
/// { "title": "Acme", "slug": "acme", "description": "Optional" }
/// ```
///
/// The slug is derived from the title when omitted.
pub async fn create_brandbook(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(user): AuthedUser,
    Json(request): Json<CreateBrandbookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let brandbook = BrandbooksService::new(state.db.clone())
        .create(&user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(brandbook)))
}

/// GET /brandbooks/:id
pub async fn get_brandbook(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(user): AuthedUser,
    Path(brandbook_id): Path<String>,
) -> Result<Json<BrandbookResponse>, ApiError> {
    let brandbook = BrandbooksService::new(state.db.clone())
        .get_for_owner(&user.id, &brandbook_id)
        .await?;
    Ok(Json(brandbook))
}

/// DELETE /brandbooks/:id
pub async fn delete_brandbook(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(user): AuthedUser,
    Path(brandbook_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    BrandbooksService::new(state.db.clone())
        .delete(&user.id, &brandbook_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /brandbooks/:id/items
///
/// # Request Body
/// ```json
/// { "type": "colour", "name": "Primary", "link": "https://...", "colour": "#1A2B3C" }
/// ```
pub async fn add_item(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(user): AuthedUser,
    Path(brandbook_id): Path<String>,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<BrandItem>), ApiError> {
    let item = BrandbooksService::new(state.db.clone())
        .add_item(&user.id, &brandbook_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /brandbooks/:id/files
pub async fn add_file(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(user): AuthedUser,
    Path(brandbook_id): Path<String>,
    Json(request): Json<CreateFileRequest>,
) -> Result<(StatusCode, Json<UploadedFile>), ApiError> {
    let file = BrandbooksService::new(state.db.clone())
        .add_file(&user.id, &brandbook_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(file)))
}
