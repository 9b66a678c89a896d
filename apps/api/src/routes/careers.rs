use axum::Json;

use crate::catalog::{CareerCategory, CATEGORIES};

/// GET /api/v1/careers
/// Lists every category with its roles, in display order.
pub async fn careers_handler() -> Json<&'static [CareerCategory]> {
    Json(CATEGORIES)
}
