//! HTML pages.

use axum::response::{Html, IntoResponse};

use super::super::templates;

/// Upload page.
pub async fn upload_page() -> impl IntoResponse {
    Html(templates::base_template(&templates::upload_form()))
}
