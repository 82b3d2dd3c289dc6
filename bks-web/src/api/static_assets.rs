//! Embedded static assets

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const PLACEHOLDER_COVER_SVG: &str = include_str!("../../static/images/book-placeholder.svg");

/// GET /static/images/book-placeholder.svg
///
/// Cover used for books without an Open Library cover id.
pub async fn serve_placeholder_cover() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "image/svg+xml"),
            ("cache-control", "public, max-age=86400"),
        ],
        PLACEHOLDER_COVER_SVG,
    )
        .into_response()
}
