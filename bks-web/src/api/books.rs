//! Catalog browsing endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use bks_common::db::Book;
use serde::{Deserialize, Serialize};

use crate::db::books;
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub total_books: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub books: Vec<Book>,
}

/// GET /api/books?page=N
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<BookListResponse>> {
    let total_books = books::count_books(&state.db).await?;
    let pagination = calculate_pagination(total_books, query.page);

    let books = books::list_books(&state.db, PAGE_SIZE, pagination.offset).await?;

    Ok(Json(BookListResponse {
        total_books,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        books,
    }))
}

/// GET /api/books/:guid
pub async fn get_book(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Book>> {
    books::get_book(&state.db, &guid)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Book {}", guid)))
}
