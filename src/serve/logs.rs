use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{history::HistoryView, lookup::HistoryPage};

use super::{ApiResponse, AppState};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Deserialize)]
pub struct Pagination {
    page: Option<i64>,
    per_page: Option<i64>,
}

impl Pagination {
    /// No upper bound, a page past the end has to come back empty.
    fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

pub async fn history(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResponse<HistoryPage> {
    state
        .lookup
        .list_history(pagination.page(), pagination.per_page())
        .await
        .map(Json)
}

pub async fn history_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResponse<HistoryView> {
    state.lookup.history_entry(id).await.map(Json)
}
