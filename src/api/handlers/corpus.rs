//! Corpus analytics: statistics, recent acts and topic browsing.

use crate::{
    AppState,
    corpus::{
        act_statistics, recent_acts,
        stats::ActSummary,
        topics::{acts_in_category, category_counts, CategoryActs, CategoryCount},
        CorpusStats,
    },
    types::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LimitQuery {
    /// Maximum number of acts to return (default 10, at most 100)
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }
}

/// Corpus statistics
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Corpus statistics", body = CorpusStats)
    ),
    tag = "corpus"
)]
pub async fn stats(State(state): State<AppState>) -> Json<CorpusStats> {
    let acts = state.acts.read();
    Json(act_statistics(&acts, state.assistant.document_count()))
}

/// Most recent acts by year
#[utoipa::path(
    get,
    path = "/api/acts/recent",
    params(LimitQuery),
    responses(
        (status = 200, description = "Acts, newest first", body = Vec<ActSummary>)
    ),
    tag = "corpus"
)]
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<ActSummary>> {
    let acts = state.acts.read();
    Json(
        recent_acts(&acts, query.limit())
            .into_iter()
            .map(ActSummary::from)
            .collect(),
    )
}

/// Act counts per area of law
#[utoipa::path(
    get,
    path = "/api/topics",
    responses(
        (status = 200, description = "Topic categories", body = Vec<CategoryCount>)
    ),
    tag = "corpus"
)]
pub async fn topics(State(state): State<AppState>) -> Json<Vec<CategoryCount>> {
    Json(category_counts(&state.acts.read()))
}

/// Acts in one area of law
#[utoipa::path(
    get,
    path = "/api/topics/{name}",
    params(
        ("name" = String, Path, description = "Category name or slug, e.g. `criminal`"),
        LimitQuery
    ),
    responses(
        (status = 200, description = "Matching acts", body = CategoryActs),
        (status = 404, description = "Unknown category")
    ),
    tag = "corpus"
)]
pub async fn topic(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<CategoryActs>> {
    let acts = state.acts.read();
    Ok(Json(acts_in_category(&acts, &name, query.limit())?))
}
