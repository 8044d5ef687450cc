use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{auth::Identity, error::AppError, state};

#[derive(Deserialize)]
pub struct Pagination {
    page: Option<usize>,
    limit: Option<usize>,
}

pub async fn ticket_create_handler(
    State(state): State<Arc<state::State>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let ticket = state.lottery.issue_ticket(&identity.id).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn tickets_list_handler(
    State(state): State<Arc<state::State>>,
    identity: Identity,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .lottery
        .list_my_tickets(
            &identity.id,
            pagination.page.unwrap_or(1),
            pagination.limit.unwrap_or(10),
        )
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

pub async fn draw_execute_handler(
    State(state): State<Arc<state::State>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let draw = state.lottery.execute_draw(&identity).await?;
    Ok((StatusCode::CREATED, Json(draw)))
}

pub async fn draws_list_handler(
    State(state): State<Arc<state::State>>,
) -> Result<impl IntoResponse, AppError> {
    let draws = state.lottery.list_draws().await?;
    Ok((StatusCode::OK, Json(draws)))
}

pub async fn draw_results_handler(
    State(state): State<Arc<state::State>>,
    identity: Identity,
    Path(draw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = state.lottery.get_results(&draw_id, &identity.id).await?;
    Ok((StatusCode::OK, Json(results)))
}
