use axum::{
    extract::{Path, State},
    Json,
};

use ideas_types::{CreateIdeaRequest, IdeasResponse, NewIdeaResponse};

use super::{extract::parse_id, ApiResult, FormOrJson};
use crate::state::AppState;

/// GET /all-ideas - Every idea, ascending by id
pub async fn get_all_ideas(State(state): State<AppState>) -> ApiResult<Json<IdeasResponse>> {
    let ideas = state.run_blocking(|db| Ok(db.list_ideas()?)).await?;
    Ok(Json(IdeasResponse { ideas }))
}

/// GET /my-ideas/:id - Ideas posted by one user
pub async fn get_user_ideas(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
) -> ApiResult<Json<IdeasResponse>> {
    let user_id = parse_id(&user_id_str, "user ID")?;
    tracing::debug!(user_id, "Fetching ideas for user");

    let ideas = state
        .run_blocking(move |db| Ok(db.ideas_by_user(user_id)?))
        .await?;
    Ok(Json(IdeasResponse { ideas }))
}

/// POST /post - Publish an idea
pub async fn create_idea(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<CreateIdeaRequest>,
) -> ApiResult<Json<NewIdeaResponse>> {
    let idea = state
        .run_blocking(move |db| {
            Ok(db.create_idea(payload.user_id, &payload.title, &payload.content)?)
        })
        .await?;

    tracing::info!(idea_id = idea.id, user_id = idea.user_id, "Idea saved");
    Ok(Json(NewIdeaResponse {
        new_idea: vec![idea],
    }))
}
