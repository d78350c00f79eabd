use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use ideas_types::{FriendRequestPair, Friendship};

use super::{extract::parse_id, ApiError, ApiResult, FormOrJson};
use crate::state::AppState;

fn request_not_found(pair: FriendRequestPair) -> ApiError {
    ApiError::NotFound(format!(
        "No friend request from user {} to user {}",
        pair.user1_id, pair.user2_id
    ))
}

/// POST /send-request - user1 asks user2 to be friends
pub async fn send_request(
    State(state): State<AppState>,
    FormOrJson(pair): FormOrJson<FriendRequestPair>,
) -> ApiResult<(StatusCode, Json<Friendship>)> {
    let friendship = state
        .run_blocking(move |db| Ok(db.send_request(pair.user1_id, pair.user2_id)?))
        .await?;

    tracing::info!(from = pair.user1_id, to = pair.user2_id, "Friend request sent");
    Ok((StatusCode::CREATED, Json(friendship)))
}

/// POST /accept-request - Mark the request from user1 to user2 accepted
pub async fn accept_request(
    State(state): State<AppState>,
    FormOrJson(pair): FormOrJson<FriendRequestPair>,
) -> ApiResult<Json<Friendship>> {
    let friendship = state
        .run_blocking(move |db| Ok(db.accept_request(pair.user1_id, pair.user2_id)?))
        .await?
        .ok_or_else(|| request_not_found(pair))?;

    Ok(Json(friendship))
}

/// POST /reject-request - Delete the request (or friendship) from user1 to user2
pub async fn reject_request(
    State(state): State<AppState>,
    FormOrJson(pair): FormOrJson<FriendRequestPair>,
) -> ApiResult<Json<Friendship>> {
    let friendship = state
        .run_blocking(move |db| Ok(db.reject_request(pair.user1_id, pair.user2_id)?))
        .await?
        .ok_or_else(|| request_not_found(pair))?;

    Ok(Json(friendship))
}

/// GET /friends/:user_id - Accepted friendships in either direction
pub async fn get_friends(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
) -> ApiResult<Json<Vec<Friendship>>> {
    let user_id = parse_id(&user_id_str, "user ID")?;
    let friends = state
        .run_blocking(move |db| Ok(db.friends_of(user_id)?))
        .await?;
    Ok(Json(friends))
}

/// GET /pending-requests/:user_id - Requests this user sent that await an answer
pub async fn get_pending_requests(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
) -> ApiResult<Json<Vec<Friendship>>> {
    let user_id = parse_id(&user_id_str, "user ID")?;
    let pending = state
        .run_blocking(move |db| Ok(db.pending_sent(user_id)?))
        .await?;
    Ok(Json(pending))
}

/// GET /received-requests/:user_id
pub async fn get_received_requests(
    State(state): State<AppState>,
    Path(user_id_str): Path<String>,
) -> ApiResult<Json<Vec<Friendship>>> {
    let user_id = parse_id(&user_id_str, "user ID")?;
    let received = state
        .run_blocking(move |db| Ok(db.pending_received(user_id)?))
        .await?;
    Ok(Json(received))
}
