use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::FriendshipStatus;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// bcrypt hash. Never sent to clients.
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub email: String,
}

/// A user-authored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub likes: i32,
    pub views: i32,
}

/// Directed edge from the requester (`user1_id`) to the recipient (`user2_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub user1_id: i32,
    pub user2_id: i32,
    pub status: FriendshipStatus,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// True when `user_id` is either end of the edge.
    pub fn involves(&self, user_id: i32) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }
}

/// Insert payload for the users table; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub user_type: String,
    pub email: String,
}

// Request/Response types for API
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Narrows the lookup when one email is registered under several types
    #[serde(rename = "type", default)]
    pub user_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateIdeaRequest {
    pub user_id: i32,
    pub title: String,
    pub content: String,
}

/// Body of every friend-request mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FriendRequestPair {
    pub user1_id: i32,
    pub user2_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdeasResponse {
    pub ideas: Vec<Idea>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewIdeaResponse {
    #[serde(rename = "newIdea")]
    pub new_idea: Vec<Idea>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
