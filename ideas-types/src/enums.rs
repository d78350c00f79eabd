use serde::{Deserialize, Serialize};

/// State of a friendship edge. A rejected request is deleted, so it has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    #[default]
    Pending,
    Accepted,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(FriendshipStatus::Pending),
            "accepted" => Some(FriendshipStatus::Accepted),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(FriendshipStatus::parse("Accepted"), Some(FriendshipStatus::Accepted));
        assert_eq!(FriendshipStatus::parse("PENDING"), Some(FriendshipStatus::Pending));
        assert_eq!(FriendshipStatus::parse("rejected"), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&FriendshipStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
        assert_eq!(FriendshipStatus::default().as_str(), "pending");
    }
}
