mod user_repository;
mod idea_repository;
mod friend_repository;

pub use user_repository::UserRepository;
pub use idea_repository::IdeaRepository;
pub use friend_repository::FriendRepository;
