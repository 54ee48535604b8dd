pub mod auth;
pub mod jobs;
pub mod notifications;
pub mod users;
pub mod wallet;
