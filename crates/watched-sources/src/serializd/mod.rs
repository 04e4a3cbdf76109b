pub mod auth;
pub mod client;
pub mod diary;

pub use client::SerializdClient;
pub use diary::{parse_latest_episode, LatestEpisode};
