//! Core data models for the video-hosting service.
//!
//! These entities represent registered users and their uploaded videos.
//! They map cleanly to database tables via `sqlx::FromRow` and serialize
//! naturally as JSON via `serde`.

pub mod user;
pub mod video;
