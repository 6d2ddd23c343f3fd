/// HTTP routes and handlers, public and admin.
pub mod api;
/// The comment submission pipeline.
pub mod comments;
/// Traits and types used for interacting with the database.
pub mod database;
/// The service-wide error type and its HTTP mapping.
pub mod error;
/// Banned-word censorship.
pub mod moderation;
/// Fixed-window rate limiting.
pub mod ratelimit;
/// Standings and scorer aggregation.
pub mod stats;
