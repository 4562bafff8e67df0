// GitHub REST API integration for the snapshot producer.
// Provides the authenticated client, typed endpoints, and response shapes.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
