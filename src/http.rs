//! HTTP access to the version config and jenkins endpoints.

/// reqwest implementation of [`traits::HttpClient`].
pub mod client;

/// Trait describing the single request shape the release flow makes.
pub mod traits;
