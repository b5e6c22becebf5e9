//! Jikan API v4 client implementation.
//!
//! This module provides a rate-limited, retry-enabled client for the three
//! Jikan endpoints the dataset needs: the genre listing, the character list
//! of an anime, and character details.

pub mod client;
pub mod rate_limiter;
pub mod transport;
pub mod types;

pub use client::{AnimeListQuery, ApiError, JikanClient, MAX_PAGE_SIZE};
pub use rate_limiter::RateLimiter;
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
pub use types::*;
