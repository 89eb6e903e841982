//! HTTP request handlers.
//!
//! - [`files`]: multipart file upload handling
//!
//! Static file serving has no handler module of its own: it is delegated to
//! `tower_http::services::ServeDir` as the router fallback.

pub mod files;
