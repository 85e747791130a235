//! Tunelist - search a music catalog and list the matching tracks
//!
//! This library fetches search results from the catalog API, decodes them into
//! track records and loads per-track artwork through a shared in-memory cache.

/// In-memory artwork cache
pub mod cache;
/// Client modules for the catalog API and artwork downloads
pub mod clients;
/// Track length formatting
pub mod format;
/// Screen state: list loading, rows and task cancellation
pub mod screen;
