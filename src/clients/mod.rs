use std::time::Duration;

use log::debug;

/// Artwork download and decoding
pub mod artwork;
/// Music catalog search client
pub mod catalog;
/// Data entities for search results
pub mod entities;
/// Error types and result aliases
pub mod errors;

pub use artwork::{Artwork, ArtworkClient};
pub use catalog::CatalogClient;
pub use entities::{SearchResponse, TrackRecord};

use errors::{Error, Result};

/// Environment variable overriding the catalog base URL
pub const CATALOG_URL_ENV: &str = "TUNELIST_CATALOG_URL";
/// Environment variable setting a request timeout in seconds
pub const HTTP_TIMEOUT_ENV: &str = "TUNELIST_HTTP_TIMEOUT_SECS";

// Read an optional environment variable; unset is not an error, non-unicode is
pub(crate) fn optional_var(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Build an HTTP client honouring [`HTTP_TIMEOUT_ENV`].
///
/// Without a configured timeout the reqwest default applies.
pub fn http_client_from_env() -> Result<reqwest::Client> {
    http_client_from_vars(optional_var)
}

pub(crate) fn http_client_from_vars(
    vars: impl Fn(&str) -> Result<Option<String>>,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout_from_vars(vars)? {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

fn timeout_from_vars(vars: impl Fn(&str) -> Result<Option<String>>) -> Result<Option<Duration>> {
    let Some(secs) = vars(HTTP_TIMEOUT_ENV)? else {
        return Ok(None);
    };
    let secs: u64 = secs.trim().parse()?;
    // a zero timeout fails every request
    if secs == 0 {
        return Err(Error::ConfigurationError(format!(
            "{HTTP_TIMEOUT_ENV} must be at least 1 second"
        )));
    }
    debug!("Using HTTP timeout of {secs}s");
    Ok(Some(Duration::from_secs(secs)))
}
