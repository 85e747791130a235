use log::{debug, trace};
use url::Url;

use crate::clients::{
    CATALOG_URL_ENV,
    entities::{SearchResponse, TrackRecord},
    errors::{Error, Result},
    http_client_from_vars, optional_var,
};

/// Public catalog host used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";
/// Result entity requested from the search endpoint.
pub const DEFAULT_ENTITY: &str = "song";

/// Fetches search results from the catalog `/search` endpoint.
///
/// A single GET per call, no retries. Non-2xx responses surface as
/// [`Error::NetworkFailure`], bodies that do not match [`SearchResponse`]
/// as [`Error::DecodeFailure`].
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    search_url: Url,
    entity: String,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self> {
        let mut search_url = Url::parse(base_url)?;
        search_url
            .path_segments_mut()
            .map_err(|()| Error::ConfigurationError(format!("{base_url} cannot be a base URL")))?
            .pop_if_empty()
            .push("search");
        Ok(CatalogClient {
            http,
            search_url,
            entity: DEFAULT_ENTITY.to_string(),
        })
    }

    // Create a CatalogClient from environment variables, falling back to the public catalog
    pub fn try_default() -> Result<Self> {
        Self::from_vars(optional_var)
    }

    pub(crate) fn from_vars(vars: impl Fn(&str) -> Result<Option<String>>) -> Result<Self> {
        let base_url = vars(CATALOG_URL_ENV)?.unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Self::new(http_client_from_vars(vars)?, &base_url)
    }

    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("term", query)
            .append_pair("entity", &self.entity);
        url
    }

    pub async fn load_tracks(&self, query: &str) -> Result<Vec<TrackRecord>> {
        let url = self.search_url(query);
        debug!("Loading tracks from {url} ...");
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        trace!("Catalog response: {}", String::from_utf8_lossy(&body));

        let response: SearchResponse = serde_json::from_slice(&body)?;
        debug!("Decoded {} tracks", response.results.len());
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const BODY: &str = r#"{"resultCount": 1, "results": [{
        "trackId": 7,
        "trackName": "Hedwig's Theme",
        "collectionName": "Harry Potter and the Sorcerer's Stone",
        "trackTimeMillis": 307000,
        "artworkUrl30": "https://example.com/30.jpg",
        "artworkUrl60": "https://example.com/60.jpg",
        "artworkUrl100": "https://example.com/100.jpg"
    }]}"#;

    fn client(base_url: &str) -> CatalogClient {
        CatalogClient::new(reqwest::Client::new(), base_url).unwrap()
    }

    #[test]
    fn test_search_url_encodes_term_and_entity() {
        let url = client(DEFAULT_BASE_URL).search_url("john williams");
        assert_eq!(
            url.as_str(),
            "https://itunes.apple.com/search?term=john+williams&entity=song"
        );
    }

    #[test]
    fn test_search_url_keeps_base_path() {
        let url = client("http://localhost:8080/itunes/")
            .with_entity("album")
            .search_url("a&b");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/itunes/search?term=a%26b&entity=album"
        );
    }

    #[test]
    fn test_base_url_from_environment() {
        let client = CatalogClient::from_vars(|name| {
            Ok((name == CATALOG_URL_ENV).then(|| "http://localhost:9000/".to_string()))
        })
        .unwrap();
        assert_eq!(
            client.search_url("x").as_str(),
            "http://localhost:9000/search?term=x&entity=song"
        );
    }

    #[test]
    fn test_base_url_defaults_to_public_catalog() {
        let client = CatalogClient::from_vars(|_| Ok(None)).unwrap();
        assert!(client.search_url("x").as_str().starts_with(DEFAULT_BASE_URL));
    }

    #[test]
    fn test_bad_timeout_in_environment() {
        let err = CatalogClient::from_vars(|name| {
            Ok((name == crate::clients::HTTP_TIMEOUT_ENV).then(|| "soon".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = CatalogClient::new(reqwest::Client::new(), "not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_load_tracks_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("term".into(), "john williams".into()),
                Matcher::UrlEncoded("entity".into(), "song".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let tracks = client(&server.url()).load_tracks("john williams").await.unwrap();

        mock.assert_async().await;
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].track_id, 7);
        assert_eq!(tracks[0].track_name, "Hedwig's Theme");
    }

    #[tokio::test]
    async fn test_load_tracks_missing_results_is_decode_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"resultCount": 0}"#)
            .create_async()
            .await;

        let err = client(&server.url()).load_tracks("x").await.unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
    }

    #[tokio::test]
    async fn test_load_tracks_non_json_is_decode_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client(&server.url()).load_tracks("x").await.unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
    }

    #[tokio::test]
    async fn test_load_tracks_server_error_is_network_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body(BODY)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server.url()).load_tracks("x").await.unwrap_err();
        // no retry on failure
        mock.assert_async().await;
        assert!(matches!(err, Error::NetworkFailure(_)));
    }

    #[tokio::test]
    async fn test_load_tracks_unreachable_host_is_network_failure() {
        let err = client("http://127.0.0.1:1").load_tracks("x").await.unwrap_err();
        assert!(matches!(err, Error::NetworkFailure(_)));
    }
}
