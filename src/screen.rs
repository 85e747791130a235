use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::ImageCache;
use crate::clients::{
    Artwork, ArtworkClient, CatalogClient, TrackRecord,
    errors::{FailureKind, Result},
};

/// Search term used when none is given.
pub const DEFAULT_QUERY: &str = "john williams";
/// Text shown in place of artwork that failed to load.
pub const ARTWORK_ERROR_PLACEHOLDER: &str = "There was an error loading the image.";

// Configuration for the TrackScreen struct
pub struct Config {
    pub catalog: CatalogClient,
    pub artwork: ArtworkClient,
    pub cache: Arc<ImageCache<Artwork>>,
    pub query: String,
}

pub struct ConfigBuilder {
    catalog: Option<CatalogClient>,
    artwork: Option<ArtworkClient>,
    cache: Option<Arc<ImageCache<Artwork>>>,
    query: Option<String>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            catalog: None,
            artwork: None,
            cache: None,
            query: None,
        }
    }

    #[must_use]
    pub fn catalog(mut self, catalog: CatalogClient) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn artwork(mut self, artwork: ArtworkClient) -> Self {
        self.artwork = Some(artwork);
        self
    }

    /// Share an existing cache, e.g. between screens.
    #[must_use]
    pub fn cache(mut self, cache: Arc<ImageCache<Artwork>>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        let catalog = match self.catalog {
            Some(c) => c,
            None => CatalogClient::try_default()?,
        };
        let artwork = match self.artwork {
            Some(a) => a,
            None => ArtworkClient::try_default()?,
        };
        Ok(Config {
            catalog,
            artwork,
            cache: self.cache.unwrap_or_default(),
            query: self.query.unwrap_or_else(|| DEFAULT_QUERY.to_string()),
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// What the list area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Loaded,
    /// The search succeeded with zero results.
    Empty,
    /// The search failed; the track list is empty.
    Failed(FailureKind),
}

#[derive(Debug, Clone)]
pub struct TrackList {
    pub tracks: Vec<TrackRecord>,
    pub state: ListState,
}

/// Handle to a track list load started by [`TrackScreen::on_appear`].
///
/// Dropping the handle cancels the load.
pub struct ListTask {
    token: CancellationToken,
    handle: Option<JoinHandle<Option<TrackList>>>,
}

impl ListTask {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the load. `None` if it was cancelled.
    pub async fn join(mut self) -> Option<TrackList> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(list) => list,
            Err(e) => {
                warn!("Track list task failed: {e}");
                None
            }
        }
    }
}

impl Drop for ListTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtworkState {
    Loading,
    Ready(Artwork),
    /// Download or decode failed, with the reason.
    Failed(String),
    Cancelled,
}

/// One rendered list row.
///
/// Tearing down (or dropping) a row cancels its artwork download.
pub struct Row {
    pub track_id: i64,
    pub title: String,
    pub collection: String,
    pub length: String,
    artwork: ArtworkState,
    token: CancellationToken,
    pending: Option<JoinHandle<Option<ArtworkState>>>,
}

impl Row {
    pub fn artwork(&self) -> &ArtworkState {
        &self.artwork
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the artwork download, if one is running.
    pub async fn resolve(&mut self) -> &ArtworkState {
        if let Some(handle) = self.pending.take() {
            self.artwork = match handle.await {
                Ok(Some(state)) => state,
                Ok(None) => ArtworkState::Cancelled,
                Err(e) => {
                    warn!("Artwork task for track {} failed: {e}", self.track_id);
                    ArtworkState::Failed(e.to_string())
                }
            };
        }
        &self.artwork
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }
}

impl Drop for Row {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Drives a single track list screen: one list load, one artwork load per row.
///
/// Every task the screen starts is cancelled on [`TrackScreen::teardown`] or drop.
pub struct TrackScreen {
    config: Config,
    token: CancellationToken,
}

impl TrackScreen {
    pub fn new(config: Config) -> Self {
        TrackScreen {
            config,
            token: CancellationToken::new(),
        }
    }

    pub fn cache(&self) -> &Arc<ImageCache<Artwork>> {
        &self.config.cache
    }

    /// Load the track list. Failures yield an empty list in the `Failed` state.
    pub async fn load(&self) -> TrackList {
        load_list(&self.config.catalog, &self.config.query).await
    }

    pub fn on_appear(&self) -> ListTask {
        let token = self.token.child_token();
        let task_token = token.clone();
        let catalog = self.config.catalog.clone();
        let query = self.config.query.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = task_token.cancelled() => {
                    debug!("Track list load cancelled");
                    None
                }
                list = load_list(&catalog, &query) => Some(list),
            }
        });

        ListTask {
            token,
            handle: Some(handle),
        }
    }

    pub async fn row(&self, record: &TrackRecord) -> Row {
        let token = self.token.child_token();
        let key = record.artwork_key();

        let (artwork, pending) = match self.config.cache.get(key).await {
            Some(cached) => (ArtworkState::Ready(cached), None),
            None => (
                ArtworkState::Loading,
                Some(self.spawn_artwork(key.to_string(), token.clone())),
            ),
        };

        Row {
            track_id: record.track_id,
            title: record.track_name.clone(),
            collection: record.collection_name.clone(),
            length: record.length_label(),
            artwork,
            token,
            pending,
        }
    }

    /// Rows in track order; each cache miss starts its own download.
    pub async fn rows(&self, tracks: &[TrackRecord]) -> Vec<Row> {
        join_all(tracks.iter().map(|t| self.row(t))).await
    }

    pub fn teardown(&self) {
        debug!("Tearing down track screen");
        self.token.cancel();
    }

    fn spawn_artwork(
        &self,
        url: String,
        token: CancellationToken,
    ) -> JoinHandle<Option<ArtworkState>> {
        let client = self.config.artwork.clone();
        let cache = self.config.cache.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!("Artwork load for {url} cancelled");
                    None
                }
                result = client.fetch(&url) => match result {
                    // a concurrent load may have stored the same URL first; keep that one
                    Ok(artwork) => cache
                        .insert_if_absent_unless_cancelled(url.clone(), artwork, &token)
                        .await
                        .map(ArtworkState::Ready),
                    Err(e) => {
                        warn!("Error loading artwork {url}: {e}");
                        Some(ArtworkState::Failed(e.to_string()))
                    }
                },
            }
        })
    }
}

impl Drop for TrackScreen {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn load_list(catalog: &CatalogClient, query: &str) -> TrackList {
    info!("Loading tracks for {query:?} ...");
    match catalog.load_tracks(query).await {
        Ok(tracks) if tracks.is_empty() => {
            info!("No tracks found for {query:?}");
            TrackList {
                tracks,
                state: ListState::Empty,
            }
        }
        Ok(tracks) => {
            info!("Loaded {} tracks", tracks.len());
            TrackList {
                tracks,
                state: ListState::Loaded,
            }
        }
        Err(e) => {
            warn!("Failed to load tracks: {e}");
            TrackList {
                tracks: Vec::new(),
                state: ListState::Failed(e.kind()),
            }
        }
    }
}
