use std::sync::Arc;

use image::DynamicImage;
use log::debug;
use url::Url;

use crate::clients::{errors::Result, http_client_from_env};

/// A decoded artwork image, ready to render.
///
/// Clones share the decoded pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Artwork {
    image: Arc<DynamicImage>,
}

impl Artwork {
    /// Decode PNG or JPEG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Artwork {
            image: Arc::new(image),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl From<DynamicImage> for Artwork {
    fn from(image: DynamicImage) -> Self {
        Artwork {
            image: Arc::new(image),
        }
    }
}

/// Downloads artwork images.
#[derive(Debug, Clone, Default)]
pub struct ArtworkClient {
    http: reqwest::Client,
}

impl ArtworkClient {
    pub fn new(http: reqwest::Client) -> Self {
        ArtworkClient { http }
    }

    pub fn try_default() -> Result<Self> {
        Ok(Self::new(http_client_from_env()?))
    }

    pub async fn fetch(&self, url: &str) -> Result<Artwork> {
        let url = Url::parse(url)?;
        debug!("Fetching artwork {url}");
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Artwork::from_bytes(&bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clients::errors::Error;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_from_bytes_png() {
        let artwork = Artwork::from_bytes(&png_bytes(60, 60)).unwrap();
        assert_eq!((artwork.width(), artwork.height()), (60, 60));
    }

    #[test]
    fn test_from_bytes_garbage() {
        let err = Artwork::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::ImageDecodeFailure(_)));
    }

    #[tokio::test]
    async fn test_fetch_decodes_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/art/60x60bb.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(png_bytes(60, 60))
            .create_async()
            .await;

        let url = format!("{}/art/60x60bb.png", server.url());
        let artwork = ArtworkClient::default().fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(artwork.width(), 60);
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.png")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing.png", server.url());
        let err = ArtworkClient::default().fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::NetworkFailure(_)));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let err = ArtworkClient::default().fetch("::nope").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
