use std::fmt;

use scraper::Html;
use url::Url;

use crate::extract::{self, ResolveError};
use crate::fetch::{FetchError, FetchResponse, Fetcher, HttpFetcher};
use crate::models::{ComicImage, ComicRequest, RetrieveMode};

const HTTP_OK: u16 = 200;

// ── Error type ───────────────────────────────────────────────────────────────

/// Which of the two downloads failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Page,
    Image,
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Page => f.write_str("HTML"),
            FetchTarget::Image => f.write_str("image"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComicError {
    #[error("invalid comic name {0:?}")]
    InvalidStrip(String),
    #[error("invalid date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("failed to fetch {target} from {url}: {source}")]
    Transport {
        target: FetchTarget,
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to fetch {target}: status code {status} for {url}. Body: {body}")]
    Status {
        target: FetchTarget,
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to extract image URL from HTML of {url}: {source}")]
    Extract {
        url: String,
        #[source]
        source: ResolveError,
    },
    #[error("unusable image URL {image_url:?} on {url}: {reason}")]
    InvalidImageUrl {
        url: String,
        image_url: String,
        reason: String,
    },
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Fetches the strip's page and resolves its image; in `ImageBytes` mode the
/// image itself is downloaded too.
pub async fn get_comic_image<F>(
    fetcher: &F,
    request: &ComicRequest,
    mode: RetrieveMode,
) -> Result<ComicImage, ComicError>
where
    F: Fetcher + ?Sized,
{
    let page_url = request.page_url();
    tracing::info!("Fetching HTML from: {}", page_url);

    let page = fetch_ok(fetcher, &page_url, FetchTarget::Page).await?;
    let image_url = image_url_from_page(&page_url, &page)?;
    tracing::info!("Extracted image URL: {}", image_url);

    match mode {
        RetrieveMode::UrlOnly => Ok(ComicImage::Url(image_url)),
        RetrieveMode::ImageBytes => {
            if let Err(e) = Url::parse(&image_url) {
                return Err(ComicError::InvalidImageUrl {
                    url: page_url,
                    image_url,
                    reason: e.to_string(),
                });
            }
            tracing::info!("Fetching image data from: {}", image_url);
            let image = fetch_ok(fetcher, &image_url, FetchTarget::Image).await?;
            tracing::info!(bytes = image.len(), "fetched image data");
            Ok(ComicImage::Bytes(image))
        }
    }
}

/// One-call form using an [`HttpFetcher`] configured from the environment.
pub async fn retrieve_comic_image(
    strip: &str,
    year: i32,
    month: u32,
    day: u32,
    mode: RetrieveMode,
) -> Result<ComicImage, ComicError> {
    let request = ComicRequest::new(strip, year, month, day)?;
    let fetcher = HttpFetcher::from_env().map_err(|source| ComicError::Transport {
        target: FetchTarget::Page,
        url: request.page_url(),
        source,
    })?;
    get_comic_image(&fetcher, &request, mode).await
}

// ── Pipeline steps ───────────────────────────────────────────────────────────

async fn fetch_ok<F>(fetcher: &F, url: &str, target: FetchTarget) -> Result<Vec<u8>, ComicError>
where
    F: Fetcher + ?Sized,
{
    let FetchResponse { status, body } =
        fetcher
            .fetch(url)
            .await
            .map_err(|source| ComicError::Transport {
                target,
                url: url.to_string(),
                source,
            })?;

    if status != HTTP_OK {
        return Err(ComicError::Status {
            target,
            url: url.to_string(),
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body)
}

/// Parses the page and resolves its image. Kept synchronous so the parsed
/// document never lives across an await.
fn image_url_from_page(page_url: &str, body: &[u8]) -> Result<String, ComicError> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let found = extract::resolve_image_url(&document).map_err(|source| ComicError::Extract {
        url: page_url.to_string(),
        source,
    })?;
    Ok(absolutize(page_url, found))
}

/// Relative references are joined onto the page URL; anything else comes
/// back exactly as the page gave it.
fn absolutize(page_url: &str, image_url: String) -> String {
    match Url::parse(&image_url) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(page_url)
            .and_then(|base| base.join(&image_url))
            .map(|u| u.to_string())
            .unwrap_or(image_url),
        _ => image_url,
    }
}
