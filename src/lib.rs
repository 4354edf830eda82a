//! Resolve the daily strip image for a gocomics.com comic.
//!
//! The page for a strip and date is fetched, parsed with `scraper`, and
//! searched for the image that represents it: the `og:image` meta tag first,
//! then `ImageObject`s in `application/ld+json` scripts, then the
//! `twitter:image` meta tag.

pub mod comic;
pub mod extract;
pub mod fetch;
pub mod ld_json;
pub mod models;

pub use comic::{get_comic_image, retrieve_comic_image, ComicError, FetchTarget};
pub use extract::{resolve_image_url, resolve_image_url_from_html, ResolveError};
pub use fetch::{FetchConfig, FetchError, FetchResponse, Fetcher, HttpFetcher};
pub use models::{ComicImage, ComicRequest, ImageCandidate, RetrieveMode};
