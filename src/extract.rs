use std::ops::ControlFlow;

use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::ld_json;

// ── Constants ────────────────────────────────────────────────────────────────

const OG_IMAGE: &str = "og:image";
const TWITTER_IMAGE: &str = "twitter:image";
const LD_JSON_TYPE: &str = "application/ld+json";

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error(
        "could not find 'og:image' meta tag, suitable 'application/ld+json' script \
         with an ImageObject, or 'twitter:image' meta tag"
    )]
    NotFound,
}

// ── Meta tag scan ────────────────────────────────────────────────────────────

#[derive(Default)]
struct MetaImages {
    og: Option<String>,
    twitter: Option<String>,
}

// ── Public API ───────────────────────────────────────────────────────────────

pub fn resolve_image_url_from_html(html: &str) -> Result<String, ResolveError> {
    resolve_image_url(&Html::parse_document(html))
}

/// Picks the image that best represents the page.
///
/// Order: `og:image` meta, then `ImageObject`s in ld+json scripts (an object
/// flagged `representativeOfPage` beats everything found before or after it),
/// then `twitter:image` meta.
pub fn resolve_image_url(document: &Html) -> Result<String, ResolveError> {
    let root = document.root_element();

    let mut meta = MetaImages::default();
    scan_meta(root, &mut meta);

    if let Some(url) = meta.og {
        tracing::debug!(%url, "using og:image");
        return Ok(url);
    }

    let mut fallback = None;
    if let ControlFlow::Break(url) = scan_ld_json(root, &mut fallback) {
        tracing::debug!(%url, "using representative ld+json ImageObject");
        return Ok(url);
    }
    if let Some(url) = fallback {
        tracing::debug!(%url, "using first ld+json ImageObject");
        return Ok(url);
    }

    if let Some(url) = meta.twitter {
        tracing::debug!(%url, "using twitter:image");
        return Ok(url);
    }

    Err(ResolveError::NotFound)
}

// ── Tree walkers ─────────────────────────────────────────────────────────────

fn scan_meta(el: ElementRef<'_>, found: &mut MetaImages) {
    let v = el.value();
    if v.name() == "meta" {
        let content = v.attr("content").filter(|c| !c.is_empty());
        if let Some(content) = content {
            if found.og.is_none() && v.attr("property") == Some(OG_IMAGE) {
                found.og = Some(content.to_string());
            }
            if found.twitter.is_none() && v.attr("name") == Some(TWITTER_IMAGE) {
                found.twitter = Some(content.to_string());
            }
        }
    }

    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            scan_meta(child_el, found);
        }
    }
}

/// Breaks with the URL of the first representative image. Otherwise records
/// the first non-representative one in `fallback` and keeps walking.
fn scan_ld_json(el: ElementRef<'_>, fallback: &mut Option<String>) -> ControlFlow<String> {
    if el.value().name() == "script" && el.value().attr("type") == Some(LD_JSON_TYPE) {
        match script_text(el).and_then(ld_json::best_image_object) {
            Some(candidate) if candidate.representative => {
                return ControlFlow::Break(candidate.url);
            }
            Some(candidate) => {
                if fallback.is_none() {
                    *fallback = Some(candidate.url);
                }
            }
            None => tracing::trace!("ld+json script without a usable ImageObject"),
        }
    }

    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            scan_ld_json(child_el, fallback)?;
        }
    }
    ControlFlow::Continue(())
}

// ── DOM utility helpers ──────────────────────────────────────────────────────

/// Text of the element's first child, when that child is a text node.
fn script_text<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    match el.first_child()?.value() {
        Node::Text(text) => Some(&*text.text),
        _ => None,
    }
}
