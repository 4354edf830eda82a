//! Picks the best `ImageObject` out of one `application/ld+json` script.
//!
//! Publishers emit the same data in several layouts, so the text is tried as
//! a single object, then as an array of objects, then as an `@graph` wrapper.
//! The first layout that produces a usable image wins.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::ImageCandidate;

const IMAGE_OBJECT_TYPE: &str = "ImageObject";

type Object = Map<String, Value>;

/// One way of reading the script text. Returns no candidates when the text
/// does not fit the layout.
type Shape = fn(&str) -> Vec<ImageCandidate>;

const SHAPES: &[(&str, Shape)] = &[
    ("object", single_object),
    ("array", object_array),
    ("@graph", graph_wrapper),
];

#[derive(Deserialize)]
struct GraphWrapper {
    #[serde(rename = "@graph")]
    graph: Vec<Value>,
}

/// Returns the first representative image, else the first image with a URL.
pub fn best_image_object(json: &str) -> Option<ImageCandidate> {
    let candidates = SHAPES.iter().find_map(|(name, shape)| {
        let found = shape(json);
        if found.is_empty() {
            tracing::trace!(shape = *name, "no ImageObject in ld+json shape");
            None
        } else {
            Some(found)
        }
    })?;

    select(candidates)
}

fn select(candidates: Vec<ImageCandidate>) -> Option<ImageCandidate> {
    let mut first = None;
    for candidate in candidates {
        if candidate.representative {
            return Some(candidate);
        }
        if first.is_none() {
            first = Some(candidate);
        }
    }
    first
}

// ── Shapes ───────────────────────────────────────────────────────────────────

fn single_object(json: &str) -> Vec<ImageCandidate> {
    serde_json::from_str::<Object>(json)
        .ok()
        .and_then(|obj| image_candidate(&obj))
        .into_iter()
        .collect()
}

fn object_array(json: &str) -> Vec<ImageCandidate> {
    serde_json::from_str::<Vec<Option<Object>>>(json)
        .map(|items| items.iter().flatten().filter_map(image_candidate).collect())
        .unwrap_or_default()
}

fn graph_wrapper(json: &str) -> Vec<ImageCandidate> {
    serde_json::from_str::<GraphWrapper>(json)
        .map(|wrapper| {
            wrapper
                .graph
                .iter()
                .filter_map(Value::as_object)
                .filter_map(image_candidate)
                .collect()
        })
        .unwrap_or_default()
}

// ── Field access ─────────────────────────────────────────────────────────────

fn image_candidate(obj: &Object) -> Option<ImageCandidate> {
    if obj.get("@type").and_then(Value::as_str) != Some(IMAGE_OBJECT_TYPE) {
        return None;
    }

    let url = non_empty_str(obj, "url").or_else(|| non_empty_str(obj, "contentUrl"))?;
    let representative = obj
        .get("representativeOfPage")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(ImageCandidate {
        url: url.to_string(),
        representative,
    })
}

fn non_empty_str<'a>(obj: &'a Object, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}
