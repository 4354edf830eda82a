use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::comic::ComicError;

const GOCOMICS_BASE: &str = "https://www.gocomics.com";

static STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// An image reference found in structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub representative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieveMode {
    UrlOnly,
    ImageBytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComicImage {
    Url(String),
    Bytes(Vec<u8>),
}

/// A strip and a day to look up, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicRequest {
    strip: String,
    date: NaiveDate,
}

impl ComicRequest {
    pub fn new(strip: &str, year: i32, month: u32, day: u32) -> Result<Self, ComicError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(ComicError::InvalidDate { year, month, day })?;
        Self::for_date(strip, date)
    }

    pub fn for_date(strip: &str, date: NaiveDate) -> Result<Self, ComicError> {
        let strip = strip.trim();
        if !STRIP_RE.is_match(strip) {
            return Err(ComicError::InvalidStrip(strip.to_string()));
        }
        Ok(Self {
            strip: strip.to_string(),
            date,
        })
    }

    pub fn strip(&self) -> &str {
        &self.strip
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// `https://www.gocomics.com/{strip}/{year}/{MM}/{DD}`
    pub fn page_url(&self) -> String {
        format!(
            "{}/{}/{}/{:02}/{:02}",
            GOCOMICS_BASE,
            self.strip,
            self.date.year(),
            self.date.month(),
            self.date.day()
        )
    }
}
