//! Earthbeat: the daily journal entry built from a resonance spectrogram.
//!
//! `lumina earthbeat` appends one journal entry per day:
//!
//! 1. Resolve the target date (`--date YYYY-MM-DD`, default today in UTC).
//! 2. Derive the entry's slug, title, and publish time from the date. If the
//!    journal already has that slug, stop without writing.
//! 3. Fetch the spectrogram and save it under the content root.
//! 4. Average the red channel over three vertical bands (morning, midday,
//!    evening) and turn each band into a tag and a sentence.
//! 5. Append the entry, re-sort the journal newest first, and write it back.
//!
//! Steps 3 and 4 may fail (network, decoding). The failure is logged and the
//! entry is written without analysis, using the configured fallback summary
//! and tag.
//!
//! Journal records are handled as raw JSON values, so fields this crate does
//! not model survive the rewrite.

use crate::config::EarthbeatConfig;
use crate::store::parse_timestamp;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use image::DynamicImage;
use serde::Serialize;
use serde_json::{Value, json};
use std::cmp::Reverse;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Journal data file not found: {0}")]
    MissingJournal(PathBuf),
    #[error("{0} must contain a JSON array")]
    NotAnArray(PathBuf),
    #[error("Invalid --date '{0}', use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Spectrogram request failed: {0}")]
    Fetch(String),
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Body placeholder for a fresh entry.
const DEFAULT_CONTENT: &str = "<p>(Add your observation here.)</p>";

/// Spectrogram downloads larger than this are truncated (and will fail to decode).
const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Where spectrogram bytes come from.
pub trait SpectrogramSource {
    fn fetch(&self) -> Result<Vec<u8>, EnrichError>;
}

/// Blocking HTTP fetch of a fixed URL.
pub struct HttpSource {
    pub url: String,
}

impl SpectrogramSource for HttpSource {
    fn fetch(&self) -> Result<Vec<u8>, EnrichError> {
        let response = ureq::get(&self.url)
            .set("User-Agent", concat!("lumina/", env!("CARGO_PKG_VERSION")))
            .call()
            .map_err(|err| EnrichError::Fetch(format!("{}: {err}", self.url)))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_IMAGE_BYTES)
            .read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Parse `--date`, defaulting to `today`.
pub fn parse_target_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate, EnrichError> {
    match arg {
        None => Ok(today),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| EnrichError::InvalidDate(s.to_string())),
    }
}

/// The date-derived identity of an Earthbeat entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseEntry {
    pub slug: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

pub fn base_entry(date: NaiveDate, publish_hour_utc: u32) -> BaseEntry {
    let published_at = date
        .and_hms_opt(publish_hour_utc.min(23), 0, 0)
        .unwrap_or_default()
        .and_utc();
    BaseEntry {
        slug: format!("earthbeat-{date}"),
        title: format!("Earthbeat — {}", date.format("%B %-d, %Y")),
        published_at,
    }
}

/// Average red-channel brightness (0–255) of each band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalWindows {
    pub morning: f64,
    pub midday: f64,
    pub evening: f64,
}

/// Split the image into three vertical bands by column and average each
/// band's red channel.
pub fn analyze_brightness(image: &DynamicImage) -> SignalWindows {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let band = |start: u32, end: u32| -> f64 {
        let end = end.max(start + 1).min(width);
        let mut total = 0u64;
        let mut count = 0u64;
        for x in start..end {
            for y in 0..height {
                total += u64::from(rgb.get_pixel(x, y)[0]);
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    };
    SignalWindows {
        morning: band(0, width / 3),
        midday: band(width / 3, width * 2 / 3),
        evening: band(width * 2 / 3, width),
    }
}

/// Tags and summary read from the signal windows.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// One tag per band, de-duplicated, first-seen order.
    pub tags: Vec<String>,
    pub summary: String,
}

pub fn interpret(windows: &SignalWindows, low: f64, high: f64) -> Reading {
    let mut tags: Vec<String> = Vec::new();
    let mut sentences = Vec::new();
    for (period, level) in [
        ("Morning", windows.morning),
        ("Midday", windows.midday),
        ("Evening", windows.evening),
    ] {
        let (tag, phrase) = if level < low {
            ("stillness", "field steady at low amplitude")
        } else if level < high {
            ("lift", "saw a moderate lift")
        } else {
            ("surge", "carried a strong surge")
        };
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
        sentences.push(format!("{period} {phrase}"));
    }
    Reading {
        tags,
        summary: format!("{}.", sentences.join(". ")),
    }
}

/// A successful fetch-and-analyze.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Site path of the saved spectrogram.
    pub image_url: String,
    pub windows: SignalWindows,
    pub reading: Reading,
}

/// Result of [`run`].
#[derive(Debug, Clone, PartialEq)]
pub enum EarthbeatOutcome {
    AlreadyExists { slug: String },
    Added { slug: String, analyzed: bool },
}

/// Append the Earthbeat entry for `date` to `<content_root>/journal.json`.
pub fn run(
    content_root: &Path,
    config: &EarthbeatConfig,
    date: NaiveDate,
    source: &dyn SpectrogramSource,
) -> Result<EarthbeatOutcome, EnrichError> {
    let journal_path = content_root.join("journal.json");
    if !journal_path.exists() {
        return Err(EnrichError::MissingJournal(journal_path));
    }
    let raw = fs::read_to_string(&journal_path)?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| EnrichError::Json {
        path: journal_path.clone(),
        source,
    })?;
    let Value::Array(mut entries) = value else {
        return Err(EnrichError::NotAnArray(journal_path));
    };

    let base = base_entry(date, config.publish_hour_utc);
    if entries
        .iter()
        .any(|e| e.get("slug").and_then(Value::as_str) == Some(base.slug.as_str()))
    {
        info!(slug = %base.slug, "entry already exists");
        return Ok(EarthbeatOutcome::AlreadyExists { slug: base.slug });
    }

    let analysis = match fetch_and_analyze(content_root, config, date, source) {
        Ok(analysis) => Some(analysis),
        Err(err) => {
            warn!(error = %err, "spectrogram fetch/analyze failed, writing entry without analysis");
            None
        }
    };

    let analyzed = analysis.is_some();
    entries.push(build_entry(&base, config, analysis.as_ref()));
    sort_newest_first(&mut entries);

    let mut out = serde_json::to_string_pretty(&entries).map_err(|source| EnrichError::Json {
        path: journal_path.clone(),
        source,
    })?;
    out.push('\n');
    fs::write(&journal_path, out)?;

    Ok(EarthbeatOutcome::Added {
        slug: base.slug,
        analyzed,
    })
}

fn fetch_and_analyze(
    content_root: &Path,
    config: &EarthbeatConfig,
    date: NaiveDate,
    source: &dyn SpectrogramSource,
) -> Result<Analysis, EnrichError> {
    let bytes = source.fetch()?;

    let image_dir = config.image_dir.trim_matches('/');
    let filename = format!("{date}.jpg");
    let dir = content_root.join(image_dir);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(&filename), &bytes)?;

    let image = image::load_from_memory(&bytes)?;
    let windows = analyze_brightness(&image);
    let reading = interpret(&windows, config.low_threshold, config.high_threshold);
    Ok(Analysis {
        image_url: format!("/{image_dir}/{filename}"),
        windows,
        reading,
    })
}

fn build_entry(base: &BaseEntry, config: &EarthbeatConfig, analysis: Option<&Analysis>) -> Value {
    let summary = analysis
        .map(|a| a.reading.summary.clone())
        .unwrap_or_else(|| config.fallback_summary.clone());
    let tags = match analysis {
        Some(a) if !a.reading.tags.is_empty() => a.reading.tags.clone(),
        _ => vec![config.default_tag.clone()],
    };

    let mut entry = json!({
        "slug": base.slug,
        "title": base.title,
        "summary": summary,
        "content": DEFAULT_CONTENT,
        "category": "earthbeat",
        "tags": tags,
        "cover_image_url": analysis.map(|a| a.image_url.as_str()).unwrap_or(""),
        "published_at": base.published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    });
    if let (Some(a), Some(map)) = (analysis, entry.as_object_mut()) {
        map.insert("sr_source".into(), json!(config.source_name));
        map.insert("sr_image_url".into(), json!(a.image_url));
        map.insert("sr_tags_auto".into(), json!(a.reading.tags));
        map.insert("sr_summary".into(), json!(a.reading.summary));
        map.insert("sr_signal_windows".into(), json!(a.windows));
    }
    entry
}

/// Stable sort by `published_at`, newest first. Undated entries go last.
fn sort_newest_first(entries: &mut [Value]) {
    entries.sort_by_key(|e| {
        Reverse(
            e.get("published_at")
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        )
    });
}
