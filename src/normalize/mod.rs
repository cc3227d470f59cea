//! # Content Normalization
//!
//! Turns a [`PrintEvent`] into a block [`Program`].
//!
//! Layout lives in the per-event modules ([`issue`], [`todo`], [`image`]),
//! which are pure functions of the event and any already-rasterized
//! pictures. [`Normalizer`] does the I/O around them: reading the logo,
//! fetching avatars and decoding uploaded images.
//!
//! ## Failure policy
//!
//! | Image | On failure |
//! |-------|-----------|
//! | Logo | skipped, logged |
//! | Assignee avatar | replaced by an empty line, logged |
//! | Uploaded image (the whole receipt) | job fails |
//!
//! Missing text fields never fail; they print as `없음`.

pub mod image;
pub mod issue;
pub mod sanitize;
pub mod todo;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::InkslipError;
use crate::event::{ImageEvent, IssueEvent, PrintEvent};
use crate::ir::{Block, Program};
use crate::printer::PrinterConfig;
use crate::render::RasterImage;
use crate::render::dither::DitheringAlgorithm;
use crate::render::fetch::ImageFetcher;
use crate::render::preprocess::{self, Pipeline, PreprocessError};

/// Placeholder for absent fields.
pub const NONE: &str = "없음";

/// Placeholder for an absent or empty body.
pub const EMPTY_BODY: &str = "내용 없음";

/// Last text line of every issue receipt.
pub const FOOTER: &str = "바리바리 연구실 GitHub 알림 서비스";

/// Timestamps print in Korea Standard Time.
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// A single-line field value, or [`NONE`] when absent or blank after cleanup.
fn field(raw: Option<&str>) -> String {
    raw.map(sanitize::single_line)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NONE.to_string())
}

/// A finished label line, sanitized and capped.
fn line(text: String) -> Block {
    Block::text(sanitize::sanitize_line(&text))
}

/// Format like `2024. 1. 1. 오전 9:00:00`, or [`NONE`] when absent.
pub fn format_timestamp(ts: Option<DateTime<Utc>>, offset: &FixedOffset) -> String {
    let Some(ts) = ts else {
        return NONE.to_string();
    };
    let local = ts.with_timezone(offset);
    let (pm, hour) = local.hour12();
    format!(
        "{}. {}. {}. {} {}:{:02}:{:02}",
        local.year(),
        local.month(),
        local.day(),
        if pm { "오후" } else { "오전" },
        hour,
        local.minute(),
        local.second()
    )
}

/// Event-to-program conversion with the I/O it needs.
pub struct Normalizer {
    fetcher: Arc<dyn ImageFetcher>,
    config: PrinterConfig,
    logo: Option<PathBuf>,
    offset: FixedOffset,
    image_width: u16,
    dither: DitheringAlgorithm,
}

impl Normalizer {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, config: PrinterConfig) -> Self {
        Self {
            fetcher,
            config,
            logo: None,
            offset: FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
            image_width: config.width_dots,
            dither: DitheringAlgorithm::default(),
        }
    }

    /// Print this image file at the top of issue receipts.
    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(path.into());
        self
    }

    /// Time zone timestamps are shown in.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Target width for uploaded images (defaults to the full head width).
    pub fn with_image_width(mut self, width: u16) -> Self {
        self.image_width = width;
        self
    }

    /// Quantizer for uploaded images. Logos and avatars always use a hard
    /// threshold.
    pub fn with_dithering(mut self, dither: DitheringAlgorithm) -> Self {
        self.dither = dither;
        self
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Build the receipt for `event`.
    ///
    /// Fails only when the event cannot print at all: an uploaded image that
    /// is missing or undecodable ([`InkslipError::MalformedEvent`]) or that
    /// cannot be transformed ([`InkslipError::ImageUnavailable`]).
    pub async fn normalize(&self, event: &PrintEvent) -> Result<Program, InkslipError> {
        match event {
            PrintEvent::Issue(issue) => {
                let (logo, avatar) = tokio::join!(self.logo(), self.avatar(issue));
                Ok(issue::blocks(issue, &self.offset, logo, avatar))
            }
            PrintEvent::Todo(todo) => Ok(todo::blocks(todo, &self.offset)),
            PrintEvent::RawImage(upload) => {
                let raster = self.uploaded_image(upload).await?;
                Ok(image::blocks(raster))
            }
        }
    }

    async fn logo(&self) -> Option<RasterImage> {
        let path = self.logo.as_ref()?;
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "logo skipped");
                return None;
            }
        };

        let pipeline = Pipeline::logo(self.config.width_dots);
        match rasterize_blocking(bytes, pipeline, self.config.width_dots).await {
            Ok(raster) => Some(raster),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "logo skipped");
                None
            }
        }
    }

    async fn avatar(&self, issue: &IssueEvent) -> Option<RasterImage> {
        let url = issue
            .assignee
            .as_ref()
            .and_then(|a| a.avatar_url.as_deref())
            .filter(|u| !u.trim().is_empty());
        let Some(url) = url else {
            debug!("no assignee avatar");
            return None;
        };

        let result = match self.fetcher.fetch(url).await {
            Ok(bytes) => rasterize_blocking(bytes, Pipeline::avatar(), self.config.width_dots).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(raster) => Some(raster),
            Err(e) => {
                warn!(url, error = %e, "avatar skipped");
                None
            }
        }
    }

    async fn uploaded_image(&self, upload: &ImageEvent) -> Result<RasterImage, InkslipError> {
        let payload = upload
            .base64
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| InkslipError::MalformedEvent("image payload missing".into()))?;

        let bytes = preprocess::decode_base64(payload).map_err(malformed)?;
        let pipeline = Pipeline::full_width(self.image_width).with_dither(self.dither);

        rasterize_blocking(bytes, pipeline, self.config.width_dots)
            .await
            .map_err(|e| match e {
                PreprocessError::Decode(_) => malformed(e),
                other => other.into(),
            })
    }
}

fn malformed(err: PreprocessError) -> InkslipError {
    InkslipError::MalformedEvent(err.to_string())
}

/// Decode and transform on the blocking pool; image work is CPU-bound.
async fn rasterize_blocking(
    bytes: Vec<u8>,
    pipeline: Pipeline,
    max_width: u16,
) -> Result<RasterImage, PreprocessError> {
    tokio::task::spawn_blocking(move || preprocess::rasterize(&bytes, &pipeline, max_width))
        .await
        .map_err(|e| PreprocessError::Transform(format!("image worker failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{TodoEvent, User};
    use crate::ir::Block;
    use ::image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use async_trait::async_trait;
    use base64::Engine;
    use chrono::TimeZone;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed PNG, or fails, and counts calls.
    struct StubFetcher {
        png: Option<Vec<u8>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, PreprocessError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.png
                .clone()
                .ok_or_else(|| PreprocessError::Fetch(format!("{}: HTTP 404", url)))
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn normalizer(png: Option<Vec<u8>>) -> (Normalizer, Arc<StubFetcher>) {
        let fetcher = Arc::new(StubFetcher {
            png,
            calls: AtomicUsize::new(0),
        });
        (
            Normalizer::new(fetcher.clone(), PrinterConfig::RECEIPT_80MM),
            fetcher,
        )
    }

    fn issue_with_avatar() -> IssueEvent {
        IssueEvent {
            assignee: Some(User {
                login: Some("carol".into()),
                avatar_url: Some("https://avatars.example/carol.png".into()),
            }),
            ..IssueEvent::default()
        }
    }

    fn images(program: &Program) -> Vec<(u16, u16)> {
        program
            .iter()
            .filter_map(|b| match b {
                Block::Image { raster, .. } => Some((raster.width, raster.height)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_format_timestamp() {
        let kst = FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS).unwrap();
        let at = |h, m, s| Some(Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap());

        assert_eq!(format_timestamp(at(0, 0, 0), &kst), "2024. 1. 1. 오전 9:00:00");
        assert_eq!(format_timestamp(at(3, 5, 9), &kst), "2024. 1. 1. 오후 12:05:09");
        assert_eq!(format_timestamp(at(15, 30, 0), &kst), "2024. 1. 2. 오전 12:30:00");
        assert_eq!(format_timestamp(None, &kst), NONE);
    }

    #[tokio::test]
    async fn test_avatar_is_fetched_and_shrunk() {
        let (normalizer, fetcher) = normalizer(Some(png(460, 460)));
        let program = normalizer
            .normalize(&PrintEvent::Issue(issue_with_avatar()))
            .await
            .unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(images(&program), vec![(24, 24)]);
    }

    #[tokio::test]
    async fn test_avatar_failure_is_swallowed() {
        let (normalizer, fetcher) = normalizer(None);
        let program = normalizer
            .normalize(&PrintEvent::Issue(issue_with_avatar()))
            .await
            .unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(images(&program).is_empty());
        assert_eq!(program.blocks.last(), Some(&Block::Cut));
    }

    #[tokio::test]
    async fn test_no_avatar_url_no_fetch() {
        let (normalizer, fetcher) = normalizer(Some(png(4, 4)));
        normalizer
            .normalize(&PrintEvent::Issue(IssueEvent::default()))
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_logo_is_not_fatal() {
        let (normalizer, _) = normalizer(None);
        let normalizer = normalizer.with_logo("/nonexistent/github.png");
        let program = normalizer
            .normalize(&PrintEvent::Issue(IssueEvent::default()))
            .await
            .unwrap();
        assert!(images(&program).is_empty());
    }

    #[tokio::test]
    async fn test_logo_is_printed_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github.png");
        std::fs::write(&path, png(100, 30)).unwrap();

        let (normalizer, _) = normalizer(None);
        let program = normalizer
            .with_logo(&path)
            .normalize(&PrintEvent::Issue(IssueEvent::default()))
            .await
            .unwrap();

        assert_eq!(images(&program), vec![(100, 30)]);
        assert!(matches!(program.blocks[1], Block::Image { .. }));
    }

    #[tokio::test]
    async fn test_todo_needs_no_io() {
        let (normalizer, fetcher) = normalizer(None);
        let program = normalizer
            .normalize(&PrintEvent::Todo(TodoEvent::default()))
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(program.blocks.last(), Some(&Block::Cut));
    }

    #[tokio::test]
    async fn test_uploaded_image_full_width() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png(59, 10));
        let event = PrintEvent::RawImage(ImageEvent {
            title: Some("shot".into()),
            base64: Some(format!("data:image/png;base64,{}", encoded)),
            created_at: None,
        });

        let (normalizer, _) = normalizer(None);
        let program = normalizer.normalize(&event).await.unwrap();
        assert_eq!(images(&program), vec![(590, 100)]);
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_malformed() {
        let (normalizer, _) = normalizer(None);
        for payload in [None, Some("%%%"), Some("aGVsbG8gd29ybGQ=")] {
            let event = PrintEvent::RawImage(ImageEvent {
                base64: payload.map(str::to_string),
                ..ImageEvent::default()
            });
            let err = normalizer.normalize(&event).await.unwrap_err();
            assert!(matches!(err, InkslipError::MalformedEvent(_)), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_zero_width_upload_is_image_unavailable() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png(10, 10));
        let event = PrintEvent::RawImage(ImageEvent {
            base64: Some(encoded),
            ..ImageEvent::default()
        });

        let (normalizer, _) = normalizer(None);
        let err = normalizer
            .with_image_width(0)
            .normalize(&event)
            .await
            .unwrap_err();
        assert!(matches!(err, InkslipError::ImageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_ordered_dithering_halftones_light_gray() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(59, 10, Rgba([224, 224, 224, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(out.into_inner());
        let event = PrintEvent::RawImage(ImageEvent {
            base64: Some(encoded),
            ..ImageEvent::default()
        });

        let raster = |program: Program| {
            program.blocks.into_iter().find_map(|b| match b {
                Block::Image { raster, .. } => Some(raster),
                _ => None,
            })
        };

        let (plain, _) = normalizer(None);
        let plain = raster(plain.normalize(&event).await.unwrap()).unwrap();
        assert_eq!(plain.ink(), 0);

        let (ordered, _) = normalizer(None);
        let ordered = ordered.with_dithering(DitheringAlgorithm::Bayer);
        let ordered = raster(ordered.normalize(&event).await.unwrap()).unwrap();
        let total = ordered.width as usize * ordered.height as usize;
        assert!(ordered.ink() > total / 8 && ordered.ink() < total / 2, "{} of {}", ordered.ink(), total);
    }
}
