//! Media handling: size enforcement and image downscaling.
//!
//! Post media arrives as a base64 data URI and is stored the same way.
//! Images above the size ceiling are re-encoded at decreasing quality and
//! resolution until they fit. Videos are size-checked only.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;
use std::io::Cursor;

use minsu_common::{AppError, AppResult};

/// Starting JPEG quality for the first compression attempt.
const INITIAL_QUALITY: f32 = 0.7;

/// Quality reduction per attempt.
const QUALITY_STEP: f32 = 0.1;

/// Lowest quality the loop will try.
const MIN_QUALITY: f32 = 0.1;

/// Starting bound on the longer image edge, in pixels.
const INITIAL_MAX_DIMENSION: u32 = 1200;

/// Dimension reduction per attempt.
const DIMENSION_STEP: u32 = 200;

/// Smallest bound on the longer image edge.
const MIN_DIMENSION: u32 = 200;

/// Upper bound on compression attempts.
const MAX_ATTEMPTS: u32 = 10;

/// Result of preparing a media payload for storage.
#[derive(Debug, Clone)]
pub struct PreparedMedia {
    /// Data URI to store, possibly re-encoded.
    pub data_uri: String,
    /// True when the payload still exceeds the ceiling after all attempts.
    pub oversized: bool,
}

/// Media service for size enforcement and image re-encoding.
#[derive(Debug, Clone)]
pub struct MediaService {
    max_bytes: usize,
}

impl MediaService {
    /// Create a new media service with the given payload ceiling in bytes.
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Prepare an image payload for storage.
    ///
    /// Payloads at or under the ceiling pass through untouched. Larger ones
    /// are re-encoded as JPEG at decreasing quality and resolution until
    /// they fit. This never fails: when the payload cannot be decoded or
    /// every attempt is exhausted, the original is kept and flagged.
    #[must_use]
    pub fn prepare_image(&self, data_uri: &str) -> PreparedMedia {
        let Some((_, data)) = parse_data_uri(data_uri) else {
            tracing::warn!("unparseable image data URI, storing as-is");
            return PreparedMedia {
                data_uri: data_uri.to_owned(),
                oversized: false,
            };
        };

        if data.len() <= self.max_bytes {
            return PreparedMedia {
                data_uri: data_uri.to_owned(),
                oversized: false,
            };
        }

        let original = match image::load_from_memory(&data) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!(error = %e, "image decode failed, storing original payload");
                return PreparedMedia {
                    data_uri: data_uri.to_owned(),
                    oversized: true,
                };
            }
        };

        for attempt in 0..MAX_ATTEMPTS {
            let quality = QUALITY_STEP
                .mul_add(-(attempt as f32), INITIAL_QUALITY)
                .max(MIN_QUALITY);
            let max_dimension =
                INITIAL_MAX_DIMENSION.saturating_sub(DIMENSION_STEP * attempt).max(MIN_DIMENSION);

            match encode_jpeg(&original, max_dimension, quality) {
                Ok(encoded) if encoded.len() <= self.max_bytes => {
                    tracing::debug!(
                        attempt = attempt + 1,
                        bytes = encoded.len(),
                        "image compressed under ceiling"
                    );
                    return PreparedMedia {
                        data_uri: format!("data:image/jpeg;base64,{}", BASE64.encode(&encoded)),
                        oversized: false,
                    };
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "image encode failed, storing original payload");
                    return PreparedMedia {
                        data_uri: data_uri.to_owned(),
                        oversized: true,
                    };
                }
            }
        }

        tracing::warn!(
            bytes = data.len(),
            ceiling = self.max_bytes,
            "compression attempts exhausted, storing oversized payload"
        );
        PreparedMedia {
            data_uri: data_uri.to_owned(),
            oversized: true,
        }
    }

    /// Reject a video payload that exceeds the ceiling.
    ///
    /// Videos are never transcoded here, so an oversized one is an error.
    pub fn check_video(&self, data_uri: &str) -> AppResult<()> {
        let Some((_, data)) = parse_data_uri(data_uri) else {
            return Err(AppError::BadRequest("Invalid media data URI".to_string()));
        };

        if data.len() > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Video exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        Ok(())
    }
}

/// Resize so the longer edge fits `max_dimension`, then encode as JPEG.
fn encode_jpeg(
    image: &DynamicImage,
    max_dimension: u32,
    quality: f32,
) -> Result<Vec<u8>, image::ImageError> {
    let resized = if image.width() > max_dimension || image.height() > max_dimension {
        image.thumbnail(max_dimension, max_dimension)
    } else {
        image.clone()
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let quality_pct = (quality * 100.0).clamp(1.0, 100.0) as u8;
    let mut buf = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality_pct);
    encoder.encode_image(&rgb)?;
    Ok(buf)
}

/// Split a base64 data URI into its MIME type and decoded bytes.
#[must_use]
pub fn parse_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let data = BASE64.decode(payload).ok()?;
    Some((mime.to_owned(), data))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn to_png_data_uri(image: &DynamicImage) -> String {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(&buf))
    }

    #[test]
    fn parse_data_uri_roundtrip() {
        let uri = format!("data:image/png;base64,{}", BASE64.encode(b"hello"));
        let (mime, data) = parse_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, b"hello");
    }

    #[test]
    fn parse_data_uri_rejects_garbage() {
        assert!(parse_data_uri("not a data uri").is_none());
        assert!(parse_data_uri("data:image/png,plainpayload").is_none());
        assert!(parse_data_uri("data:image/png;base64,%%%").is_none());
    }

    #[test]
    fn small_image_passes_through_unchanged() {
        let uri = to_png_data_uri(&gradient_image(16, 16));
        let service = MediaService::new(900 * 1024);

        let prepared = service.prepare_image(&uri);
        assert_eq!(prepared.data_uri, uri);
        assert!(!prepared.oversized);
    }

    #[test]
    fn prepare_is_idempotent_on_small_input() {
        let uri = to_png_data_uri(&gradient_image(16, 16));
        let service = MediaService::new(900 * 1024);

        let once = service.prepare_image(&uri);
        let twice = service.prepare_image(&once.data_uri);
        assert_eq!(once.data_uri, twice.data_uri);
    }

    #[test]
    fn large_image_is_compressed_under_ceiling() {
        let uri = to_png_data_uri(&gradient_image(1600, 1200));
        let max = 50 * 1024;
        let service = MediaService::new(max);

        let prepared = service.prepare_image(&uri);
        assert!(!prepared.oversized);
        assert!(prepared.data_uri.starts_with("data:image/jpeg;base64,"));

        let (_, data) = parse_data_uri(&prepared.data_uri).unwrap();
        assert!(data.len() <= max);
    }

    #[test]
    fn output_fits_or_is_flagged_oversized() {
        // Tiny ceiling that even the smallest re-encode may not satisfy.
        let uri = to_png_data_uri(&gradient_image(800, 600));
        let max = 512;
        let service = MediaService::new(max);

        let prepared = service.prepare_image(&uri);
        let (_, data) = parse_data_uri(&prepared.data_uri).unwrap();
        assert!(prepared.oversized || data.len() <= max);
    }

    #[test]
    fn undecodable_payload_falls_back_to_original() {
        let blob: Vec<u8> = (0..4096).map(|i| (i % 251) as u8).collect();
        let uri = format!("data:image/png;base64,{}", BASE64.encode(&blob));
        let service = MediaService::new(1024);

        let prepared = service.prepare_image(&uri);
        assert_eq!(prepared.data_uri, uri);
        assert!(prepared.oversized);
    }

    #[test]
    fn oversized_video_is_rejected() {
        let blob = vec![0u8; 2048];
        let uri = format!("data:video/mp4;base64,{}", BASE64.encode(&blob));
        let service = MediaService::new(1024);

        let err = service.check_video(&uri).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn small_video_is_accepted() {
        let blob = vec![0u8; 512];
        let uri = format!("data:video/mp4;base64,{}", BASE64.encode(&blob));
        let service = MediaService::new(1024);

        assert!(service.check_video(&uri).is_ok());
    }
}
