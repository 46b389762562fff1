//! Default codec: GIF decode via the `image` crate, WebP encode via libwebp.
//!
//! Animated sources are handled on their first frame; animated WebP output is
//! not produced here.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, ImageDecoder, RgbaImage};
use tracing::debug;
use webp::{BitstreamFeatures, Decoder as WebPDecoder, Encoder, WebPConfig};

use crate::core::{EncodeParameters, ImageAttributes};
use crate::utils::SourceFormat;
use super::{CodecError, ImageCodec, RawPixels};

/// Frames beyond this are not decoded during probing; the count is an
/// estimate, not a promise.
const FRAME_PROBE_LIMIT: usize = 512;

/// Pixel-area ceiling per frame (8192 x 8192).
const MAX_PIXEL_AREA: u64 = 8192 * 8192;

pub struct GifWebpCodec {
    max_pixel_area: u64,
}

impl Default for GifWebpCodec {
    fn default() -> Self {
        Self { max_pixel_area: MAX_PIXEL_AREA }
    }
}

impl GifWebpCodec {
    pub fn new(max_pixel_area: u64) -> Self {
        Self { max_pixel_area }
    }

    fn format_for(path: &Path) -> Result<SourceFormat, CodecError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                CodecError::UnsupportedFormat(format!("no extension: {}", path.display()))
            })?;
        ext.parse::<SourceFormat>()
            .map_err(|_| CodecError::UnsupportedFormat(ext.to_string()))
    }

    fn check_area(&self, width: u32, height: u32) -> Result<(), CodecError> {
        let area = width as u64 * height as u64;
        if area > self.max_pixel_area {
            return Err(CodecError::OversizeInput(format!(
                "{}x{} exceeds {} pixel ceiling",
                width, height, self.max_pixel_area
            )));
        }
        Ok(())
    }

    fn decode_first_frame(&self, path: &Path) -> Result<DynamicImage, CodecError> {
        match Self::format_for(path)? {
            SourceFormat::Gif => {
                let reader = BufReader::new(File::open(path)?);
                let decoder = GifDecoder::new(reader)
                    .map_err(|e| CodecError::Codec(format!("gif: {}", e)))?;
                let (width, height) = decoder.dimensions();
                self.check_area(width, height)?;

                let frame = decoder
                    .into_frames()
                    .next()
                    .ok_or_else(|| CodecError::Codec("gif: no frames".to_string()))?
                    .map_err(|e| CodecError::Codec(format!("gif: {}", e)))?;
                Ok(DynamicImage::ImageRgba8(frame.into_buffer()))
            }
            SourceFormat::WebP => {
                let data = std::fs::read(path)?;
                let features = BitstreamFeatures::new(&data).ok_or_else(|| {
                    CodecError::Codec("webp: failed to read bitstream features".to_string())
                })?;
                self.check_area(features.width(), features.height())?;

                let decoded = WebPDecoder::new(&data)
                    .decode()
                    .ok_or_else(|| CodecError::Codec("webp: decode failed".to_string()))?;
                Ok(decoded.to_image())
            }
        }
    }
}

impl ImageCodec for GifWebpCodec {
    fn probe(&self, path: &Path) -> Result<ImageAttributes, CodecError> {
        let format = Self::format_for(path)?;
        let file_size = std::fs::metadata(path)?.len();

        let (width, height, estimated_frame_count, has_alpha) = match format {
            SourceFormat::Gif => {
                let reader = BufReader::new(File::open(path)?);
                let decoder = GifDecoder::new(reader)
                    .map_err(|e| CodecError::Codec(format!("gif: {}", e)))?;
                let (width, height) = decoder.dimensions();
                self.check_area(width, height)?;
                let has_alpha = decoder.color_type().has_alpha();

                let frames = decoder
                    .into_frames()
                    .take(FRAME_PROBE_LIMIT)
                    .take_while(|f| f.is_ok())
                    .count()
                    .max(1) as u32;
                (width, height, frames, has_alpha)
            }
            SourceFormat::WebP => {
                let data = std::fs::read(path)?;
                let features = BitstreamFeatures::new(&data).ok_or_else(|| {
                    CodecError::Codec("webp: failed to read bitstream features".to_string())
                })?;
                self.check_area(features.width(), features.height())?;
                (features.width(), features.height(), 1, features.has_alpha())
            }
        };

        debug!(
            path = %path.display(),
            width,
            height,
            frames = estimated_frame_count,
            "Probed source attributes"
        );

        Ok(ImageAttributes {
            file_size,
            width,
            height,
            estimated_frame_count,
            format,
            has_alpha,
        })
    }

    fn decode_to_raw(
        &self,
        path: &Path,
        target: Option<(u32, u32)>,
    ) -> Result<RawPixels, CodecError> {
        let mut image = self.decode_first_frame(path)?;

        if let Some((width, height)) = target {
            if image.width() != width || image.height() != height {
                image = image.resize_exact(width, height, image::imageops::FilterType::Triangle);
            }
        }

        let rgba: RgbaImage = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(RawPixels {
            data: rgba.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    fn encode(&self, path: &Path, params: &EncodeParameters) -> Result<Vec<u8>, CodecError> {
        let image = self.decode_first_frame(path)?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut config = WebPConfig::new()
            .map_err(|_| CodecError::Codec("webp: failed to create encoder config".to_string()))?;
        config.lossless = if params.lossless { 1 } else { 0 };
        config.quality = params.quality as f32;
        config.method = params.effort as i32;

        let encoder = Encoder::from_rgba(&rgba, width, height);
        let encoded = encoder
            .encode_advanced(&config)
            .map_err(|e| CodecError::Codec(format!("webp: encode failed: {:?}", e)))?;

        debug!(
            path = %path.display(),
            quality = params.quality,
            effort = params.effort,
            lossless = params.lossless,
            bytes = encoded.len(),
            "Encoded WebP"
        );
        Ok(encoded.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba};

    fn write_test_gif(path: &Path, frames: u32) {
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        for i in 0..frames {
            let buffer = RgbaImage::from_fn(32, 24, |x, y| {
                Rgba([(x * 8) as u8, (y * 10) as u8, (i * 40) as u8, 255])
            });
            let frame = Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1));
            encoder.encode_frame(frame).unwrap();
        }
    }

    #[test]
    fn probe_reports_dimensions_and_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        write_test_gif(&path, 3);

        let codec = GifWebpCodec::default();
        let attrs = codec.probe(&path).unwrap();
        assert_eq!(attrs.width, 32);
        assert_eq!(attrs.height, 24);
        assert_eq!(attrs.estimated_frame_count, 3);
        assert_eq!(attrs.format, SourceFormat::Gif);
        assert!(attrs.file_size > 0);
    }

    #[test]
    fn encode_produces_decodable_webp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.gif");
        write_test_gif(&path, 1);

        let codec = GifWebpCodec::default();
        let params = EncodeParameters::new(80, 4, false).unwrap();
        let bytes = codec.encode(&path, &params).unwrap();
        assert!(!bytes.is_empty());

        let out = dir.path().join("still.webp");
        std::fs::write(&out, &bytes).unwrap();
        let raw = codec.decode_to_raw(&out, None).unwrap();
        assert_eq!((raw.width, raw.height), (32, 24));
        assert_eq!(raw.data.len(), raw.expected_len());
    }

    #[test]
    fn oversize_frame_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.gif");
        write_test_gif(&path, 1);

        let codec = GifWebpCodec::new(100);
        match codec.probe(&path) {
            Err(CodecError::OversizeInput(_)) => {}
            other => panic!("expected OversizeInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let codec = GifWebpCodec::default();
        match codec.probe(Path::new("/tmp/file.tiff")) {
            Err(CodecError::UnsupportedFormat(_)) => {}
            other => panic!("expected UnsupportedFormat, got {:?}", other.map(|_| ())),
        }
    }
}
