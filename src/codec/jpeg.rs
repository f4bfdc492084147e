use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;

use super::{Bitmap, Codec};
use crate::error::{CompressError, CompressResult};
use crate::state::quality::Quality;

/// JPEG codec backed by the `image` crate
///
/// Decoding accepts every format `image` can guess from content.
/// Encoding always produces baseline JPEG. The encoder treats quality 0
/// as 1, its lowest setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl Codec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> CompressResult<Bitmap> {
        image::load_from_memory(bytes).map_err(|e| CompressError::decode(e.to_string()))
    }

    fn encode(&self, bitmap: &Bitmap, quality: Quality) -> CompressResult<Vec<u8>> {
        let flattened = flatten_for_jpeg(bitmap);

        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.get());
        flattened
            .write_with_encoder(encoder)
            .map_err(|e| CompressError::encode(e.to_string()))?;

        Ok(buffer.into_inner())
    }
}

/// JPEG has no alpha and only 8-bit samples
fn flatten_for_jpeg(bitmap: &Bitmap) -> DynamicImage {
    match bitmap {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => bitmap.clone(),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            DynamicImage::ImageLuma8(bitmap.to_luma8())
        }
        _ => DynamicImage::ImageRgb8(bitmap.to_rgb8()),
    }
}
