/// Image codec module
///
/// This module handles:
/// - Decoding picked images into bitmaps
/// - Re-encoding bitmaps as JPEG at a given quality (jpeg.rs)

pub mod jpeg;

use image::DynamicImage;

use crate::error::CompressResult;
use crate::state::quality::Quality;

pub use jpeg::JpegCodec;

/// Decoded image held in memory
pub type Bitmap = DynamicImage;

/// Decode/encode collaborator used by the pipeline and the save path
pub trait Codec: Send + Sync + 'static {
    /// Decode encoded bytes into a bitmap
    fn decode(&self, bytes: &[u8]) -> CompressResult<Bitmap>;

    /// Encode a bitmap at the given quality
    fn encode(&self, bitmap: &Bitmap, quality: Quality) -> CompressResult<Vec<u8>>;
}

/// Decode then re-encode at `quality`
pub fn recompress<C: Codec + ?Sized>(
    codec: &C,
    bytes: &[u8],
    quality: Quality,
) -> CompressResult<Vec<u8>> {
    let bitmap = codec.decode(bytes)?;
    codec.encode(&bitmap, quality)
}
