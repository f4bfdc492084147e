/// File-system side of the app: size lookups and saving
///
/// Saved images go to a fixed file under the user's Pictures folder:
/// - Linux: ~/Pictures/CompressedImages/compressed_image.jpg
/// - macOS: ~/Pictures/CompressedImages/compressed_image.jpg
/// - Windows: %USERPROFILE%\Pictures\CompressedImages\compressed_image.jpg

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::codec::Codec;
use crate::config::Settings;
use crate::error::{CompressError, CompressResult};
use crate::state::data::CompressedResult;
use crate::state::quality::Quality;

/// Size of a picked file in bytes
pub fn query_size(path: &Path) -> Option<u64> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.len()),
        Err(e) => {
            debug!("Size lookup failed for {}: {}", path.display(), e);
            None
        }
    }
}

/// Where a save lands: <Pictures>/<subdir>/<file name>
pub fn save_location(settings: &Settings) -> CompressResult<PathBuf> {
    let pictures = dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .ok_or(CompressError::NoPicturesDir)?;

    Ok(save_location_in(&pictures, settings))
}

fn save_location_in(base: &Path, settings: &Settings) -> PathBuf {
    base.join(&settings.output_subdir)
        .join(&settings.output_file_name)
}

/// Write bytes, creating missing parent directories
pub fn write_file(path: &Path, bytes: &[u8]) -> CompressResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CompressError::from_write(e, parent))?;
    }

    fs::write(path, bytes).map_err(|e| CompressError::from_write(e, path))
}

/// Re-encode the displayed bitmap and write it to `target`
///
/// The bitmap is decoded from the compressed bytes, so what lands on disk
/// is exactly what the preview shows, encoded again at `quality`.
pub fn save_compressed_to<C: Codec + ?Sized>(
    codec: &C,
    result: Option<&CompressedResult>,
    quality: Quality,
    target: &Path,
) -> CompressResult<PathBuf> {
    let result = result.ok_or(CompressError::NothingToSave)?;

    let bitmap = codec.decode(&result.bytes)?;
    let encoded = codec.encode(&bitmap, quality)?;
    write_file(target, &encoded)?;

    info!(
        "💾 Saved {} KB to {}",
        encoded.len() / 1024,
        target.display()
    );
    Ok(target.to_path_buf())
}

/// Save the current result on a blocking worker
pub async fn save_compressed(
    codec: Arc<dyn Codec>,
    result: Option<CompressedResult>,
    settings: Settings,
) -> CompressResult<PathBuf> {
    tokio::task::spawn_blocking(move || {
        let target = save_location(&settings)?;
        save_compressed_to(codec.as_ref(), result.as_ref(), settings.save_quality(), &target)
    })
    .await?
}
