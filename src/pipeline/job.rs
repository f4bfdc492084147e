/// A single recompression job
///
/// The job body is CPU-bound (full decode plus JPEG encode), so it always
/// runs on tokio's blocking pool.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::codec::{recompress, Codec};
use crate::error::CompressResult;
use crate::state::data::{CompressedResult, SourceImage};
use crate::state::quality::Quality;

/// What a scheduled job produced
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// A newer request or an invalidation arrived during the delay;
    /// nothing was decoded
    Superseded { generation: u64 },
    /// The job ran to completion (successfully or not)
    Finished {
        generation: u64,
        result: CompressResult<CompressedResult>,
    },
}

impl JobOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Superseded { generation } | Self::Finished { generation, .. } => *generation,
        }
    }
}

/// Run the job on the blocking pool
pub async fn run(
    codec: Arc<dyn Codec>,
    source: SourceImage,
    quality: Quality,
    generation: u64,
) -> CompressResult<CompressedResult> {
    tokio::task::spawn_blocking(move || {
        run_blocking(codec.as_ref(), source.path(), quality, generation)
    })
    .await?
}

/// Blocking version of the job
fn run_blocking(
    codec: &dyn Codec,
    path: &Path,
    quality: Quality,
    generation: u64,
) -> CompressResult<CompressedResult> {
    let started = Instant::now();

    let original = std::fs::read(path)?;
    let bytes = recompress(codec, &original, quality)?;

    debug!(
        "Job #{} q={} {} -> {} bytes in {:?}",
        generation,
        quality,
        original.len(),
        bytes.len(),
        started.elapsed()
    );

    Ok(CompressedResult::new(bytes, quality, generation))
}
