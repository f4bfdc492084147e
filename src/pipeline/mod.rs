/// Debounced recompression pipeline
///
/// Every request bumps a generation counter. A job sleeps for the debounce
/// delay, then only starts if its generation is still the newest one; the
/// caller publishes a finished result only if it is still the newest too.
/// The counter is the single "pending job" slot: bumping it cancels
/// whatever was scheduled before, and there is no window in which a
/// cancelled job can still start.

pub mod job;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::codec::Codec;
use crate::error::CompressResult;
use crate::state::data::{CompressedResult, SourceImage};
use crate::state::quality::Quality;

pub use job::JobOutcome;

pub struct RecompressPipeline {
    codec: Arc<dyn Codec>,
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl RecompressPipeline {
    pub fn new(codec: Arc<dyn Codec>, delay: Duration) -> Self {
        Self {
            codec,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule a job for `source` at `quality`, superseding any pending one
    ///
    /// The returned future owns everything it needs and resolves once the
    /// job has either been superseded or run.
    pub fn request(
        &self,
        source: &SourceImage,
        quality: Quality,
    ) -> impl Future<Output = JobOutcome> + Send + 'static {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Scheduled job #{} (q={}) for {}", generation, quality, source.path.display());

        let latest = Arc::clone(&self.generation);
        let codec = Arc::clone(&self.codec);
        let source = source.clone();
        let delay = self.delay;

        async move {
            tokio::time::sleep(delay).await;

            if latest.load(Ordering::SeqCst) != generation {
                debug!("Job #{} superseded before start", generation);
                return JobOutcome::Superseded { generation };
            }

            let result = job::run(codec, source, quality, generation).await;
            JobOutcome::Finished { generation, result }
        }
    }

    /// Drop every pending or running job without scheduling a new one
    pub fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Pipeline invalidated at #{}", generation);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Filter an outcome down to what should be shown
    ///
    /// Returns None for superseded jobs and for results that finished after
    /// a newer request was made.
    pub fn accept(&self, outcome: JobOutcome) -> Option<CompressResult<CompressedResult>> {
        match outcome {
            JobOutcome::Superseded { .. } => None,
            JobOutcome::Finished { generation, result } => {
                if !self.is_current(generation) {
                    debug!("Dropping stale result from job #{}", generation);
                    return None;
                }
                if let Ok(compressed) = &result {
                    info!(
                        "🗜️  Compressed at q={} -> {} KB",
                        compressed.quality,
                        compressed.size_kb()
                    );
                }
                Some(result)
            }
        }
    }
}

impl std::fmt::Debug for RecompressPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecompressPipeline")
            .field("delay", &self.delay)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}
