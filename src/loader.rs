//! Background shape extraction.
//!
//! Decoding images and rasterizing text can take longer than a frame, so each
//! morph request runs on its own worker thread. Results come back over a
//! channel tagged with the request generation they were issued for; the
//! engine drops any batch whose generation is no longer the latest.
//!
//! ```ignore
//! let loader = ShapeLoader::new(RasterScanner::default(), rasterizer);
//! loader.submit(1, vec![SourceConfig::text("HI")]);
//! // ... later, once per frame
//! while let Some(batch) = loader.try_recv() {
//!     // batch.generation, batch.shapes
//! }
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::raster::RasterScanner;
use crate::shape::{Shape, SourceConfig};
use crate::text::TextRasterizer;

/// The resolved result of one request.
#[derive(Debug, Clone)]
pub struct ExtractionBatch {
    pub generation: u64,
    /// Valid shapes in request order. Sources that produced no points are absent.
    pub shapes: Vec<Shape>,
}

/// Extract every source and keep the ones with at least one point.
///
/// A source whose extraction panics is dropped like any other failure.
pub fn build_shapes(
    scanner: &RasterScanner,
    rasterizer: &dyn TextRasterizer,
    sources: &[SourceConfig],
) -> Vec<Shape> {
    sources
        .iter()
        .filter_map(|source| {
            let extraction =
                panic::catch_unwind(AssertUnwindSafe(|| scanner.extract(source, rasterizer)));
            match extraction {
                Ok(extraction) => Shape::from_points(extraction.points, source.options.kind),
                Err(_) => {
                    log::warn!(
                        "extraction panicked, dropping {:?} source '{}'",
                        source.options.kind,
                        source.source
                    );
                    None
                }
            }
        })
        .collect()
}

/// Runs extraction requests off the frame thread.
pub struct ShapeLoader {
    scanner: RasterScanner,
    rasterizer: Arc<dyn TextRasterizer>,
    sender: Sender<ExtractionBatch>,
    receiver: Receiver<ExtractionBatch>,
    workers: Vec<JoinHandle<()>>,
}

impl ShapeLoader {
    pub fn new(scanner: RasterScanner, rasterizer: Arc<dyn TextRasterizer>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            scanner,
            rasterizer,
            sender,
            receiver,
            workers: Vec::new(),
        }
    }

    /// Start extracting `sources` for request `generation`.
    pub fn submit(&mut self, generation: u64, sources: Vec<SourceConfig>) {
        self.workers.retain(|handle| !handle.is_finished());

        let scanner = self.scanner;
        let rasterizer = Arc::clone(&self.rasterizer);
        let sender = self.sender.clone();
        let job = move || {
            let shapes = build_shapes(&scanner, rasterizer.as_ref(), &sources);
            log::debug!(
                "request #{generation} resolved: {} of {} source(s) usable",
                shapes.len(),
                sources.len()
            );
            // The receiver only goes away when the loader is dropped.
            let _ = sender.send(ExtractionBatch { generation, shapes });
        };

        match thread::Builder::new()
            .name(format!("morphfield-extract-{generation}"))
            .spawn(job)
        {
            Ok(handle) => self.workers.push(handle),
            Err(e) => log::error!("failed to spawn extraction worker for request #{generation}: {e}"),
        }
    }

    /// Take a finished batch without blocking.
    pub fn try_recv(&self) -> Option<ExtractionBatch> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for a finished batch.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ExtractionBatch> {
        match self.receiver.recv_timeout(timeout) {
            Ok(batch) => Some(batch),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Number of workers that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.workers.iter().filter(|h| !h.is_finished()).count()
    }

    /// Stop accepting results. Finished workers are joined; workers still
    /// running are detached and their results dropped, so a stalled decode
    /// never blocks the caller.
    pub fn shutdown(self) {
        let (finished, running): (Vec<_>, Vec<_>) =
            self.workers.into_iter().partition(|h| h.is_finished());
        for handle in finished {
            if handle.join().is_err() {
                log::warn!("an extraction worker panicked");
            }
        }
        if !running.is_empty() {
            log::debug!("detaching {} running extraction worker(s)", running.len());
        }
    }
}
