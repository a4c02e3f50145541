//! Real-time pitch correction bridge
//!
//! Pre-computes corrected audio in a single background worker and serves
//! it to a fixed-budget audio callback. The callback never waits on the
//! worker: it either slices the last published buffer or passes the input
//! through unchanged. The only synchronization crossing the real-time
//! boundary is a short-held lock around the published buffer handle plus
//! atomic flag reads.

use crate::audio::buffer::AudioBuffer;
use crate::contour::smooth_f0;
use crate::project::Project;
use crate::render::{CancelToken, PitchRenderer, RenderError};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Host transport position passed into [`RealtimePitchBridge::process_block`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPosition {
    /// Elapsed playback time in seconds
    pub time_seconds: f64,
}

/// Associations rebound from control threads, snapshotted by the worker
#[derive(Default)]
struct Bindings {
    project: Option<Arc<Project>>,
    renderer: Option<Arc<dyn PitchRenderer>>,
}

/// State shared between the bridge handle and its background worker
struct Shared {
    bindings: Mutex<Bindings>,

    /// Published corrected buffer; the lock is held only for O(1) handle
    /// swaps and clones, never while computing
    published: Mutex<Option<Arc<AudioBuffer>>>,

    /// A corrected buffer is currently published
    ready: AtomicBool,

    /// A worker owns the computation slot
    computing: AtomicBool,

    /// An invalidation is waiting to be picked up by the worker
    pending: AtomicBool,

    /// Cancellation signal for the in-flight render
    cancel: CancelToken,

    /// Playback cursor in seconds, stored as f64 bits
    position_bits: AtomicU64,

    /// Stream sample rate in Hz, stored as f64 bits
    sample_rate_bits: AtomicU64,
}

/// Real-time pitch correction processor
///
/// Owns the transition between unbounded-latency corrected-audio synthesis
/// and the real-time callback. All control-surface methods are safe to call
/// from any non-real-time thread; `process_block`, `is_ready`, `position`
/// and `set_position` are bounded-time and callable from the audio thread.
pub struct RealtimePitchBridge {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    block_size: AtomicUsize,
}

impl RealtimePitchBridge {
    /// Create an idle bridge with nothing bound and nothing published
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                bindings: Mutex::new(Bindings::default()),
                published: Mutex::new(None),
                ready: AtomicBool::new(false),
                computing: AtomicBool::new(false),
                pending: AtomicBool::new(false),
                cancel: CancelToken::new(),
                position_bits: AtomicU64::new(0.0f64.to_bits()),
                sample_rate_bits: AtomicU64::new(44100.0f64.to_bits()),
            }),
            worker: Mutex::new(None),
            block_size: AtomicUsize::new(0),
        }
    }

    /// Rebind the project snapshot used by the next computation
    ///
    /// Does not trigger recomputation; call [`Self::invalidate`] after the
    /// data actually changed.
    pub fn set_project(&self, project: Arc<Project>) {
        if let Ok(mut bindings) = self.shared.bindings.lock() {
            bindings.project = Some(project);
        }
    }

    /// Rebind the renderer used by the next computation
    pub fn set_renderer(&self, renderer: Arc<dyn PitchRenderer>) {
        if let Ok(mut bindings) = self.shared.bindings.lock() {
            bindings.renderer = Some(renderer);
        }
    }

    /// Record stream geometry and drop any buffer rendered for another rate
    ///
    /// Must be called before the real-time path is used and again whenever
    /// the sample rate changes. A buffer rendered at another rate is never
    /// resampled implicitly; it is unpublished and the consumer falls back
    /// to passthrough until the next render completes.
    pub fn prepare_to_play(&self, sample_rate: f64, block_size: usize) {
        self.shared
            .sample_rate_bits
            .store(sample_rate.to_bits(), Ordering::SeqCst);
        self.block_size.store(block_size, Ordering::SeqCst);

        self.shared.ready.store(false, Ordering::SeqCst);
        if let Ok(mut published) = self.shared.published.lock() {
            *published = None;
        }
    }

    /// Schedule a fresh computation; call whenever project data changes
    ///
    /// Coalescing: concurrent calls fold into a single rerun. An in-flight
    /// render is cooperatively cancelled and the worker restarts with the
    /// latest bindings once it observes the cancellation. Never blocks on
    /// the worker.
    pub fn invalidate(&self) {
        // Order matters: raise cancel first so an in-flight render aborts,
        // then mark the rerun. A worker that consumes the pending flag
        // after this point snapshots the latest bindings either way.
        self.shared.cancel.cancel();
        self.shared.pending.store(true, Ordering::SeqCst);

        if !self.shared.computing.swap(true, Ordering::SeqCst) {
            let shared = Arc::clone(&self.shared);
            let handle = std::thread::spawn(move || run_worker(shared));

            if let Ok(mut worker) = self.worker.lock() {
                // The previous worker has released the slot, so it has
                // finished or is about to; the join is near-instant.
                if let Some(old) = worker.take() {
                    let _ = old.join();
                }
                *worker = Some(handle);
            }
        }
    }

    /// Process one audio block; bounded-time, safe on the audio thread
    ///
    /// Copies the published-buffer region at the current (or host-supplied)
    /// position into `output` and returns `true`, or passes `input` through
    /// and returns `false` when no corrected buffer has been published.
    pub fn process_block(
        &self,
        input: &AudioBuffer,
        output: &mut AudioBuffer,
        host_position: Option<&HostPosition>,
    ) -> bool {
        let position = match host_position {
            Some(info) => info.time_seconds,
            None => self.position(),
        };

        if self.shared.ready.load(Ordering::SeqCst) {
            // Clone the Arc handle under the lock; O(1), the worker only
            // ever holds this lock for a pointer swap.
            let buffer = match self.shared.published.lock() {
                Ok(guard) => guard.clone(),
                Err(_) => None,
            };

            if let Some(buffer) = buffer {
                let start = (position.max(0.0) * self.sample_rate()).round() as usize;
                copy_corrected(&buffer, start, output);
                return true;
            }
        }

        output.copy_from(input);
        false
    }

    /// Whether a corrected buffer is currently published (lock-free)
    pub fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::SeqCst)
    }

    /// Playback cursor in seconds (lock-free)
    pub fn position(&self) -> f64 {
        f64::from_bits(self.shared.position_bits.load(Ordering::SeqCst))
    }

    /// Store the playback cursor; settable from any thread (lock-free)
    ///
    /// Ownership of the cursor value is external (a host transport or the
    /// playback engine); the bridge only keeps the latest value.
    pub fn set_position(&self, seconds: f64) {
        self.shared
            .position_bits
            .store(seconds.to_bits(), Ordering::SeqCst);
    }

    /// Stream sample rate recorded by [`Self::prepare_to_play`]
    pub fn sample_rate(&self) -> f64 {
        f64::from_bits(self.shared.sample_rate_bits.load(Ordering::SeqCst))
    }

    /// Block size recorded by [`Self::prepare_to_play`]
    pub fn block_size(&self) -> usize {
        self.block_size.load(Ordering::SeqCst)
    }
}

impl Default for RealtimePitchBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RealtimePitchBridge {
    fn drop(&mut self) {
        self.shared.pending.store(false, Ordering::SeqCst);
        self.shared.cancel.cancel();

        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

/// Copy `output.frames()` frames of `source` starting at `start`
///
/// Zero-fills past the end of the source; when the source has fewer
/// channels than the output, the last source channel is recycled.
fn copy_corrected(source: &AudioBuffer, start: usize, output: &mut AudioBuffer) {
    if source.channels() == 0 {
        output.clear();
        return;
    }

    for ch in 0..output.channels() {
        let src = source.channel(ch.min(source.channels() - 1));
        let dest = output.channel_mut(ch);

        for (i, sample) in dest.iter_mut().enumerate() {
            let idx = start + i;
            *sample = if idx < src.len() { src[idx] } else { 0.0 };
        }
    }
}

/// Background worker: drains pending invalidations, rendering once per batch
///
/// Each iteration snapshots the current bindings, cleans the contour, and
/// asks the renderer for a full corrected buffer, publishing on success.
/// Cancellations discard the partial render and loop; real failures keep
/// the previous published state. On exit the computation slot is released,
/// then the pending flag is re-checked to close the race with a late
/// `invalidate` that saw the slot still taken.
fn run_worker(shared: Arc<Shared>) {
    loop {
        while shared.pending.swap(false, Ordering::SeqCst) {
            shared.cancel.reset();

            let (project, renderer) = match shared.bindings.lock() {
                Ok(bindings) => (bindings.project.clone(), bindings.renderer.clone()),
                Err(_) => (None, None),
            };

            let (project, renderer) = match (project, renderer) {
                (Some(project), Some(renderer)) => (project, renderer),
                _ => {
                    log::debug!("render skipped: project or renderer not bound");
                    continue;
                }
            };

            let contour = &project.contour;
            let cleaned = smooth_f0(contour.pitch_hz(), contour.voiced());
            log::debug!("rendering {} contour frames", cleaned.len());

            match renderer.render(&project, &cleaned, &shared.cancel) {
                Ok(buffer) => {
                    if shared.cancel.is_cancelled() {
                        // A fresh invalidation arrived late in the render;
                        // the pending flag decides the rerun
                        log::debug!("render finished after cancellation, discarding");
                        continue;
                    }

                    if let Ok(mut published) = shared.published.lock() {
                        *published = Some(Arc::new(buffer));
                    }
                    shared.ready.store(true, Ordering::SeqCst);
                    log::debug!("corrected buffer published");
                }
                Err(RenderError::Cancelled) => {
                    log::debug!("render cancelled");
                }
                Err(err) => {
                    log::warn!("render failed, keeping previous buffer: {}", err);
                }
            }
        }

        shared.computing.store(false, Ordering::SeqCst);

        // An invalidate() may have set pending between the last check and
        // the slot release above; reclaim the slot rather than lose it
        if shared.pending.load(Ordering::SeqCst)
            && !shared.computing.swap(true, Ordering::SeqCst)
        {
            continue;
        }

        break;
    }
}
