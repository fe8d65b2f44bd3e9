use parking_lot::Mutex;
use shared::models::{MapBounds, ResolvedBounds};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Debounce window for continuous move events
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Current bounds plus the epoch of the last immediate write
///
/// A debounced value only lands if no immediate write happened after it was
/// queued.
struct BoundsCell {
    epoch: Mutex<u64>,
    tx: watch::Sender<MapBounds>,
}

impl BoundsCell {
    /// Store `bounds` unless identical to the current value
    ///
    /// Bounds that do not resolve are stored as unresolved.
    fn apply(&self, bounds: MapBounds) -> bool {
        let normalized = match bounds.resolve() {
            Ok(_) => bounds,
            Err(e) => {
                if bounds.is_populated() {
                    tracing::warn!(error = %e, "Malformed map bounds, treating as unresolved");
                }
                MapBounds::unresolved()
            }
        };

        let changed = self.tx.send_if_modified(|current| {
            if *current == normalized {
                false
            } else {
                *current = normalized;
                true
            }
        });
        if changed {
            tracing::debug!(bounds = ?normalized, "Map bounds updated");
        }
        changed
    }
}

/// A move event waiting for the debounce window to close
struct QueuedBounds {
    bounds: MapBounds,
    epoch: u64,
}

/// Captures the visible map rectangle
///
/// Two update paths write the same value:
/// - [`set_map_bounds`](Self::set_map_bounds) applies immediately (map idle)
///   and discards any pending debounced value;
/// - [`update_bounds_debounced`](Self::update_bounds_debounced) coalesces
///   move events, last write wins once the window closes.
///
/// Identical bounds never notify subscribers twice.
#[derive(Clone)]
pub struct ViewportBoundsTracker {
    cell: Arc<BoundsCell>,
    debounce_tx: mpsc::UnboundedSender<QueuedBounds>,
    delay: Duration,
}

impl ViewportBoundsTracker {
    /// Create the tracker and its debounce worker
    ///
    /// The worker must be run (see [`BoundsDebouncer::run`]) for the
    /// debounced path to have any effect.
    pub fn new(delay: Duration) -> (Self, BoundsDebouncer) {
        let (tx, _) = watch::channel(MapBounds::unresolved());
        let cell = Arc::new(BoundsCell {
            epoch: Mutex::new(0),
            tx,
        });
        let (debounce_tx, debounce_rx) = mpsc::unbounded_channel();

        let tracker = Self {
            cell: cell.clone(),
            debounce_tx,
            delay,
        };
        let debouncer = BoundsDebouncer {
            cell,
            rx: debounce_rx,
            delay,
        };
        (tracker, debouncer)
    }

    /// Immediate path; returns whether the stored bounds changed
    pub fn set_map_bounds(&self, bounds: MapBounds) -> bool {
        let mut epoch = self.cell.epoch.lock();
        *epoch += 1;
        self.cell.apply(bounds)
    }

    /// Debounced path for continuous move events
    pub fn update_bounds_debounced(&self, bounds: MapBounds) {
        let epoch = *self.cell.epoch.lock();
        if self
            .debounce_tx
            .send(QueuedBounds { bounds, epoch })
            .is_err()
        {
            tracing::warn!("Bounds debouncer stopped, applying move event immediately");
            self.set_map_bounds(bounds);
        }
    }

    /// Map collaborator: continuous move event
    pub fn on_move(&self, bounds: MapBounds) {
        self.update_bounds_debounced(bounds);
    }

    /// Map collaborator: map settled
    pub fn on_idle(&self, bounds: MapBounds) -> bool {
        self.set_map_bounds(bounds)
    }

    /// Current bounds (all `None` until resolved)
    pub fn bounds(&self) -> MapBounds {
        *self.cell.tx.borrow()
    }

    pub fn resolved(&self) -> Option<ResolvedBounds> {
        self.bounds().resolve().ok()
    }

    /// Change notifications for the bounds
    pub fn subscribe(&self) -> watch::Receiver<MapBounds> {
        self.cell.tx.subscribe()
    }

    pub fn debounce_delay(&self) -> Duration {
        self.delay
    }
}

/// Background worker coalescing debounced bounds updates
pub struct BoundsDebouncer {
    cell: Arc<BoundsCell>,
    rx: mpsc::UnboundedReceiver<QueuedBounds>,
    delay: Duration,
}

impl BoundsDebouncer {
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "Bounds debouncer started");

        let mut pending: Option<(MapBounds, u64)> = None;
        let mut debounce_deadline: Option<Instant> = None;

        loop {
            let sleep_until =
                debounce_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    break;
                }

                queued = self.rx.recv() => {
                    match queued {
                        Some(QueuedBounds { bounds, epoch }) => {
                            pending = Some((bounds, epoch));
                            debounce_deadline = Some(Instant::now() + self.delay);
                        }
                        None => break,
                    }
                }

                _ = tokio::time::sleep_until(sleep_until), if debounce_deadline.is_some() => {
                    debounce_deadline = None;
                    if let Some((bounds, queued_epoch)) = pending.take() {
                        let epoch = self.cell.epoch.lock();
                        if *epoch == queued_epoch {
                            self.cell.apply(bounds);
                        } else {
                            tracing::debug!("Debounced bounds superseded by an immediate update");
                        }
                    }
                }
            }
        }

        tracing::debug!("Bounds debouncer stopped");
    }
}
