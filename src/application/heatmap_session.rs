//! Heatmap Session
//!
//! Holds the most recent heatmap for a presentation layer and guards it
//! against out-of-order completion. Every request is stamped with a
//! generation number; a result is published only while its generation is
//! the newest one issued, so a slow earlier request can never replace the
//! output of a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::domain::{CorrelationReport, Ticker};
use crate::ports::AccessToken;
use super::correlation_engine::CorrelationEngine;

/// A published heatmap with the request parameters that produced it
#[derive(Debug, Clone)]
pub struct HeatmapSnapshot {
    pub generation: u64,
    pub window_minutes: u32,
    pub report: CorrelationReport,
    pub computed_at: DateTime<Utc>,
}

type SnapshotSlot = Option<Arc<HeatmapSnapshot>>;

/// Latest-wins wrapper around the correlation engine
#[derive(Clone)]
pub struct HeatmapSession {
    engine: Arc<CorrelationEngine>,
    generation: Arc<AtomicU64>,
    latest: Arc<watch::Sender<SnapshotSlot>>,
    in_flight: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl HeatmapSession {
    pub fn new(engine: CorrelationEngine) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            engine: Arc::new(engine),
            generation: Arc::new(AtomicU64::new(0)),
            latest: Arc::new(latest),
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Issue a new generation, invalidating every earlier one
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Publish a finished report. Returns false when the report is stale.
    pub fn publish(&self, generation: u64, window_minutes: u32, report: CorrelationReport) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(
                "Discarding heatmap generation {} (current is {})",
                generation,
                self.current_generation()
            );
            return false;
        }

        let snapshot = Arc::new(HeatmapSnapshot {
            generation,
            window_minutes,
            report,
            computed_at: Utc::now(),
        });

        self.latest.send_if_modified(|slot| {
            if slot.as_ref().is_some_and(|s| s.generation > generation) {
                return false;
            }
            *slot = Some(snapshot);
            true
        })
    }

    /// Compute inline and publish if still current.
    /// Returns the snapshot when it was published, `None` when superseded.
    pub async fn request(
        &self,
        credential: &AccessToken,
        tickers: &[Ticker],
        window_minutes: u32,
    ) -> Option<Arc<HeatmapSnapshot>> {
        let generation = self.begin();
        let report = self.engine.compute_matrix(credential, tickers, window_minutes).await;

        if self.publish(generation, window_minutes, report) {
            self.latest()
        } else {
            None
        }
    }

    /// Start a background computation, aborting the previous one.
    /// Returns the generation assigned to the new request.
    pub async fn refresh(&self, credential: AccessToken, tickers: Vec<Ticker>, window_minutes: u32) -> u64 {
        // Held across begin and replace so handles are swapped in generation order
        let mut in_flight = self.in_flight.lock().await;
        let generation = self.begin();
        let session = self.clone();

        let handle = tokio::spawn(async move {
            let report = session
                .engine
                .compute_matrix(&credential, &tickers, window_minutes)
                .await;
            session.publish(generation, window_minutes, report);
        });

        if let Some(previous) = in_flight.replace(handle) {
            previous.abort();
        }

        generation
    }

    /// Wait for the most recent background computation to finish
    pub async fn settle(&self) {
        let handle = self.in_flight.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!("Heatmap computation task failed: {}", e);
                }
            }
        }
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Option<Arc<HeatmapSnapshot>> {
        self.latest.borrow().clone()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<SnapshotSlot> {
        self.latest.subscribe()
    }
}
