//! LayoutSaveWorker - background writer for the table layout key
//!
//! Drag gestures produce a burst of position updates; the worker keeps only
//! the latest table list and writes it once the burst has been quiet for
//! the requested delay (trailing edge). Immediate requests write at once
//! and drop anything pending.

use super::LayoutSink;
use crate::storage::SessionPersistence;
use shared::models::TableLayout;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
enum SaveRequest {
    Debounced {
        tables: Vec<TableLayout>,
        delay: Duration,
    },
    Immediate(Vec<TableLayout>),
}

pub struct LayoutSaveWorker {
    persistence: SessionPersistence,
    rx: mpsc::UnboundedReceiver<SaveRequest>,
    shutdown: CancellationToken,
}

/// Sending half handed to the layout store
#[derive(Clone)]
pub struct DebouncedLayoutSink {
    tx: mpsc::UnboundedSender<SaveRequest>,
}

impl LayoutSaveWorker {
    pub fn new(
        persistence: SessionPersistence,
        shutdown: CancellationToken,
    ) -> (Self, DebouncedLayoutSink) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                persistence,
                rx,
                shutdown,
            },
            DebouncedLayoutSink { tx },
        )
    }

    /// Run until cancelled or until every sink is dropped
    ///
    /// Requests already queued when shutdown fires are still applied, then
    /// the pending tables are flushed.
    pub async fn run(mut self) {
        tracing::info!("LayoutSaveWorker started");

        let mut pending: Option<Vec<TableLayout>> = None;
        let mut deadline: Option<Instant> = None;

        loop {
            let sleep_until = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                biased;

                request = self.rx.recv() => {
                    match request {
                        Some(request) => self.apply(request, &mut pending, &mut deadline),
                        None => {
                            tracing::debug!("Layout sinks dropped, LayoutSaveWorker stopping");
                            if let Some(tables) = pending.take() {
                                self.write(&tables);
                            }
                            break;
                        }
                    }
                }

                _ = self.shutdown.cancelled() => {
                    tracing::info!("LayoutSaveWorker shutting down");
                    // 排空队列
                    while let Ok(request) = self.rx.try_recv() {
                        self.apply(request, &mut pending, &mut deadline);
                    }
                    if let Some(tables) = pending.take() {
                        self.write(&tables);
                    }
                    break;
                }

                _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                    if let Some(tables) = pending.take() {
                        self.write(&tables);
                    }
                    deadline = None;
                }
            }
        }

        tracing::info!("LayoutSaveWorker stopped");
    }

    fn apply(
        &self,
        request: SaveRequest,
        pending: &mut Option<Vec<TableLayout>>,
        deadline: &mut Option<Instant>,
    ) {
        match request {
            SaveRequest::Debounced { tables, delay } => {
                *pending = Some(tables);
                *deadline = Some(Instant::now() + delay);
            }
            SaveRequest::Immediate(tables) => {
                *pending = None;
                *deadline = None;
                self.write(&tables);
            }
        }
    }

    fn write(&self, tables: &[TableLayout]) {
        match self.persistence.save_tables(tables) {
            Ok(()) => tracing::debug!(count = tables.len(), "Table layout saved"),
            Err(e) => tracing::warn!(error = %e, "Failed to save table layout"),
        }
    }
}

impl LayoutSink for DebouncedLayoutSink {
    fn schedule(&self, tables: &[TableLayout], delay: Duration) {
        let request = SaveRequest::Debounced {
            tables: tables.to_vec(),
            delay,
        };
        if self.tx.send(request).is_err() {
            tracing::warn!("LayoutSaveWorker is gone, layout change not saved");
        }
    }

    fn write_now(&self, tables: &[TableLayout]) {
        if self.tx.send(SaveRequest::Immediate(tables.to_vec())).is_err() {
            tracing::warn!("LayoutSaveWorker is gone, layout change not saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RedbStore;
    use shared::models::Position;
    use std::sync::Arc;

    fn setup() -> (SessionPersistence, CancellationToken) {
        let store = RedbStore::open_in_memory().unwrap();
        (SessionPersistence::new(Arc::new(store)), CancellationToken::new())
    }

    fn layout(id: &str, x: f64) -> TableLayout {
        TableLayout::new(id, 1, Position::new(x, 0.0))
    }

    #[tokio::test]
    async fn test_burst_is_written_once_with_latest_tables() {
        let (persistence, shutdown) = setup();
        let (worker, sink) = LayoutSaveWorker::new(persistence.clone(), shutdown.clone());
        let handle = tokio::spawn(worker.run());

        for x in [20.0, 40.0, 60.0] {
            sink.schedule(&[layout("t1", x)], Duration::from_millis(30));
        }
        // Still inside the debounce window
        assert!(persistence.load_tables().is_none());

        tokio::time::sleep(Duration::from_millis(150)).await;
        let saved = persistence.load_tables().unwrap();
        assert_eq!(saved[0].position.x, 60.0);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_immediate_write_drops_pending() {
        let (persistence, shutdown) = setup();
        let (worker, sink) = LayoutSaveWorker::new(persistence.clone(), shutdown.clone());
        let handle = tokio::spawn(worker.run());

        sink.schedule(&[layout("t1", 20.0)], Duration::from_millis(30));
        sink.write_now(&[layout("t2", 0.0)]);
        tokio::time::sleep(Duration::from_millis(150)).await;

        let saved = persistence.load_tables().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, "t2");

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending() {
        let (persistence, shutdown) = setup();
        let (worker, sink) = LayoutSaveWorker::new(persistence.clone(), shutdown.clone());
        let handle = tokio::spawn(worker.run());

        sink.schedule(&[layout("t1", 80.0)], Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(persistence.load_tables().unwrap()[0].position.x, 80.0);
    }

    #[tokio::test]
    async fn test_cancel_right_after_send_still_writes() {
        let (persistence, shutdown) = setup();
        let (worker, sink) = LayoutSaveWorker::new(persistence.clone(), shutdown.clone());
        let handle = tokio::spawn(worker.run());

        sink.write_now(&[layout("t1", 40.0)]);
        sink.schedule(&[layout("t2", 60.0)], Duration::from_secs(60));
        shutdown.cancel();
        handle.await.unwrap();

        let saved = persistence.load_tables().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, "t2");
    }

    #[tokio::test]
    async fn test_cancel_before_worker_starts_keeps_queued_write() {
        let (persistence, shutdown) = setup();
        let (worker, sink) = LayoutSaveWorker::new(persistence.clone(), shutdown.clone());

        sink.write_now(&[layout("t1", 40.0)]);
        shutdown.cancel();
        worker.run().await;

        assert_eq!(persistence.load_tables().unwrap()[0].id, "t1");
    }

    #[tokio::test]
    async fn test_dropping_sink_stops_worker() {
        let (persistence, shutdown) = setup();
        let (worker, sink) = LayoutSaveWorker::new(persistence.clone(), shutdown);
        let handle = tokio::spawn(worker.run());

        sink.schedule(&[layout("t1", 100.0)], Duration::from_secs(60));
        drop(sink);
        handle.await.unwrap();

        assert_eq!(persistence.load_tables().unwrap()[0].position.x, 100.0);
    }
}
