//! The monitor: two independent loops over one shared state.
//!
//! # Responsibilities
//! - Fast loop: probe → reliability window → RTT history → classify → trim → persist → publish
//! - Slow loop: download → history → trim → persist → publish
//! - Teardown: stop both loops, abandon in-flight ticks, persist once more
//!
//! # Design Decisions
//! - Network I/O happens outside the state lock, so one loop's request can
//!   overlap the other loop's tick body
//! - Each tick body (record, classify, persist, publish) runs under the lock,
//!   keeping a single writer for state and the persisted slot
//! - No error stops a loop: failures become failure samples or log lines

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use tokio_util::sync::CancellationToken;

use crate::config::{MonitorConfig, PresentationConfig, ThresholdConfig, TimingConfig};
use crate::health::{HealthClassifier, HealthStatus, Readings};
use crate::history::{HistoryStore, StorageError};
use crate::monitor::presentation::{
    DashboardUpdate, MetricsView, PlotSeries, PresentationSink, RedrawGate,
};
use crate::monitor::state::MonitorState;
use crate::observability::metrics;
use crate::probe::{DownloadOutcome, LatencyProbe, ProbeOutcome, ThroughputProbe};
use crate::schedule::{Clock, Scheduler, TaskHandle};

struct Shared<P, D> {
    latency: P,
    throughput: D,
    state: Mutex<MonitorState>,
    classifier: ArcSwap<HealthClassifier>,
    store: HistoryStore,
    sink: Arc<dyn PresentationSink>,
    clock: Arc<dyn Clock>,
    timing: TimingConfig,
    presentation: PresentationConfig,
    redraw: RedrawGate,
    network: CancellationToken,
}

/// Network health monitor.
pub struct Monitor<P, D> {
    shared: Arc<Shared<P, D>>,
}

impl<P, D> Clone for Monitor<P, D> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<P: LatencyProbe, D: ThroughputProbe> Monitor<P, D> {
    /// Build a monitor, restoring whatever history the store holds.
    ///
    /// A store that cannot be read is logged and the monitor starts empty.
    pub fn new(
        config: &MonitorConfig,
        latency: P,
        throughput: D,
        store: HistoryStore,
        sink: Arc<dyn PresentationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let window = config.reliability.window_size;
        let now = clock.now_ms();

        let state = match store.load(now, config.timing.retention_ms, window) {
            Ok(Some(doc)) => MonitorState::from_document(doc, window),
            Ok(None) => MonitorState::new(window),
            Err(e) => {
                tracing::error!(error = %e, "History unavailable, starting empty");
                metrics::record_storage_failure("load");
                MonitorState::new(window)
            }
        };

        Self {
            shared: Arc::new(Shared {
                latency,
                throughput,
                state: Mutex::new(state),
                classifier: ArcSwap::from_pointee(HealthClassifier::new(config.thresholds)),
                store,
                sink,
                clock,
                timing: config.timing.clone(),
                presentation: config.presentation.clone(),
                redraw: RedrawGate::new(
                    config.presentation.chart_refresh_ms,
                    config.timing.probe_interval_ms,
                ),
                network: CancellationToken::new(),
            }),
        }
    }

    /// Start both loops. Each runs its first tick immediately.
    pub fn start(&self) -> MonitorHandle<P, D> {
        self.publish_restored();

        let scheduler = Scheduler::new();

        let monitor = self.clone();
        let probe = scheduler.every("probe", self.shared.timing.probe_interval(), move || {
            let monitor = monitor.clone();
            async move {
                monitor.probe_tick().await;
            }
        });

        let monitor = self.clone();
        let download = scheduler.every("download", self.shared.timing.download_interval(), move || {
            let monitor = monitor.clone();
            async move {
                monitor.download_tick().await;
            }
        });

        MonitorHandle {
            monitor: self.clone(),
            scheduler,
            probe,
            download,
        }
    }

    /// One fast-loop iteration.
    pub async fn probe_tick(&self) -> ProbeOutcome {
        let s = &self.shared;
        let outcome = s.latency.probe(&s.network).await;
        let now = s.clock.now_ms();
        let classifier = s.classifier.load();

        let mut state = self.lock_state();
        state.record_probe(outcome);

        let readings = Readings {
            rtt_ms: outcome.rtt_sample(),
            success_pct: state.reliability.success_rate(),
            download_kbps: state.download_history.latest_value(),
        };
        let status = classifier.classify(&readings);
        if let Some(previous) = state.observe_status(status) {
            tracing::info!(from = %previous, to = %status, ?readings, "Health status changed");
        }
        tracing::debug!(ok = outcome.ok, rtt_ms = ?outcome.rtt, success_pct = ?readings.success_pct, status = %status, "Probe tick");

        state.trim(now, s.timing.retention_ms);
        state.last_update_ms = Some(now);
        self.persist_locked(&state, now);

        let update = DashboardUpdate {
            metrics: state.metrics(),
            status,
            series: s.redraw.should_redraw(now).then(|| self.plot(&state)),
            last_update_ms: now,
            next_download_ms: state.next_download_ms(s.timing.download_interval_ms),
        };
        s.sink.publish(&update);
        metrics::record_history(state.rtt_history.len(), state.download_history.len());
        drop(state);

        metrics::record_probe(&outcome);
        metrics::record_health(status, readings.success_pct);
        outcome
    }

    /// One slow-loop iteration.
    pub async fn download_tick(&self) -> DownloadOutcome {
        let s = &self.shared;
        let outcome = s.throughput.measure(&s.network).await;
        let now = s.clock.now_ms();

        let mut state = self.lock_state();
        let stored = state.record_download(outcome);
        tracing::debug!(ok = outcome.ok, speed_kbps = ?outcome.speed, "Download tick");

        state.trim(now, s.timing.retention_ms);
        state.last_update_ms = Some(now);
        self.persist_locked(&state, now);

        let update = DashboardUpdate {
            metrics: state.metrics(),
            status: state.last_status,
            series: stored.then(|| self.plot(&state)),
            last_update_ms: now,
            next_download_ms: state.next_download_ms(s.timing.download_interval_ms),
        };
        s.sink.publish(&update);
        metrics::record_history(state.rtt_history.len(), state.download_history.len());
        drop(state);

        metrics::record_download(&outcome);
        outcome
    }

    /// Write the current state to the store.
    pub fn persist(&self) -> Result<(), StorageError> {
        let now = self.shared.clock.now_ms();
        let state = self.lock_state();
        self.shared.store.save(&state.to_document(now))
    }

    /// Swap in new threshold tables; the next fast tick uses them.
    pub fn apply_thresholds(&self, thresholds: ThresholdConfig) {
        self.shared
            .classifier
            .store(Arc::new(HealthClassifier::new(thresholds)));
        tracing::info!(?thresholds, "Applied new health thresholds");
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        *self.shared.classifier.load().thresholds()
    }

    pub fn metrics(&self) -> MetricsView {
        self.lock_state().metrics()
    }

    pub fn status(&self) -> HealthStatus {
        self.lock_state().last_status
    }

    /// A copy of the current state.
    pub fn state(&self) -> MonitorState {
        self.lock_state().clone()
    }

    /// Push restored history to the sink before the first tick lands.
    fn publish_restored(&self) {
        let state = self.lock_state();
        let update = DashboardUpdate {
            metrics: state.metrics(),
            status: state.last_status,
            series: Some(self.plot(&state)),
            last_update_ms: self.shared.clock.now_ms(),
            next_download_ms: state.next_download_ms(self.shared.timing.download_interval_ms),
        };
        self.shared.sink.publish(&update);
    }

    fn plot(&self, state: &MonitorState) -> PlotSeries {
        PlotSeries::from_history(
            &state.rtt_history,
            &state.download_history,
            self.shared.presentation.max_plot_points,
        )
    }

    fn persist_locked(&self, state: &MonitorState, now: u64) {
        if let Err(e) = self.shared.store.save(&state.to_document(now)) {
            tracing::error!(error = %e, "Failed to persist history, continuing in memory");
            metrics::record_storage_failure("save");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Running loops of a started monitor.
pub struct MonitorHandle<P, D> {
    monitor: Monitor<P, D>,
    scheduler: Scheduler,
    probe: TaskHandle,
    download: TaskHandle,
}

impl<P: LatencyProbe, D: ThroughputProbe> MonitorHandle<P, D> {
    pub fn monitor(&self) -> &Monitor<P, D> {
        &self.monitor
    }

    /// Stop scheduling fast-loop ticks. The slow loop is unaffected.
    pub fn cancel_probe_loop(&self) {
        self.scheduler.cancel(&self.probe);
    }

    /// Stop scheduling slow-loop ticks. The fast loop is unaffected.
    pub fn cancel_download_loop(&self) {
        self.scheduler.cancel(&self.download);
    }

    pub fn probe_loop_cancelled(&self) -> bool {
        self.probe.is_cancelled()
    }

    pub fn download_loop_cancelled(&self) -> bool {
        self.download.is_cancelled()
    }

    /// Stop both loops, abandon in-flight ticks and persist a final time.
    pub async fn shutdown(self) -> Result<(), StorageError> {
        tracing::info!("Monitor shutting down");
        self.scheduler.cancel_all();
        self.monitor.shared.network.cancel();
        self.probe.abort();
        self.download.abort();

        self.probe.stopped().await;
        self.download.stopped().await;

        let result = self.monitor.persist();
        match &result {
            Ok(()) => tracing::info!("Final history persisted"),
            Err(e) => {
                tracing::error!(error = %e, "Final persist failed");
                metrics::record_storage_failure("save");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{PersistedDocument, TimeSeriesPoint};
    use crate::monitor::presentation::{PlotPoint, SnapshotBoard};
    use crate::probe::ErrorKind;
    use crate::schedule::ManualClock;
    use std::collections::VecDeque;

    const START: u64 = 1_700_000_000_000;

    /// Replays a fixed script of outcomes, repeating the last one.
    struct Scripted<T> {
        outcomes: Mutex<VecDeque<T>>,
        last: Mutex<Option<T>>,
    }

    impl<T: Copy> Scripted<T> {
        fn new(outcomes: impl IntoIterator<Item = T>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                last: Mutex::new(None),
            }
        }

        fn next(&self) -> Option<T> {
            let next = self.outcomes.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if next.is_some() {
                *last = next;
            }
            *last
        }
    }

    impl LatencyProbe for Scripted<ProbeOutcome> {
        async fn probe(&self, _cancel: &CancellationToken) -> ProbeOutcome {
            self.next().unwrap_or(ProbeOutcome::failure(ErrorKind::Other, 0))
        }
    }

    impl ThroughputProbe for Scripted<DownloadOutcome> {
        async fn measure(&self, _cancel: &CancellationToken) -> DownloadOutcome {
            self.next().unwrap_or(DownloadOutcome::failure(ErrorKind::Other, 0))
        }
    }

    type TestMonitor = Monitor<Scripted<ProbeOutcome>, Scripted<DownloadOutcome>>;

    fn monitor(
        probes: Vec<ProbeOutcome>,
        downloads: Vec<DownloadOutcome>,
        store: HistoryStore,
        clock: Arc<ManualClock>,
    ) -> (TestMonitor, Arc<SnapshotBoard>) {
        let board = Arc::new(SnapshotBoard::new());
        let monitor = Monitor::new(
            &MonitorConfig::default(),
            Scripted::new(probes),
            Scripted::new(downloads),
            store,
            board.clone(),
            clock,
        );
        (monitor, board)
    }

    #[tokio::test]
    async fn test_end_to_end_good_then_bad_rtt() {
        let clock = Arc::new(ManualClock::new(START));
        let (monitor, board) = monitor(
            vec![ProbeOutcome::success(150, START), ProbeOutcome::success(600, START + 1_000)],
            vec![DownloadOutcome::success(300, START)],
            HistoryStore::in_memory("netmon_data"),
            clock.clone(),
        );

        monitor.download_tick().await;
        monitor.probe_tick().await;
        assert_eq!(monitor.status(), HealthStatus::Good);

        clock.advance(1_000);
        monitor.probe_tick().await;
        assert_eq!(monitor.status(), HealthStatus::Bad);

        let snapshot = board.snapshot();
        assert_eq!(snapshot.status, HealthStatus::Bad);
        assert_eq!(snapshot.metrics.rtt_ms, Some(600));
        assert_eq!(snapshot.metrics.success_pct, Some(100));
        assert_eq!(snapshot.metrics.download_kbps, Some(300));
        assert_eq!(snapshot.next_download_ms, Some(START + 1_800_000));
    }

    #[tokio::test]
    async fn test_failed_probe_lowers_success_rate_and_drops_rtt_vote() {
        let clock = Arc::new(ManualClock::new(START));
        let mut probes = vec![ProbeOutcome::success(100, START); 7];
        probes.push(ProbeOutcome::failure(ErrorKind::Timeout, START));
        let (monitor, _board) = monitor(probes, vec![], HistoryStore::in_memory("k"), clock);

        for _ in 0..7 {
            monitor.probe_tick().await;
        }
        assert_eq!(monitor.status(), HealthStatus::Good);

        let outcome = monitor.probe_tick().await;
        assert!(!outcome.ok);
        // 7/8 = 88% → bad, RTT casts no vote this tick.
        assert_eq!(monitor.metrics().success_pct, Some(88));
        assert_eq!(monitor.status(), HealthStatus::Bad);
        assert_eq!(monitor.state().rtt_history.len(), 7);
    }

    #[tokio::test]
    async fn test_download_classified_from_latest_history_value() {
        let clock = Arc::new(ManualClock::new(START));
        let (monitor, _board) = monitor(
            vec![ProbeOutcome::success(150, START)],
            vec![DownloadOutcome::success(150, START)],
            HistoryStore::in_memory("k"),
            clock,
        );
        let mut thresholds = ThresholdConfig::default();
        thresholds.success.good_pct = 100;
        monitor.apply_thresholds(thresholds);

        monitor.download_tick().await;
        monitor.probe_tick().await;
        assert_eq!(monitor.status(), HealthStatus::Warn);
        assert_eq!(monitor.thresholds().success.good_pct, 100);
    }

    #[tokio::test]
    async fn test_every_tick_persists_and_restores() {
        let clock = Arc::new(ManualClock::new(START));
        let store = HistoryStore::in_memory("netmon_data");
        let (monitor, _board) = monitor(
            vec![ProbeOutcome::success(42, START)],
            vec![DownloadOutcome::success(512, START)],
            store.clone(),
            clock.clone(),
        );
        monitor.probe_tick().await;
        monitor.download_tick().await;

        let doc = store.load(START, 86_400_000, 8).unwrap().unwrap();
        assert_eq!(doc.rtt_history.latest_value(), Some(42));
        assert_eq!(doc.download_history.latest_value(), Some(512));
        assert_eq!(doc.last_probe_results.len(), 1);
        assert_eq!(doc.last_save, START);

        let (restored, _board) = monitor_with_store(store, clock);
        assert_eq!(restored.metrics().rtt_ms, Some(42));
        assert_eq!(restored.metrics().success_pct, Some(100));
    }

    fn monitor_with_store(store: HistoryStore, clock: Arc<ManualClock>) -> (TestMonitor, Arc<SnapshotBoard>) {
        monitor(vec![], vec![], store, clock)
    }

    #[tokio::test]
    async fn test_restore_applies_retention() {
        let clock = Arc::new(ManualClock::new(START));
        let store = HistoryStore::in_memory("netmon_data");
        let mut doc = PersistedDocument::default();
        doc.rtt_history.append(TimeSeriesPoint::new(START - 86_400_000, 10));
        doc.rtt_history.append(TimeSeriesPoint::new(START - 5_000, 20));
        for i in 0..30 {
            doc.last_probe_results.push(ProbeOutcome::success(20, START - 30 + i));
        }
        store.save(&doc).unwrap();

        let (monitor, _board) = monitor_with_store(store, clock);
        let state = monitor.state();
        assert_eq!(state.rtt_history.len(), 1);
        assert_eq!(state.reliability.len(), 8);
    }

    #[tokio::test]
    async fn test_ticks_trim_expired_points() {
        let clock = Arc::new(ManualClock::new(START));
        let (monitor, _board) = monitor(
            vec![
                ProbeOutcome::success(30, START),
                ProbeOutcome::success(31, START + 86_400_000),
            ],
            vec![],
            HistoryStore::in_memory("k"),
            clock.clone(),
        );
        monitor.probe_tick().await;
        clock.set(START + 86_400_000);
        monitor.probe_tick().await;

        let points = monitor.state().rtt_history.points().to_vec();
        assert_eq!(points, vec![TimeSeriesPoint::new(START + 86_400_000, 31)]);
    }

    /// A slot that fails every read and write.
    struct UnavailableStore;

    impl crate::history::BlobStore for UnavailableStore {
        fn get(&self, _key: &str) -> std::io::Result<Option<String>> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume"))
        }

        fn set(&self, _key: &str, _value: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume"))
        }
    }

    #[tokio::test]
    async fn test_unavailable_storage_keeps_monitoring_in_memory() {
        let clock = Arc::new(ManualClock::new(START));
        let store = HistoryStore::new(Arc::new(UnavailableStore), "netmon_data");
        let (monitor, board) = monitor(
            vec![
                ProbeOutcome::success(120, START),
                ProbeOutcome::success(130, START + 1_000),
                ProbeOutcome::success(140, START + 2_000),
            ],
            vec![DownloadOutcome::success(400, START)],
            store,
            clock.clone(),
        );

        let state = monitor.state();
        assert!(state.rtt_history.is_empty());
        assert!(state.download_history.is_empty());
        assert!(state.reliability.is_empty());

        monitor.download_tick().await;
        for _ in 0..3 {
            monitor.probe_tick().await;
            clock.advance(1_000);
        }

        let state = monitor.state();
        assert_eq!(state.rtt_history.len(), 3);
        assert_eq!(state.download_history.len(), 1);
        assert_eq!(state.reliability.success_rate(), Some(100));
        assert_eq!(monitor.status(), HealthStatus::Good);
        assert_eq!(board.snapshot().metrics.rtt_ms, Some(140));
        assert!(monitor.persist().is_err());
    }

    /// Keeps every update and forwards it to a board.
    #[derive(Default)]
    struct RecordingSink {
        updates: Mutex<Vec<DashboardUpdate>>,
        board: SnapshotBoard,
    }

    impl PresentationSink for RecordingSink {
        fn publish(&self, update: &DashboardUpdate) {
            self.updates.lock().unwrap().push(update.clone());
            self.board.publish(update);
        }
    }

    #[tokio::test]
    async fn test_fast_ticks_attach_series_only_when_redraw_is_due() {
        // START is a multiple of the 10s refresh, so the first tick is due.
        let clock = Arc::new(ManualClock::new(START));
        let sink = Arc::new(RecordingSink::default());
        let monitor = Monitor::new(
            &MonitorConfig::default(),
            Scripted::new([
                ProbeOutcome::success(100, START),
                ProbeOutcome::success(110, START + 1_000),
            ]),
            Scripted::new(Vec::<DownloadOutcome>::new()),
            HistoryStore::in_memory("k"),
            sink.clone(),
            clock.clone(),
        );

        monitor.probe_tick().await;
        clock.set(START + 1_000);
        monitor.probe_tick().await;

        let updates = sink.updates.lock().unwrap().clone();
        assert_eq!(updates.len(), 2);
        let first = updates[0].series.as_ref().unwrap();
        assert_eq!(first.rtt, vec![PlotPoint { x: START, y: 100.0 }]);
        assert!(updates[1].series.is_none());
        assert_eq!(updates[1].metrics.rtt_ms, Some(110));

        // The board keeps the last drawn series while metrics move on.
        let snapshot = sink.board.snapshot();
        assert_eq!(snapshot.metrics.rtt_ms, Some(110));
        assert_eq!(snapshot.series.rtt, vec![PlotPoint { x: START, y: 100.0 }]);
        assert_eq!(snapshot.last_update_ms, Some(START + 1_000));
    }
}
