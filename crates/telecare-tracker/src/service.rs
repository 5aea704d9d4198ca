//! Tracker service
//!
//! Wraps a [`CallTracker`] behind a lock, drives its periodic tick from a
//! background task and counts what passes through it. All mutations take the
//! write lock, so an End never interleaves with a Tick.

use crate::{
    Result, TrackerError, config::TrackerConfig, fixtures, tracker::CallTracker,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use telecare_core::{
    ActiveCall, CallHistoryEntry, CallSession, CallStatus, NewCallSession, SessionId,
    TrackerStats,
};

/// Task handles type alias
type TaskHandles = Arc<RwLock<Vec<JoinHandle<()>>>>;
use tokio::{
    sync::{Notify, broadcast},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval},
};
use tracing::{debug, info, instrument, warn};

/// Service metrics
#[derive(Debug, Clone, Default)]
pub struct ServiceMetrics {
    /// Ticks applied to the tracker
    pub ticks: u64,

    /// Sessions opened
    pub sessions_created: u64,

    /// Sessions moved from waiting to connected
    pub sessions_connected: u64,

    /// Sessions moved into history
    pub sessions_ended: u64,

    /// Connect or End calls that named an inactive id
    pub not_found: u64,

    /// Service uptime in seconds
    pub uptime_seconds: u64,

    /// Wall-clock time of the last tick
    pub last_tick: Option<DateTime<Utc>>,

    /// Current service status
    pub status: ServiceStatus,
}

/// Service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceStatus {
    /// Service is stopped
    #[default]
    Stopped,

    /// Service is starting up
    Starting,

    /// Service is running normally
    Running,

    /// Service is shutting down
    Stopping,
}

impl ServiceStatus {
    /// Lowercase name for health output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

/// Call tracking service
#[derive(Debug)]
pub struct TrackerService {
    /// Service configuration
    config: TrackerConfig,

    /// Session state
    tracker: Arc<RwLock<CallTracker>>,

    /// Service metrics
    metrics: Arc<RwLock<ServiceMetrics>>,

    /// Running task handles
    task_handles: TaskHandles,

    /// Shutdown signal
    shutdown_notify: Arc<Notify>,

    /// Shutdown sender (for broadcasting shutdown)
    shutdown_tx: broadcast::Sender<()>,

    /// Service status
    status: Arc<RwLock<ServiceStatus>>,

    /// Service start time
    start_time: Arc<RwLock<Option<Instant>>>,
}

impl TrackerService {
    /// Create a new tracker service
    ///
    /// Seeds the demo calls when `fixtures.seed_demo_data` is set.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Configuration`] if the configuration is out of
    /// range, or any error raised while seeding.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        let mut tracker = CallTracker::new();
        if config.fixtures.seed_demo_data {
            fixtures::seed_demo_data(&mut tracker, Utc::now())?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(
            service = %config.service.name,
            tick_interval_ms = config.tick.tick_interval_ms,
            "Tracker service initialized"
        );

        Ok(Self {
            config,
            tracker: Arc::new(RwLock::new(tracker)),
            metrics: Arc::new(RwLock::new(ServiceMetrics::default())),
            task_handles: Arc::new(RwLock::new(Vec::new())),
            shutdown_notify: Arc::new(Notify::new()),
            shutdown_tx,
            status: Arc::new(RwLock::new(ServiceStatus::Stopped)),
            start_time: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the background tasks
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ServiceAlreadyRunning`] unless the service is
    /// stopped.
    #[instrument(skip(self), fields(service = %self.config.service.name))]
    pub fn start(&self) -> Result<()> {
        let mut status = self.status.write();
        if *status != ServiceStatus::Stopped {
            return Err(TrackerError::ServiceAlreadyRunning);
        }
        *status = ServiceStatus::Starting;
        drop(status);

        info!("Starting tracker service");

        *self.start_time.write() = Some(Instant::now());

        let mut handles = self.task_handles.write();
        handles.push(self.spawn_tick_task());
        if self.config.service.summary_interval_seconds > 0 {
            handles.push(self.spawn_summary_task());
        }
        drop(handles);

        *self.status.write() = ServiceStatus::Running;

        info!(
            tick_interval_ms = self.config.tick.tick_interval_ms,
            "Tracker service started"
        );
        Ok(())
    }

    /// Stop the background tasks
    ///
    /// Stopping a stopped service does nothing.
    ///
    /// # Errors
    ///
    /// Currently infallible; a shutdown timeout is logged rather than returned.
    #[instrument(skip(self), fields(service = %self.config.service.name))]
    pub async fn stop(&self) -> Result<()> {
        let mut status = self.status.write();
        if *status == ServiceStatus::Stopped {
            return Ok(());
        }
        *status = ServiceStatus::Stopping;
        drop(status);

        info!("Stopping tracker service");

        let _ = self.shutdown_tx.send(());
        self.shutdown_notify.notify_waiters();

        let handles: Vec<_> = self.task_handles.write().drain(..).collect();
        let timeout_duration = self.config.service.shutdown_timeout();
        let shutdown_result = tokio::time::timeout(timeout_duration, async {
            for handle in handles {
                let _ = handle.await;
            }
        })
        .await;

        if shutdown_result.is_err() {
            warn!(
                timeout_seconds = timeout_duration.as_secs(),
                "Tracker shutdown timed out, some tasks may still be running"
            );
        }

        *self.status.write() = ServiceStatus::Stopped;
        *self.start_time.write() = None;

        info!("Tracker service stopped");
        Ok(())
    }

    /// Open a new session starting now
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] for blank or oversized names.
    #[instrument(skip(self, request), fields(call_type = %request.call_type))]
    pub fn create_session(&self, request: NewCallSession) -> Result<CallSession> {
        let session = self.tracker.write().create_session(request)?;
        self.metrics.write().sessions_created += 1;

        info!(session_id = %session.id, "Call session created");
        Ok(session)
    }

    /// Mark the patient of `id` as connected
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SessionNotFound`] if `id` is not active.
    #[instrument(skip(self))]
    pub fn connect(&self, id: SessionId) -> Result<CallSession> {
        let result = {
            let mut tracker = self.tracker.write();
            let was_waiting = tracker
                .session(id)
                .is_some_and(|s| s.status == CallStatus::WaitingPatient);
            tracker
                .connect(id)
                .map(|session| (was_waiting, session.clone()))
        };

        match result {
            Ok((was_waiting, session)) => {
                if was_waiting {
                    self.metrics.write().sessions_connected += 1;
                    info!(session_id = %id, "Patient connected");
                } else {
                    debug!(session_id = %id, "Session already connected");
                }
                Ok(session)
            }
            Err(e) => Err(self.record_miss(e)),
        }
    }

    /// End the call `id` now and return its history entry
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SessionNotFound`] if `id` is not active.
    #[instrument(skip(self))]
    pub fn end(&self, id: SessionId) -> Result<CallHistoryEntry> {
        let result = self.tracker.write().end(id);

        match result {
            Ok(entry) => {
                self.metrics.write().sessions_ended += 1;
                info!(
                    session_id = %id,
                    duration = %entry.duration,
                    "Call session ended"
                );
                Ok(entry)
            }
            Err(e) => Err(self.record_miss(e)),
        }
    }

    /// Active sessions in creation order with their elapsed display
    #[must_use]
    pub fn list_active(&self) -> Vec<ActiveCall> {
        self.tracker.read().list_active()
    }

    /// Concluded calls, most recent first
    #[must_use]
    pub fn list_history(&self) -> Vec<CallHistoryEntry> {
        self.tracker.read().list_history()
    }

    /// Ids of the active sessions in creation order
    #[must_use]
    pub fn active_ids(&self) -> Vec<SessionId> {
        self.tracker.read().active_ids()
    }

    /// Look up an active session
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<CallSession> {
        self.tracker.read().session(id).cloned()
    }

    /// Summary counts
    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        self.tracker.read().stats()
    }

    /// Apply a tick immediately, outside the background schedule
    pub fn tick_now(&self) {
        Self::apply_tick(&self.tracker, &self.metrics, Utc::now());
    }

    /// Get service status
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        *self.status.read()
    }

    /// Whether the background tasks are running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status() == ServiceStatus::Running
    }

    /// Get service metrics
    #[must_use]
    pub fn metrics(&self) -> ServiceMetrics {
        let mut metrics = self.metrics.read().clone();

        let start_time = *self.start_time.read();
        if let Some(start_time) = start_time {
            metrics.uptime_seconds = start_time.elapsed().as_secs();
        }
        metrics.status = self.status();

        metrics
    }

    /// Service configuration
    #[must_use]
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Wait for shutdown signal
    pub async fn wait_for_shutdown(&self) {
        self.shutdown_notify.notified().await;
    }

    fn record_miss(&self, error: TrackerError) -> TrackerError {
        if let TrackerError::SessionNotFound { id } = &error {
            self.metrics.write().not_found += 1;
            warn!(session_id = %id, "Call session not found");
        }
        error
    }

    fn apply_tick(
        tracker: &RwLock<CallTracker>,
        metrics: &RwLock<ServiceMetrics>,
        now: DateTime<Utc>,
    ) {
        tracker.write().tick(now);

        let mut m = metrics.write();
        m.ticks += 1;
        m.last_tick = Some(now);
    }

    /// Spawn the elapsed-time tick task
    fn spawn_tick_task(&self) -> JoinHandle<()> {
        let tracker = self.tracker.clone();
        let metrics = self.metrics.clone();
        let tick_interval = self.config.tick.tick_interval();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            debug!(?tick_interval, "Tick task started");

            let mut interval = interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        Self::apply_tick(&tracker, &metrics, Utc::now());
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Tick task shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Spawn the periodic summary log task
    fn spawn_summary_task(&self) -> JoinHandle<()> {
        let tracker = self.tracker.clone();
        let metrics = self.metrics.clone();
        let summary_interval: Duration = self.config.service.summary_interval();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut interval = interval(summary_interval);
            // The first tick fires immediately; skip it so the summary lags start.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let stats = tracker.read().stats();
                        let ticks = metrics.read().ticks;
                        info!(
                            active = stats.active,
                            waiting_patient = stats.waiting_patient,
                            connected = stats.connected,
                            completed = stats.completed,
                            ticks,
                            "Call desk summary"
                        );
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Summary task shutting down");
                        break;
                    }
                }
            }
        })
    }
}

impl Drop for TrackerService {
    fn drop(&mut self) {
        if !matches!(*self.status.read(), ServiceStatus::Stopped) {
            warn!("TrackerService dropped while still running");
            let _ = self.shutdown_tx.send(());
        }
    }
}
