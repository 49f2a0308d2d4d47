use std::mem;

use log::{debug, info, warn};

use cinesync_shared::{ReplyError, SyncConfig, SyncConfigError, SyncSample};

use crate::{
    events::SyncEvents,
    sync::{ProbeSender, SyncReport, SyncSession, SyncState},
};

/// Estimates the offset between the local clock and the host's clock.
///
/// The engine is driven cooperatively by its owner:
/// * `update` must be called regularly; it sends the next probe and detects
///   timeouts against the supplied `now`
/// * `receive_reply` must be called with every reply tagged with the sync key
///
/// Outcomes are queued as events and collected with `take_events`.
///
/// Every probe the engine sends carries a `t0` strictly greater than the
/// previous one, across sessions, so an echoed `t0` identifies one probe.
pub struct ClockSyncEngine {
    config: SyncConfig,
    session: Option<SyncSession>,
    next_session_id: u64,
    last_probe_t0: Option<f64>,
    offset_seconds: f64,
    last_report: Option<SyncReport>,
    incoming_events: SyncEvents,
}

impl ClockSyncEngine {
    pub fn new(config: SyncConfig) -> Result<Self, SyncConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            session: None,
            next_session_id: 0,
            last_probe_t0: None,
            offset_seconds: 0.0,
            last_report: None,
            incoming_events: SyncEvents::new(),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // Sessions

    /// Starts a session using the configured attempts, timeout & retry
    /// budget. Any session already running is dropped along with its
    /// samples; replies addressed to it are rejected as stale.
    pub fn synchronize(&mut self) {
        let SyncConfig {
            attempts,
            timeout_seconds,
            max_retries,
            ..
        } = self.config;
        self.start_session(attempts, timeout_seconds, max_retries);
    }

    /// Same as `synchronize`, overriding the session parameters for this
    /// one call
    pub fn synchronize_with(
        &mut self,
        attempts: u32,
        timeout_seconds: f64,
        max_retries: u32,
    ) -> Result<(), SyncConfigError> {
        let session_config = SyncConfig {
            attempts,
            timeout_seconds,
            max_retries,
            ..self.config.clone()
        };
        session_config.validate()?;
        self.start_session(attempts, timeout_seconds, max_retries);
        Ok(())
    }

    /// Drops the running session, if any, without emitting an event.
    /// Returns whether a session was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                info!("Cancelled sync session {}", session.id());
                true
            }
            None => false,
        }
    }

    fn start_session(&mut self, attempts: u32, timeout_seconds: f64, max_retries: u32) {
        if let Some(previous) = self.session.take() {
            warn!(
                "Sync session {} superseded by a new synchronize call",
                previous.id()
            );
        }

        self.next_session_id += 1;
        let session = SyncSession::new(self.next_session_id, attempts, timeout_seconds, max_retries);
        info!(
            "Starting sync session {}: {} probes, {}s timeout, {} retries",
            session.id(),
            attempts,
            timeout_seconds,
            max_retries
        );
        self.session = Some(session);
    }

    // Scheduling

    /// Must be called regularly while a session runs. Restarts or fails the
    /// session when the probe in flight has timed out, then sends the next
    /// probe if none is in flight.
    pub fn update(&mut self, now: f64, sender: &mut dyn ProbeSender) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        if session.timed_out(now) {
            warn!(
                "Sync probe {} of session {} timed out after {}s",
                session.attempts_completed() + 1,
                session.id(),
                session.timeout_seconds()
            );
            self.retry_or_fail();
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.has_pending_probe() || session.is_complete() {
            return;
        }

        // several probes in one tick (or a clock step back) must not share a t0
        let t0 = match self.last_probe_t0 {
            Some(last) if now <= last => {
                debug!("Nudging probe t0 {} past previous probe t0 {}", now, last);
                last.next_up()
            }
            _ => now,
        };
        self.last_probe_t0 = Some(t0);

        session.begin_probe(t0);
        if sender.send_probe(&self.config.sync_key, t0).is_err() {
            // still counts as in flight, so the timeout path handles it
            warn!(
                "Sync Error: Cannot send probe {} of session {}",
                session.attempts_completed() + 1,
                session.id()
            );
        }
    }

    /// Feeds a reply `[t0_echo, t1, t2, ..]` received at local time `now`.
    ///
    /// Replies are correlated with the probe in flight by their echoed
    /// `t0`; anything else is rejected and leaves the session untouched.
    pub fn receive_reply(&mut self, key: &str, payload: &[f64], now: f64) -> Result<(), ReplyError> {
        if key != self.config.sync_key {
            return Err(ReplyError::UnknownKey {
                key: key.to_string(),
            });
        }

        let Some(session) = self.session.as_mut() else {
            debug!("Ignoring sync reply: no session running");
            return Err(ReplyError::NoPendingProbe);
        };
        let Some(expected) = session.pending_t0() else {
            warn!("Ignoring sync reply: session {} has no probe in flight", session.id());
            return Err(ReplyError::NoPendingProbe);
        };

        let sample = SyncSample::from_reply(payload, now).map_err(|err| {
            warn!("Discarding sync reply for session {}: {}", session.id(), err);
            err
        })?;
        if sample.t0 != expected {
            warn!(
                "Discarding stale sync reply for session {} (t0 {} != {})",
                session.id(),
                sample.t0,
                expected
            );
            return Err(ReplyError::StaleReply {
                t0_echo: sample.t0,
                expected,
            });
        }

        debug!(
            "Sync sample {}/{} of session {}: offset {}s, round trip {}s",
            session.attempts_completed() + 1,
            session.attempts_planned(),
            session.id(),
            sample.offset(),
            sample.round_trip()
        );
        session.record(sample);

        if session.is_complete() {
            self.finish_session();
        }
        Ok(())
    }

    fn finish_session(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let report = SyncReport::compute(
            session.id(),
            session.samples(),
            session.retry_count(),
            self.config.max_round_trip,
            self.config.outlier_filter,
        );
        let Some(report) = report else {
            warn!(
                "Every sample of sync session {} exceeded the round-trip ceiling",
                session.id()
            );
            self.retry_or_fail();
            return;
        };

        info!(
            "Sync session {} succeeded: offset {}s from {}/{} samples",
            report.session_id, report.offset_seconds, report.samples_used, report.samples_collected
        );
        self.session = None;
        self.offset_seconds = report.offset_seconds;
        self.incoming_events.push_success(report.offset_seconds);
        self.last_report = Some(report);
    }

    fn retry_or_fail(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.register_retry() {
            info!(
                "Sync session {} failed after {} retries, keeping offset {}s",
                session.id(),
                session.retry_count(),
                self.offset_seconds
            );
            self.session = None;
            self.incoming_events.push_failure();
        } else {
            warn!(
                "Restarting sync session {} (retry {}/{})",
                session.id(),
                session.retry_count(),
                session.max_retries()
            );
        }
    }

    // Results

    /// Offset to add to local time to get host time. 0 until the first
    /// successful session; a failed session leaves it unchanged.
    pub fn offset(&self) -> f64 {
        self.offset_seconds
    }

    /// Converts a local timestamp into the host's clock frame
    pub fn to_host_time(&self, local_time: f64) -> f64 {
        local_time + self.offset_seconds
    }

    pub fn last_report(&self) -> Option<&SyncReport> {
        self.last_report.as_ref()
    }

    pub fn is_synchronizing(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SyncSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> SyncState {
        match &self.session {
            Some(session) => session.state(),
            None => SyncState::Idle,
        }
    }

    /// Returns all queued events and resets the queue
    pub fn take_events(&mut self) -> SyncEvents {
        mem::replace(&mut self.incoming_events, SyncEvents::new())
    }
}
