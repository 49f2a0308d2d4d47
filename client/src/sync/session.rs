use cinesync_shared::SyncSample;

/// Externally visible phase of the sync engine.
///
/// Timeout handling & averaging happen inside a single `update` /
/// `receive_reply` call, so they are never observed as a resting state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncState {
    /// No session running; the engine holds the last good offset (or 0)
    Idle,
    /// Session running, the next probe goes out on the next `update`
    Probing { attempt: u32 },
    /// Probe `attempt` is in flight
    WaitingForReply { attempt: u32, t0: f64, deadline: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingProbe {
    t0: f64,
    deadline: f64,
}

/// State of one synchronization attempt. A fresh session is created on
/// every `synchronize` call and dropped once it succeeds, fails or is
/// replaced.
#[derive(Debug, Clone)]
pub struct SyncSession {
    id: u64,
    attempts_planned: u32,
    retry_count: u32,
    max_retries: u32,
    timeout_seconds: f64,
    samples: Vec<SyncSample>,
    pending: Option<PendingProbe>,
}

impl SyncSession {
    pub(crate) fn new(id: u64, attempts_planned: u32, timeout_seconds: f64, max_retries: u32) -> Self {
        Self {
            id,
            attempts_planned,
            retry_count: 0,
            max_retries,
            timeout_seconds,
            samples: Vec::with_capacity(attempts_planned as usize),
            pending: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn attempts_planned(&self) -> u32 {
        self.attempts_planned
    }

    /// Probes of the current pass that received a reply
    pub fn attempts_completed(&self) -> u32 {
        self.samples.len() as u32
    }

    /// Number of times the session was restarted after a timeout
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn timeout_seconds(&self) -> f64 {
        self.timeout_seconds
    }

    /// Samples of the current pass, in probe order
    pub fn samples(&self) -> &[SyncSample] {
        &self.samples
    }

    pub fn state(&self) -> SyncState {
        let attempt = self.attempts_completed() + 1;
        match self.pending {
            Some(PendingProbe { t0, deadline }) => SyncState::WaitingForReply {
                attempt,
                t0,
                deadline,
            },
            None => SyncState::Probing { attempt },
        }
    }

    // Crate-public

    pub(crate) fn is_complete(&self) -> bool {
        self.attempts_completed() >= self.attempts_planned
    }

    pub(crate) fn has_pending_probe(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn pending_t0(&self) -> Option<f64> {
        self.pending.map(|pending| pending.t0)
    }

    pub(crate) fn timed_out(&self, now: f64) -> bool {
        self.pending.is_some_and(|pending| now >= pending.deadline)
    }

    pub(crate) fn begin_probe(&mut self, t0: f64) {
        self.pending = Some(PendingProbe {
            t0,
            deadline: t0 + self.timeout_seconds,
        });
    }

    pub(crate) fn record(&mut self, sample: SyncSample) {
        self.pending = None;
        self.samples.push(sample);
    }

    /// Counts a failed pass. Returns whether the retry budget is exhausted;
    /// otherwise the session starts over from probe 1.
    pub(crate) fn register_retry(&mut self) -> bool {
        self.retry_count += 1;
        if self.retry_count >= self.max_retries {
            return true;
        }
        self.samples.clear();
        self.pending = None;
        false
    }
}
