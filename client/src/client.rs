use log::{info, warn};

use cinesync_shared::{Clock, SyncConfig};

use crate::{
    events::SyncEvents,
    io::Io,
    sync::{ClockSyncEngine, SyncReport, SyncState},
    transport::{PacketReceiver, PacketSender},
    SyncClientError,
};

/// Drives a `ClockSyncEngine` over a packet transport to the host, reading
/// local time from a `Clock`
pub struct SyncClient {
    engine: ClockSyncEngine,
    clock: Box<dyn Clock>,
    io: Io,
    errors: Vec<SyncClientError>,
}

impl SyncClient {
    /// Create a new SyncClient
    pub fn new<C: Clock + 'static>(config: SyncConfig, clock: C) -> Result<Self, SyncClientError> {
        Ok(Self {
            engine: ClockSyncEngine::new(config)?,
            clock: Box::new(clock),
            io: Io::new(),
            errors: Vec::new(),
        })
    }

    /// Attach the transport used to reach the host
    pub fn connect(
        &mut self,
        packet_sender: Box<dyn PacketSender>,
        packet_receiver: Box<dyn PacketReceiver>,
    ) {
        self.io.load(packet_sender, packet_receiver);
        info!("Sync client connected");
    }

    pub fn is_connected(&self) -> bool {
        self.io.is_loaded()
    }

    /// Starts a sync session with the configured parameters. The result is
    /// delivered by a later `receive` as a success or failure event.
    pub fn synchronize(&mut self) {
        self.engine.synchronize();
    }

    /// Starts a sync session overriding attempts, timeout & retry budget
    pub fn synchronize_with(
        &mut self,
        attempts: u32,
        timeout_seconds: f64,
        max_retries: u32,
    ) -> Result<(), SyncClientError> {
        self.engine
            .synchronize_with(attempts, timeout_seconds, max_retries)?;
        Ok(())
    }

    pub fn cancel(&mut self) -> bool {
        self.engine.cancel()
    }

    /// Must be called regularly. Reads every pending reply from the host,
    /// then lets the engine send its next probe or handle a timeout.
    pub fn receive(&mut self) -> SyncEvents {
        if self.io.is_loaded() {
            self.read_replies();
        }

        let now = self.clock.now();
        self.engine.update(now, &mut self.io);

        let mut events = self.engine.take_events();
        for error in self.errors.drain(..) {
            events.push_error(error);
        }
        events
    }

    fn read_replies(&mut self) {
        loop {
            match self.io.recv_message() {
                Ok(Some(message)) => {
                    let now = self.clock.now();
                    if let Err(err) = self
                        .engine
                        .receive_reply(&message.key, &message.payload, now)
                    {
                        self.errors.push(err.into());
                    }
                }
                Ok(None) => break,
                Err(SyncClientError::Wire(err)) => {
                    warn!("Dropping undecodable packet from host: {}", err);
                    self.errors.push(err.into());
                }
                Err(err) => {
                    self.errors.push(err);
                    break;
                }
            }
        }
    }

    // Clock

    pub fn offset(&self) -> f64 {
        self.engine.offset()
    }

    pub fn local_time(&self) -> f64 {
        self.clock.now()
    }

    /// Current time expressed in the host's clock frame
    pub fn host_time(&self) -> f64 {
        self.engine.to_host_time(self.clock.now())
    }

    pub fn last_report(&self) -> Option<&SyncReport> {
        self.engine.last_report()
    }

    pub fn state(&self) -> SyncState {
        self.engine.state()
    }

    pub fn is_synchronizing(&self) -> bool {
        self.engine.is_synchronizing()
    }

    pub fn engine(&self) -> &ClockSyncEngine {
        &self.engine
    }
}
