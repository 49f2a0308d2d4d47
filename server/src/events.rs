use std::{mem, net::SocketAddr, vec::IntoIter};

use crate::SyncServerError;

/// Probes answered & errors hit since the last `SyncServer::receive`
pub struct ServerEvents {
    probes: Vec<(SocketAddr, f64)>,
    errors: Vec<SyncServerError>,

    empty: bool,
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self {
            probes: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ServerEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ServerEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_probe(&mut self, address: SocketAddr, t0: f64) {
        self.probes.push((address, t0));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: SyncServerError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait ServerEvent {
    type Iter;

    fn iter(events: &mut ServerEvents) -> Self::Iter;

    fn has(events: &ServerEvents) -> bool;
}

// ProbeEvent
/// Client address & echoed `t0` of every probe that was answered
pub struct ProbeEvent;
impl ServerEvent for ProbeEvent {
    type Iter = IntoIter<(SocketAddr, f64)>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.probes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.probes.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl ServerEvent for ErrorEvent {
    type Iter = IntoIter<SyncServerError>;

    fn iter(events: &mut ServerEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ServerEvents) -> bool {
        !events.errors.is_empty()
    }
}
