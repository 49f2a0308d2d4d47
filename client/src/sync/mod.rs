mod engine;
mod probe_sender;
mod report;
mod session;

pub use engine::ClockSyncEngine;
pub use probe_sender::ProbeSender;
pub use report::SyncReport;
pub use session::{SyncSession, SyncState};
