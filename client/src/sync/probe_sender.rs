use crate::transport::SendError;

/// Outbound half of the transport as seen by the sync engine: transmits the
/// local send time `t0`, tagged with the sync key.
pub trait ProbeSender {
    fn send_probe(&mut self, key: &str, t0: f64) -> Result<(), SendError>;
}
