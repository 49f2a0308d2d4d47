use log::warn;

use cinesync_shared::{mean, median, OutlierFilter, SyncSample};

/// Summary of a successful sync session
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub session_id: u64,
    /// Estimated offset to add to local time to get host time, in seconds
    pub offset_seconds: f64,
    /// Replies received in the final pass
    pub samples_collected: usize,
    /// Samples within the round-trip ceiling
    pub samples_accepted: usize,
    /// Offsets that survived outlier filtering and went into the average
    pub samples_used: usize,
    /// Fastest network transit observed among accepted samples
    pub min_round_trip: f64,
    pub mean_round_trip: f64,
    /// Timed-out passes before this one succeeded
    pub retries: u32,
}

impl SyncReport {
    /// Drops samples slower than `max_round_trip`, filters the offsets of
    /// the rest and averages what remains. Returns `None` when no sample is
    /// within the round-trip ceiling.
    pub(crate) fn compute(
        session_id: u64,
        samples: &[SyncSample],
        retries: u32,
        max_round_trip: Option<f64>,
        outlier_filter: OutlierFilter,
    ) -> Option<Self> {
        let accepted: Vec<&SyncSample> = samples
            .iter()
            .filter(|sample| match max_round_trip {
                Some(ceiling) => sample.round_trip() <= ceiling,
                None => true,
            })
            .collect();
        if accepted.is_empty() {
            return None;
        }

        let offsets: Vec<f64> = accepted.iter().map(|sample| sample.offset()).collect();
        let round_trips: Vec<f64> = accepted.iter().map(|sample| sample.round_trip()).collect();

        let filtered = outlier_filter.apply(&offsets);
        let (offset_seconds, samples_used) = match mean(&filtered) {
            Some(offset) => (offset, filtered.len()),
            None => {
                warn!(
                    "Outlier filter rejected all {} offsets of sync session {}, using their median",
                    offsets.len(),
                    session_id
                );
                (median(&offsets)?, offsets.len())
            }
        };

        Some(Self {
            session_id,
            offset_seconds,
            samples_collected: samples.len(),
            samples_accepted: accepted.len(),
            samples_used,
            min_round_trip: round_trips.iter().copied().fold(f64::INFINITY, f64::min),
            mean_round_trip: mean(&round_trips)?,
            retries,
        })
    }
}
