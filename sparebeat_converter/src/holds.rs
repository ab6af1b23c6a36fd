use osu_schema::{HitObject, Milliseconds};
use tracing::debug;

use crate::lexer::{Lane, LANES};

/// Open hold start times, one slot per lane.
#[derive(Debug, Default)]
pub(crate) struct HoldTracker {
    open: [Option<Milliseconds>; LANES],
}

impl HoldTracker {
    /// Only the most recent unmatched open per lane is kept.
    pub(crate) fn open(&mut self, lane: Lane, time: Milliseconds) {
        if let Some(previous) = self.open[lane.index()].replace(time) {
            debug!(lane = lane.get(), previous, time, "hold start replaced an unmatched start");
        }
    }

    pub(crate) fn close(&mut self, lane: Lane, time: Milliseconds) -> Option<HitObject> {
        let Some(start) = self.open[lane.index()].take() else {
            debug!(lane = lane.get(), time, "hold end without a start; dropped");
            return None;
        };
        Some(HitObject::hold(lane.get(), start, time.max(start)))
    }

    /// Lanes still holding an unmatched start.
    pub(crate) fn unmatched(&self) -> usize {
        self.open.iter().filter(|slot| slot.is_some()).count()
    }
}
