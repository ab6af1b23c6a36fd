use osu_schema::Milliseconds;

/// Stand-in for a zero (or otherwise unusable) tempo or speed.
pub(crate) const RATE_EPSILON: f64 = f64::EPSILON;

/// Rows per beat inside a `(` ... `)` span.
pub(crate) const SUBDIVISION_BEATS: u32 = 6;

/// Timing walk state for a single difficulty.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TimingState {
    start_time_ms: f64,
    base_bpm: f64,
    bpm: f64,
    meter: u32,
    beats_per_measure: u32,
    elapsed_ms: f64,
    speed: f64,
    // divisor to restore once the open subdivision span closes
    saved_beats: Option<u32>,
    closing_subdivision: bool,
    bind_zone: bool,
}

impl TimingState {
    pub(crate) fn new(start_time_ms: f64, bpm: f64, beats_per_measure: u32) -> Self {
        let bpm = usable_rate(bpm);
        Self {
            start_time_ms,
            base_bpm: bpm,
            bpm,
            meter: beats_per_measure,
            beats_per_measure,
            elapsed_ms: 0.0,
            speed: 1.0,
            saved_beats: None,
            closing_subdivision: false,
            bind_zone: false,
        }
    }

    pub(crate) fn start_time(&self) -> Milliseconds {
        self.start_time_ms.round() as Milliseconds
    }

    pub(crate) fn bpm(&self) -> f64 {
        self.bpm
    }

    pub(crate) fn meter(&self) -> u32 {
        self.meter
    }

    pub(crate) fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub(crate) fn in_subdivision(&self) -> bool {
        self.saved_beats.is_some()
    }

    pub(crate) fn in_bind_zone(&self) -> bool {
        self.bind_zone
    }

    pub(crate) fn beat_length(&self) -> f64 {
        60_000.0 / self.bpm
    }

    pub(crate) fn base_beat_length(&self) -> f64 {
        60_000.0 / self.base_bpm
    }

    /// Time of the next row, a quarter beat ahead of the elapsed position.
    pub(crate) fn now_ms(&self) -> f64 {
        self.start_time_ms + self.elapsed_ms - self.beat_length() / 4.0
    }

    /// Saturates at the `i32` bounds. Under the epsilon tempo the result is
    /// not monotonic: rows after the saturated one lose their earlier
    /// elapsed time to float cancellation.
    pub(crate) fn now(&self) -> Milliseconds {
        self.now_ms().round() as Milliseconds
    }

    /// Scroll multiplier measured against the map's base tempo.
    pub(crate) fn scroll_multiplier(&self) -> f64 {
        self.speed * self.base_bpm / self.bpm
    }

    pub(crate) fn set_bpm(&mut self, bpm: f64) {
        self.bpm = usable_rate(bpm);
    }

    pub(crate) fn set_speed(&mut self, speed: f64) {
        self.speed = usable_rate(speed);
    }

    pub(crate) fn advance_row(&mut self) {
        self.elapsed_ms += self.beat_length() / f64::from(self.beats_per_measure);
        if self.closing_subdivision {
            self.closing_subdivision = false;
            if let Some(beats) = self.saved_beats.take() {
                self.beats_per_measure = beats;
            }
        }
    }

    pub(crate) fn enter_subdivision(&mut self) {
        if self.saved_beats.is_some() {
            self.closing_subdivision = false;
            return;
        }
        self.saved_beats = Some(self.beats_per_measure);
        self.beats_per_measure = SUBDIVISION_BEATS;
    }

    /// The closing row still counts as a subdivided row; the divisor is
    /// restored once it has advanced.
    pub(crate) fn exit_subdivision(&mut self) {
        if self.saved_beats.is_some() {
            self.closing_subdivision = true;
        }
    }

    /// Returns false when already inside a bind zone.
    pub(crate) fn enter_bind_zone(&mut self) -> bool {
        !std::mem::replace(&mut self.bind_zone, true)
    }

    /// Returns false when no bind zone is open.
    pub(crate) fn exit_bind_zone(&mut self) -> bool {
        std::mem::replace(&mut self.bind_zone, false)
    }
}

fn usable_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        RATE_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_advance_by_beat_length_over_divisor() {
        let mut state = TimingState::new(0.0, 120.0, 4);
        assert_eq!(state.beat_length(), 500.0);
        assert_eq!(state.now_ms(), -125.0);
        state.advance_row();
        assert_eq!(state.elapsed_ms(), 125.0);
        assert_eq!(state.now(), 0);
    }

    #[test]
    fn start_offset_shifts_row_times() {
        let mut state = TimingState::new(1000.0, 120.0, 4);
        assert_eq!(state.now(), 875);
        state.advance_row();
        state.advance_row();
        assert_eq!(state.now(), 1125);
        assert_eq!(state.start_time(), 1000);
    }

    #[test]
    fn subdivision_restores_previous_divisor_after_closing_row() {
        let mut state = TimingState::new(0.0, 120.0, 4);
        state.enter_subdivision();
        assert!(state.in_subdivision());
        assert_eq!(state.beats_per_measure(), 6);
        state.advance_row();
        state.exit_subdivision();
        assert_eq!(state.beats_per_measure(), 6);
        state.advance_row();
        assert_eq!(state.beats_per_measure(), 4);
        assert!(!state.in_subdivision());
        // two 24th rows make a third of a beat
        assert!((state.elapsed_ms() - 500.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn nested_or_stray_subdivision_markers_are_ignored() {
        let mut state = TimingState::new(0.0, 120.0, 3);
        state.exit_subdivision();
        state.advance_row();
        assert_eq!(state.beats_per_measure(), 3);

        state.enter_subdivision();
        state.enter_subdivision();
        state.exit_subdivision();
        state.advance_row();
        assert_eq!(state.beats_per_measure(), 3);
    }

    #[test]
    fn zero_or_negative_tempo_becomes_epsilon() {
        let mut state = TimingState::new(0.0, 0.0, 4);
        assert_eq!(state.bpm(), RATE_EPSILON);
        assert!(state.beat_length().is_finite());
        assert!(state.beat_length() > 1e15);

        state.set_bpm(150.0);
        assert_eq!(state.bpm(), 150.0);
        state.set_bpm(-20.0);
        assert_eq!(state.bpm(), RATE_EPSILON);
    }

    #[test]
    fn epsilon_tempo_saturates_row_time() {
        let mut state = TimingState::new(0.0, 120.0, 4);
        state.advance_row();
        state.set_bpm(0.0);
        assert_eq!(state.now(), Milliseconds::MIN);
        state.advance_row();
        assert_eq!(state.now(), 0);
    }

    #[test]
    fn scroll_multiplier_is_relative_to_base_tempo() {
        let mut state = TimingState::new(0.0, 100.0, 4);
        assert_eq!(state.scroll_multiplier(), 1.0);
        state.set_bpm(200.0);
        assert_eq!(state.scroll_multiplier(), 0.5);
        state.set_speed(3.0);
        assert_eq!(state.scroll_multiplier(), 1.5);
    }

    #[test]
    fn bind_zone_toggles_once() {
        let mut state = TimingState::new(0.0, 120.0, 4);
        assert!(!state.exit_bind_zone());
        assert!(state.enter_bind_zone());
        assert!(!state.enter_bind_zone());
        assert!(state.in_bind_zone());
        assert!(state.exit_bind_zone());
        assert!(!state.in_bind_zone());
    }
}
