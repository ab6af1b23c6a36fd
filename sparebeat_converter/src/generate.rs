use osu_schema::{
    Effects, Event, GameMode, General, HitObject, Metadata, Milliseconds, OsuFile, TimingPoint,
    FILE_FORMAT_VERSION,
};
use tracing::{debug, warn};

use crate::holds::HoldTracker;
use crate::lexer::{split_rows, tokenize, Token};
use crate::model::{Block, DifficultyLevel, Directive, SparebeatMap};
use crate::time_map::TimingState;
use crate::ConvertOptions;

/// Notes and timing points discovered while walking one difficulty.
#[derive(Debug, Default)]
pub(crate) struct Track {
    pub(crate) timing_points: Vec<TimingPoint>,
    pub(crate) hit_objects: Vec<HitObject>,
    pub(crate) unmatched_holds: usize,
}

pub(crate) fn walk_blocks(blocks: &[Block], state: &mut TimingState) -> Track {
    let mut track = Track::default();
    let mut holds = HoldTracker::default();

    for (index, block) in blocks.iter().enumerate() {
        match block {
            Block::Rows(rows) => {
                for row in split_rows(rows) {
                    walk_row(row, state, &mut holds, &mut track);
                    state.advance_row();
                }
            }
            Block::Directive(directive) => apply_directive(directive, state, &mut track),
            Block::Invalid { reason } => {
                warn!(block = index, %reason, "skipping block");
            }
        }
    }

    track.unmatched_holds = holds.unmatched();
    if track.unmatched_holds > 0 {
        warn!(lanes = track.unmatched_holds, "hold starts without an end were dropped");
    }
    if state.in_subdivision() || state.in_bind_zone() {
        debug!(
            subdivision = state.in_subdivision(),
            bind_zone = state.in_bind_zone(),
            "notation ended inside an open span"
        );
    }
    debug!(
        bpm = state.bpm(),
        beats_per_measure = state.beats_per_measure(),
        elapsed_ms = state.elapsed_ms(),
        "walk finished"
    );
    track
}

fn walk_row(row: &str, state: &mut TimingState, holds: &mut HoldTracker, track: &mut Track) {
    let time = state.now();
    for token in tokenize(row) {
        match token {
            Token::Tap(lane) => track.hit_objects.push(HitObject::tap(lane.get(), time)),
            Token::HoldStart(lane) => holds.open(lane, time),
            Token::HoldEnd(lane) => {
                if let Some(note) = holds.close(lane, time) {
                    track.hit_objects.push(note);
                }
            }
            Token::SubdivisionStart => state.enter_subdivision(),
            Token::SubdivisionEnd => state.exit_subdivision(),
            Token::BindStart => {
                if state.enter_bind_zone() {
                    track.timing_points.push(scroll_point(state, time).with_effects(Effects::KIAI));
                }
            }
            Token::BindEnd => {
                if state.exit_bind_zone() {
                    track.timing_points.push(scroll_point(state, time));
                }
            }
        }
    }
}

fn apply_directive(directive: &Directive, state: &mut TimingState, track: &mut Track) {
    match (directive.bpm, directive.speed) {
        (Some(bpm), speed) => {
            state.set_bpm(bpm);
            let time = state.now();
            track
                .timing_points
                .push(TimingPoint::tempo(time, state.beat_length(), state.meter()));
            if let Some(speed) = speed {
                state.set_speed(speed);
                track.timing_points.push(scroll_point(state, time));
            }
        }
        (None, Some(speed)) => {
            state.set_speed(speed);
            let time = state.now();
            track.timing_points.push(scroll_point(state, time));
        }
        (None, None) => {}
    }
}

fn scroll_point(state: &TimingState, time: Milliseconds) -> TimingPoint {
    TimingPoint::scroll(time, state.scroll_multiplier(), state.meter())
}

/// Orders the final timing track: an optional synthetic lead, the
/// discovered points, then the anchor at the map's start offset.
pub(crate) fn finish_timing(mut points: Vec<TimingPoint>, state: &TimingState) -> Vec<TimingPoint> {
    let start = state.start_time();
    let lead_time = match points.first() {
        Some(first) if !first.uninherited || first.time > start => Some(first.time.min(start).min(0)),
        _ => None,
    };
    if let Some(time) = lead_time {
        points.insert(
            0,
            TimingPoint::tempo(time, state.base_beat_length(), state.meter())
                .with_effects(Effects::OMIT_FIRST_BAR_LINE),
        );
    }
    points.push(TimingPoint::tempo(start, state.beat_length(), state.meter()));
    points
}

/// Sections shared by every difficulty of one map.
#[derive(Debug, Clone)]
pub(crate) struct SharedSections {
    general: General,
    metadata: Metadata,
    events: Vec<Event>,
}

impl SharedSections {
    pub(crate) fn new(map: &SparebeatMap, options: &ConvertOptions) -> Self {
        let general = General {
            audio_filename: options.audio_filename.clone(),
            audio_lead_in: 0,
            preview_time: -1,
            countdown: 0,
            sample_set: "Normal".to_string(),
            stack_leniency: 0.7,
            mode: GameMode::Mania,
        };
        let metadata = Metadata {
            title: map.title.clone(),
            title_unicode: map.title.clone(),
            artist: map.artist.clone(),
            artist_unicode: map.artist.clone(),
            creator: options.creator.clone(),
            version: String::new(),
            source: map.url.clone(),
            tags: options.tags.clone(),
        };
        let events = vec![Event::Background {
            start_time: map.start_time_ms().round() as Milliseconds,
            filename: options.background_filename.clone(),
            x_offset: 0,
            y_offset: 0,
        }];
        Self {
            general,
            metadata,
            events,
        }
    }
}

pub(crate) fn build_difficulty(
    map: &SparebeatMap,
    level: DifficultyLevel,
    shared: &SharedSections,
    options: &ConvertOptions,
) -> OsuFile {
    let mut state = TimingState::new(map.start_time_ms(), map.bpm(), map.beats_per_measure());
    let track = walk_blocks(map.blocks(level), &mut state);
    let timing_points = finish_timing(track.timing_points, &state);

    debug!(
        difficulty = %level,
        hit_objects = track.hit_objects.len(),
        timing_points = timing_points.len(),
        "converted difficulty"
    );

    let mut metadata = shared.metadata.clone();
    metadata.version = level.label().to_string();

    OsuFile {
        version: FILE_FORMAT_VERSION,
        general: shared.general.clone(),
        metadata,
        difficulty: options.difficulty,
        events: shared.events.clone(),
        timing_points,
        hit_objects: track.hit_objects,
    }
}
