use serde::{Deserialize, Serialize};

pub type Milliseconds = i32;

pub const FILE_FORMAT_VERSION: u8 = 14;
pub const PLAYFIELD_WIDTH: i32 = 512;
pub const PLAYFIELD_CENTER_Y: i32 = 192;
pub const MANIA_KEYS: u8 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OsuFile {
    pub version: u8,
    pub general: General,
    pub metadata: Metadata,
    pub difficulty: Difficulty,
    pub events: Vec<Event>,
    pub timing_points: Vec<TimingPoint>,
    pub hit_objects: Vec<HitObject>,
}

impl OsuFile {
    /// `{Artist} - {Title} ({Creator}) [{Version}].osu`, unsanitized.
    pub fn file_name(&self) -> String {
        format!(
            "{} - {} ({}) [{}].osu",
            self.metadata.artist, self.metadata.title, self.metadata.creator, self.metadata.version
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Standard,
    Taiko,
    Catch,
    Mania,
}

impl GameMode {
    pub fn code(self) -> u8 {
        match self {
            GameMode::Standard => 0,
            GameMode::Taiko => 1,
            GameMode::Catch => 2,
            GameMode::Mania => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct General {
    pub audio_filename: String,
    pub audio_lead_in: Milliseconds,
    pub preview_time: Milliseconds,
    pub countdown: u8,
    pub sample_set: String,
    pub stack_leniency: f64,
    pub mode: GameMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub title: String,
    pub title_unicode: String,
    pub artist: String,
    pub artist_unicode: String,
    pub creator: String,
    pub version: String,
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Difficulty {
    pub hp_drain_rate: f64,
    pub circle_size: f64,
    pub overall_difficulty: f64,
    pub approach_rate: f64,
    pub slider_multiplier: f64,
    pub slider_tick_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "background")]
    Background {
        start_time: Milliseconds,
        filename: String,
        x_offset: i32,
        y_offset: i32,
    },
}

/// Timing point effect bits as the `.osu` grammar defines them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Effects(u8);

impl Effects {
    pub const NONE: Effects = Effects(0);
    pub const KIAI: Effects = Effects(1);
    pub const OMIT_FIRST_BAR_LINE: Effects = Effects(8);

    pub fn from_bits(bits: u8) -> Self {
        Effects(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Effects) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Effects) -> Effects {
        Effects(self.0 | other.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingPoint {
    pub time: Milliseconds,
    pub beat_length: f64,
    pub meter: u32,
    pub sample_set: u8,
    pub sample_index: u8,
    pub volume: u8,
    pub uninherited: bool,
    #[serde(default)]
    pub effects: Effects,
}

impl TimingPoint {
    pub const DEFAULT_VOLUME: u8 = 100;

    /// Uninherited point; `beat_length` is milliseconds per beat.
    pub fn tempo(time: Milliseconds, beat_length: f64, meter: u32) -> Self {
        Self {
            time,
            beat_length,
            meter,
            sample_set: 0,
            sample_index: 0,
            volume: Self::DEFAULT_VOLUME,
            uninherited: true,
            effects: Effects::NONE,
        }
    }

    /// Inherited point; the multiplier is stored as `-100 / multiplier`.
    pub fn scroll(time: Milliseconds, multiplier: f64, meter: u32) -> Self {
        Self {
            time,
            beat_length: -100.0 / multiplier,
            meter,
            sample_set: 0,
            sample_index: 0,
            volume: Self::DEFAULT_VOLUME,
            uninherited: false,
            effects: Effects::NONE,
        }
    }

    pub fn with_effects(mut self, effects: Effects) -> Self {
        self.effects = effects;
        self
    }

    pub fn bpm(&self) -> Option<f64> {
        self.uninherited.then(|| 60_000.0 / self.beat_length)
    }

    pub fn scroll_multiplier(&self) -> Option<f64> {
        (!self.uninherited).then(|| -100.0 / self.beat_length)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HitSample {
    pub normal_set: u8,
    pub addition_set: u8,
    pub index: u8,
    pub volume: u8,
    #[serde(default)]
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HitObject {
    pub x: i32,
    pub y: i32,
    pub time: Milliseconds,
    #[serde(flatten)]
    pub kind: HitObjectKind,
    pub hit_sound: u8,
    pub hit_sample: HitSample,
}

impl HitObject {
    pub const HIT_SOUND_NORMAL: u8 = 0;

    pub fn tap(lane: u8, time: Milliseconds) -> Self {
        Self::new(lane, time, HitObjectKind::Tap)
    }

    pub fn hold(lane: u8, time: Milliseconds, end_time: Milliseconds) -> Self {
        Self::new(lane, time, HitObjectKind::Hold { end_time })
    }

    fn new(lane: u8, time: Milliseconds, kind: HitObjectKind) -> Self {
        Self {
            x: lane_x(lane),
            y: PLAYFIELD_CENTER_Y,
            time,
            kind,
            hit_sound: Self::HIT_SOUND_NORMAL,
            hit_sample: HitSample::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum HitObjectKind {
    #[serde(rename = "tap")]
    Tap,

    #[serde(rename = "hold")]
    Hold { end_time: Milliseconds },
}

impl HitObjectKind {
    /// The `type` bit field written to the file.
    pub fn type_code(&self) -> u8 {
        match self {
            HitObjectKind::Tap => 1,
            HitObjectKind::Hold { .. } => 128,
        }
    }

    pub fn end_time(&self) -> Option<Milliseconds> {
        match self {
            HitObjectKind::Tap => None,
            HitObjectKind::Hold { end_time } => Some(*end_time),
        }
    }
}

/// x position of a 1-based mania lane on a 4K playfield.
pub fn lane_x(lane: u8) -> i32 {
    (PLAYFIELD_WIDTH * i32::from(lane) / i32::from(MANIA_KEYS)) - 64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_map_to_column_centres() {
        assert_eq!(lane_x(1), 64);
        assert_eq!(lane_x(2), 192);
        assert_eq!(lane_x(3), 320);
        assert_eq!(lane_x(4), 448);
    }

    #[test]
    fn hit_object_serialization_includes_type_tag() {
        let note = HitObject::hold(3, 100, 600);

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "hold");
        assert_eq!(json["end_time"], 600);
        assert_eq!(json["time"], 100);
        assert_eq!(json["x"], 320);
        assert_eq!(json["y"], 192);
    }

    #[test]
    fn tempo_and_scroll_points_expose_their_rates() {
        let tempo = TimingPoint::tempo(0, 500.0, 4);
        assert_eq!(tempo.bpm(), Some(120.0));
        assert_eq!(tempo.scroll_multiplier(), None);

        let scroll = TimingPoint::scroll(250, 2.0, 4);
        assert_eq!(scroll.beat_length, -50.0);
        assert_eq!(scroll.scroll_multiplier(), Some(2.0));
        assert_eq!(scroll.bpm(), None);
    }

    #[test]
    fn effects_combine_as_bits() {
        let both = Effects::KIAI.union(Effects::OMIT_FIRST_BAR_LINE);
        assert_eq!(both.bits(), 9);
        assert!(both.contains(Effects::KIAI));
        assert!(!Effects::NONE.contains(Effects::KIAI));
        assert_eq!(Effects::from_bits(8), Effects::OMIT_FIRST_BAR_LINE);
    }

    #[test]
    fn file_roundtrip_minimal() {
        let file = OsuFile {
            version: FILE_FORMAT_VERSION,
            general: General {
                audio_filename: "audio.mp3".to_string(),
                audio_lead_in: 0,
                preview_time: -1,
                countdown: 0,
                sample_set: "Normal".to_string(),
                stack_leniency: 0.7,
                mode: GameMode::Mania,
            },
            metadata: Metadata {
                title: "t".to_string(),
                artist: "a".to_string(),
                creator: "c".to_string(),
                version: "Hard".to_string(),
                ..Metadata::default()
            },
            difficulty: Difficulty::default(),
            events: vec![Event::Background {
                start_time: 0,
                filename: "background.png".to_string(),
                x_offset: 0,
                y_offset: 0,
            }],
            timing_points: vec![TimingPoint::tempo(0, 500.0, 4).with_effects(Effects::KIAI)],
            hit_objects: vec![HitObject::tap(1, 0)],
        };

        let json = serde_json::to_string(&file).unwrap();
        let back: OsuFile = serde_json::from_str(&json).unwrap();
        assert_eq!(file, back);
        assert_eq!(file.file_name(), "a - t (c) [Hard].osu");
    }
}
