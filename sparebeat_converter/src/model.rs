use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const DEFAULT_BEATS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DifficultyLevel {
    Easy,
    Normal,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Normal,
        DifficultyLevel::Hard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Easy",
            DifficultyLevel::Normal => "Normal",
            DifficultyLevel::Hard => "Hard",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A numeric field that some maps store as a JSON string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coerced {
    pub value: f64,
    /// False when the field was absent, null, or not a finite number.
    pub valid: bool,
}

impl Coerced {
    const MISSING: Coerced = Coerced {
        value: 0.0,
        valid: false,
    };
}

pub fn coerce_number(raw: Option<&LooseNumber>) -> Coerced {
    let parsed = match raw {
        None => return Coerced::MISSING,
        Some(LooseNumber::Number(v)) => Some(*v),
        Some(LooseNumber::Text(s)) => s.trim().parse::<f64>().ok(),
    };
    match parsed {
        Some(value) if value.is_finite() => Coerced { value, valid: true },
        _ => Coerced::MISSING,
    }
}

/// `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparebeatMap {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default)]
    pub bg_color: Option<Vec<String>>,
    #[serde(default)]
    pub beats: Option<LooseNumber>,
    #[serde(default)]
    pub bpm: Option<LooseNumber>,
    #[serde(default)]
    pub start_time: Option<LooseNumber>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub level: Levels,
    #[serde(default, deserialize_with = "null_as_default")]
    pub map: Charts,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Levels {
    #[serde(default)]
    pub easy: Option<LooseNumber>,
    #[serde(default)]
    pub normal: Option<LooseNumber>,
    #[serde(default)]
    pub hard: Option<LooseNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Charts {
    #[serde(default, deserialize_with = "null_as_default")]
    pub easy: Vec<Block>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub normal: Vec<Block>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hard: Vec<Block>,
}

impl SparebeatMap {
    /// Base tempo. Zero when absent or not numeric; the timing walk
    /// substitutes its epsilon for that.
    pub fn bpm(&self) -> f64 {
        coerce_number(self.bpm.as_ref()).value
    }

    pub fn beats_per_measure(&self) -> u32 {
        let beats = coerce_number(self.beats.as_ref());
        if beats.valid && beats.value >= 1.0 {
            beats.value as u32
        } else {
            DEFAULT_BEATS
        }
    }

    pub fn start_time_ms(&self) -> f64 {
        coerce_number(self.start_time.as_ref()).value
    }

    /// Enabled iff the indicator is numeric and neither `0` nor `-1`.
    pub fn is_enabled(&self, level: DifficultyLevel) -> bool {
        let raw = match level {
            DifficultyLevel::Easy => self.level.easy.as_ref(),
            DifficultyLevel::Normal => self.level.normal.as_ref(),
            DifficultyLevel::Hard => self.level.hard.as_ref(),
        };
        let indicator = coerce_number(raw);
        indicator.valid && indicator.value != 0.0 && indicator.value != -1.0
    }

    pub fn enabled_levels(&self) -> impl Iterator<Item = DifficultyLevel> + '_ {
        DifficultyLevel::ALL
            .into_iter()
            .filter(|level| self.is_enabled(*level))
    }

    pub fn blocks(&self, level: DifficultyLevel) -> &[Block] {
        match level {
            DifficultyLevel::Easy => &self.map.easy,
            DifficultyLevel::Normal => &self.map.normal,
            DifficultyLevel::Hard => &self.map.hard,
        }
    }

    /// The two background gradient colors, if exactly two are given.
    pub fn gradient(&self) -> Option<(&str, &str)> {
        match self.bg_color.as_deref() {
            Some([top, bottom]) => Some((top.as_str(), bottom.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Rows(String),
    Directive(Directive),
    Invalid { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directive {
    pub bpm: Option<f64>,
    pub speed: Option<f64>,
    pub bar_line: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawDirective {
    #[serde(default)]
    bpm: Option<LooseNumber>,
    #[serde(default)]
    speed: Option<LooseNumber>,
    #[serde(default, rename = "barLine")]
    bar_line: Option<bool>,
}

impl RawDirective {
    fn resolve(self) -> Result<Directive, String> {
        Ok(Directive {
            bpm: resolve_field("bpm", self.bpm.as_ref())?,
            speed: resolve_field("speed", self.speed.as_ref())?,
            bar_line: self.bar_line,
        })
    }
}

fn resolve_field(name: &str, raw: Option<&LooseNumber>) -> Result<Option<f64>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let coerced = coerce_number(Some(raw));
    if coerced.valid {
        Ok(Some(coerced.value))
    } else {
        Err(format!("{name} is not numeric: {raw:?}"))
    }
}

impl Block {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(rows) => Block::Rows(rows),
            Value::Object(_) => match serde_json::from_value::<RawDirective>(value) {
                Ok(raw) => match raw.resolve() {
                    Ok(directive) => Block::Directive(directive),
                    Err(reason) => Block::Invalid { reason },
                },
                Err(e) => Block::Invalid {
                    reason: format!("undecodable directive: {e}"),
                },
            },
            other => Block::Invalid {
                reason: format!("unsupported block: {other}"),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Block::from_value)
    }
}
