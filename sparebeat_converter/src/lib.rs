use osu_schema::{Difficulty, OsuFile};
use serde_json::Value;
use tracing::debug;

mod error;
mod generate;
mod holds;
mod host;
mod lexer;
mod model;
mod sanitize;
mod time_map;
mod writer;

pub use error::{ConvertError, ConvertErrorKind};
pub use host::{convert_for_host, HostMetadata, HostResponse};
pub use model::{
    coerce_number, Block, Charts, Coerced, DifficultyLevel, Directive, Levels, LooseNumber,
    SparebeatMap, DEFAULT_BEATS,
};
pub use sanitize::{sanitize_filename, sanitize_with_fallback, FALLBACK_FILENAME};
pub use writer::{read_timing_points, render_osu, write_osu};

use generate::{build_difficulty, SharedSections};

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub creator: String,
    pub audio_filename: String,
    pub background_filename: String,
    pub tags: Vec<String>,
    /// Emitted as-is; no rating is computed.
    pub difficulty: Difficulty,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            creator: "Sparebeat".to_string(),
            audio_filename: "audio.mp3".to_string(),
            background_filename: "background.png".to_string(),
            tags: vec!["sparebeat".to_string()],
            difficulty: Difficulty {
                hp_drain_rate: 5.0,
                circle_size: 4.0,
                overall_difficulty: 5.0,
                approach_rate: 5.0,
                slider_multiplier: 1.4,
                slider_tick_rate: 1.0,
            },
        }
    }
}

/// Every enabled difficulty of one map, ready to render.
#[derive(Debug, Clone)]
pub struct ConvertedMap {
    pub title: String,
    pub artist: String,
    pub difficulties: Vec<OsuFile>,
}

impl ConvertedMap {
    pub fn archive_name(&self) -> String {
        sanitize_filename(&format!("{} - {}.osz", self.artist, self.title))
    }

    /// `(sanitized file name, document text)` per difficulty.
    pub fn rendered_files(&self) -> Vec<(String, String)> {
        self.difficulties
            .iter()
            .map(|file| (sanitize_filename(&file.file_name()), render_osu(file)))
            .collect()
    }
}

pub fn parse_map(json: &str) -> Result<SparebeatMap, ConvertError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ConvertError::new("E1001", format!("invalid map json: {e}")))?;
    parse_map_value(value)
}

pub fn parse_map_slice(bytes: &[u8]) -> Result<SparebeatMap, ConvertError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ConvertError::new("E1001", format!("invalid map json: {e}")))?;
    parse_map_value(value)
}

fn parse_map_value(value: Value) -> Result<SparebeatMap, ConvertError> {
    if !value.is_object() {
        return Err(ConvertError::new("E1002", "map json must be an object")
            .with_context(json_kind(&value)));
    }
    serde_json::from_value(value)
        .map_err(|e| ConvertError::new("E1001", format!("map does not match the sparebeat schema: {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn convert_str(json: &str) -> Result<ConvertedMap, ConvertError> {
    convert_str_with_options(json, &ConvertOptions::default())
}

pub fn convert_str_with_options(
    json: &str,
    options: &ConvertOptions,
) -> Result<ConvertedMap, ConvertError> {
    let map = parse_map(json)?;
    Ok(convert_map(&map, options))
}

pub fn convert_map(map: &SparebeatMap, options: &ConvertOptions) -> ConvertedMap {
    let shared = SharedSections::new(map, options);
    let difficulties: Vec<OsuFile> = map
        .enabled_levels()
        .map(|level| build_difficulty(map, level, &shared, options))
        .collect();

    debug!(
        title = %map.title,
        difficulties = difficulties.len(),
        "converted map"
    );

    ConvertedMap {
        title: map.title.clone(),
        artist: map.artist.clone(),
        difficulties,
    }
}
