use std::fmt::{self, Write};

use osu_schema::{Effects, Event, HitObject, OsuFile, TimingPoint};

use crate::ConvertError;

const TIMING_POINTS_HEADER: &str = "[TimingPoints]";

pub fn render_osu(file: &OsuFile) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_osu(file, &mut out);
    out
}

pub fn write_osu<W: Write>(file: &OsuFile, out: &mut W) -> fmt::Result {
    writeln!(out, "osu file format v{}", file.version)?;
    writeln!(out)?;

    let general = &file.general;
    writeln!(out, "[General]")?;
    writeln!(out, "AudioFilename: {}", general.audio_filename)?;
    writeln!(out, "AudioLeadIn: {}", general.audio_lead_in)?;
    writeln!(out, "PreviewTime: {}", general.preview_time)?;
    writeln!(out, "Countdown: {}", general.countdown)?;
    writeln!(out, "SampleSet: {}", general.sample_set)?;
    writeln!(out, "StackLeniency: {}", general.stack_leniency)?;
    writeln!(out, "Mode: {}", general.mode.code())?;
    writeln!(out)?;

    let meta = &file.metadata;
    writeln!(out, "[Metadata]")?;
    writeln!(out, "Title:{}", meta.title)?;
    writeln!(out, "TitleUnicode:{}", meta.title_unicode)?;
    writeln!(out, "Artist:{}", meta.artist)?;
    writeln!(out, "ArtistUnicode:{}", meta.artist_unicode)?;
    writeln!(out, "Creator:{}", meta.creator)?;
    writeln!(out, "Version:{}", meta.version)?;
    writeln!(out, "Source:{}", meta.source)?;
    writeln!(out, "Tags:{}", meta.tags.join(" "))?;
    writeln!(out)?;

    let diff = &file.difficulty;
    writeln!(out, "[Difficulty]")?;
    writeln!(out, "HPDrainRate:{:.1}", diff.hp_drain_rate)?;
    writeln!(out, "CircleSize:{:.1}", diff.circle_size)?;
    writeln!(out, "OverallDifficulty:{:.1}", diff.overall_difficulty)?;
    writeln!(out, "ApproachRate:{:.1}", diff.approach_rate)?;
    writeln!(out, "SliderMultiplier:{:.1}", diff.slider_multiplier)?;
    writeln!(out, "SliderTickRate:{:.1}", diff.slider_tick_rate)?;
    writeln!(out)?;

    writeln!(out, "[Events]")?;
    writeln!(out, "//Background and Video events")?;
    for event in &file.events {
        write_event(out, event)?;
    }
    writeln!(out)?;

    writeln!(out, "{TIMING_POINTS_HEADER}")?;
    for point in &file.timing_points {
        write_timing_point(out, point)?;
    }
    writeln!(out)?;

    writeln!(out, "[HitObjects]")?;
    for object in &file.hit_objects {
        write_hit_object(out, object)?;
    }
    Ok(())
}

fn write_event<W: Write>(out: &mut W, event: &Event) -> fmt::Result {
    match event {
        Event::Background {
            start_time,
            filename,
            x_offset,
            y_offset,
        } => writeln!(out, "0,{start_time},\"{filename}\",{x_offset},{y_offset}"),
    }
}

// the 8th field carries the effect bits (kiai, omit first bar line)
fn write_timing_point<W: Write>(out: &mut W, point: &TimingPoint) -> fmt::Result {
    writeln!(
        out,
        "{},{:.2},{},{},{},{},{},{}",
        point.time,
        point.beat_length,
        point.meter,
        point.sample_set,
        point.sample_index,
        point.volume,
        u8::from(point.uninherited),
        point.effects.bits(),
    )
}

fn write_hit_object<W: Write>(out: &mut W, object: &HitObject) -> fmt::Result {
    write!(
        out,
        "{},{},{},{},{},",
        object.x,
        object.y,
        object.time,
        object.kind.type_code(),
        object.hit_sound,
    )?;
    if let Some(end_time) = object.kind.end_time() {
        write!(out, "{end_time}:")?;
    }
    let sample = &object.hit_sample;
    writeln!(
        out,
        "{}:{}:{}:{}:{}",
        sample.normal_set, sample.addition_set, sample.index, sample.volume, sample.filename
    )
}

/// Reads the `[TimingPoints]` section of a rendered document back.
pub fn read_timing_points(text: &str) -> Result<Vec<TimingPoint>, ConvertError> {
    let mut points = Vec::new();
    let mut in_section = false;

    for (i, raw_line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim();
        if line.starts_with('[') {
            in_section = line == TIMING_POINTS_HEADER;
            continue;
        }
        if !in_section || line.is_empty() || line.starts_with("//") {
            continue;
        }
        points.push(parse_timing_point(line).map_err(|message| {
            ConvertError::new("E2001", message)
                .with_line(line_no)
                .with_context(line.to_string())
        })?);
    }
    Ok(points)
}

fn parse_timing_point(line: &str) -> Result<TimingPoint, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if !(7..=8).contains(&fields.len()) {
        return Err(format!("timing point must have 7 or 8 fields (got {})", fields.len()));
    }

    fn field<T: std::str::FromStr>(fields: &[&str], idx: usize, name: &str) -> Result<T, String> {
        fields[idx]
            .parse()
            .map_err(|_| format!("invalid {name}: {}", fields[idx]))
    }

    let uninherited = match fields[6] {
        "0" => false,
        "1" => true,
        other => return Err(format!("invalid uninherited flag: {other}")),
    };
    let effects = match fields.get(7) {
        Some(_) => Effects::from_bits(field(&fields, 7, "effects")?),
        None => Effects::NONE,
    };

    Ok(TimingPoint {
        time: field(&fields, 0, "time")?,
        beat_length: field(&fields, 1, "beat length")?,
        meter: field(&fields, 2, "meter")?,
        sample_set: field(&fields, 3, "sample set")?,
        sample_index: field(&fields, 4, "sample index")?,
        volume: field(&fields, 5, "volume")?,
        uninherited,
        effects,
    })
}
