use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use osu_schema::OsuFile;
use sparebeat_converter::{convert_map, ConvertOptions, ConvertedMap};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod archive;
mod background;
mod fetch;

use archive::ArchiveEntry;
use fetch::MapReference;

#[derive(Debug, Parser)]
#[command(name = "sparechange")]
#[command(about = "Convert Sparebeat maps into osu!mania beatmap archives", long_about = None)]
struct Cli {
    /// Sparebeat map id or play URL
    map: Option<String>,
    /// Fetch from the beta site
    #[arg(short, long)]
    beta: bool,
    /// Local map JSON instead of downloading
    #[arg(short, long)]
    path: Option<PathBuf>,
    /// Local audio file instead of downloading
    #[arg(short, long)]
    music: Option<PathBuf>,
    /// Directory for the .osz archive
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let reference = cli
        .map
        .as_deref()
        .map(|input| MapReference::parse(input, cli.beta))
        .transpose()?;

    let map_source = Source::pick(cli.path, reference.as_ref().map(MapReference::map_url))
        .context("no map given: pass a map id or url, or --path <map.json>")?;
    let audio_source = Source::pick(cli.music, reference.as_ref().map(MapReference::audio_url))
        .context("--music is required when converting a local map without a map id")?;

    let map_json = map_source.load("map")?;
    let map = sparebeat_converter::parse_map_slice(&map_json)
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("failed to parse map")?;
    info!(title = %map.title, artist = %map.artist, "loaded map");

    let converted = convert_map(&map, &ConvertOptions::default());
    if converted.difficulties.is_empty() {
        warn!("no difficulty is enabled; the archive will hold no charts");
    }
    for file in &converted.difficulties {
        log_difficulty(file);
    }

    let audio = audio_source.load("audio")?;

    let background = background::render_png(map.gradient())?;

    let out_path = cli.out_dir.join(converted.archive_name());
    archive::write_osz(&out_path, &archive_entries(&converted, audio, background))
        .with_context(|| format!("failed to write archive: {}", out_path.display()))?;
    info!(path = %out_path.display(), "wrote archive");

    Ok(())
}

/// Where one input comes from; a local path wins over the download.
#[derive(Debug)]
enum Source {
    Local(PathBuf),
    Remote(String),
}

impl Source {
    fn pick(local: Option<PathBuf>, remote: Option<String>) -> Option<Self> {
        local.map(Self::Local).or(remote.map(Self::Remote))
    }

    fn load(&self, what: &str) -> anyhow::Result<Vec<u8>> {
        match self {
            Self::Local(path) => read_file(path, what),
            Self::Remote(url) => {
                fetch::download(url).with_context(|| format!("failed to fetch {what}: {url}"))
            }
        }
    }
}

fn read_file(path: &Path, what: &str) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {what}: {}", path.display()))
}

fn log_difficulty(file: &OsuFile) {
    info!(
        difficulty = %file.metadata.version,
        notes = file.hit_objects.len(),
        timing_points = file.timing_points.len(),
        "converted difficulty"
    );
}

fn archive_entries(
    converted: &ConvertedMap,
    audio: Vec<u8>,
    background: Vec<u8>,
) -> Vec<ArchiveEntry> {
    let options = ConvertOptions::default();
    let mut entries: Vec<ArchiveEntry> = converted
        .rendered_files()
        .into_iter()
        .map(|(name, text)| ArchiveEntry::new(name, text.into_bytes()))
        .collect();
    entries.push(ArchiveEntry::new(options.audio_filename, audio));
    entries.push(ArchiveEntry::new(options.background_filename, background));
    entries
}
