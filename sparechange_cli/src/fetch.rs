use std::time::Duration;

use anyhow::{ensure, Context};
use tracing::info;

const PLAY_PATH: &str = "sparebeat.com/play/";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// A map on sparebeat.com, named by id or by its play page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MapReference {
    pub(crate) id: String,
    pub(crate) beta: bool,
}

impl MapReference {
    /// A `beta.` host in the URL selects the beta site even without `--beta`.
    pub(crate) fn parse(input: &str, beta: bool) -> anyhow::Result<Self> {
        let input = input.trim();

        if let Some(at) = input.find(PLAY_PATH) {
            let host_is_beta = input[..at].ends_with("beta.");
            let id = input[at + PLAY_PATH.len()..]
                .split(['/', '?', '#'])
                .next()
                .unwrap_or_default();
            ensure!(!id.is_empty(), "no map id in url: {input}");
            return Ok(Self {
                id: id.to_string(),
                beta: beta || host_is_beta,
            });
        }

        ensure!(
            !input.is_empty() && !input.contains(['/', '?', '#']),
            "not a sparebeat map id or url: {input}"
        );
        Ok(Self {
            id: input.to_string(),
            beta,
        })
    }

    pub(crate) fn map_url(&self) -> String {
        if self.beta {
            format!("https://beta.sparebeat.com/api/tracks/{}/map", self.id)
        } else {
            format!("https://sparebeat.com/play/{}/map", self.id)
        }
    }

    pub(crate) fn audio_url(&self) -> String {
        if self.beta {
            format!("https://beta.sparebeat.com/api/tracks/{}/audio", self.id)
        } else {
            format!("https://sparebeat.com/play/{}/music", self.id)
        }
    }
}

pub(crate) fn download(url: &str) -> anyhow::Result<Vec<u8>> {
    info!(%url, "downloading");
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .context("failed to create http client")?;

    let response = client.get(url).send().context("request failed")?;
    if !response.status().is_success() {
        anyhow::bail!("download failed with HTTP {}", response.status());
    }

    let bytes = response.bytes().context("failed to read response body")?;
    Ok(bytes.to_vec())
}
