//! Startup check for newer releases.

use neo4j_version::parse_version_string;
use reqwest::Client;
use semver::Version;
use serde::Deserialize;

/// GitHub releases of this tool.
pub const RELEASES_URL: &str =
    "https://api.github.com/repos/BioDWH2/Neo4j-GraphML-Importer/releases";

/// The subset of a GitHub release the check needs.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

/// A release newer than the running binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUpdate {
    pub version: Version,
    pub url: Option<String>,
}

/// Pick the newest published release that is newer than `current`.
///
/// Tags may carry a leading `v`. Drafts, pre-releases and tags that do not
/// parse as versions are ignored.
pub fn newest_release(releases: &[GithubRelease], current: &Version) -> Option<AvailableUpdate> {
    releases
        .iter()
        .filter(|release| !release.draft && !release.prerelease)
        .filter_map(|release| {
            let version = parse_version_string(release.tag_name.trim_start_matches(['v', 'V'])).ok()?;
            Some(AvailableUpdate {
                version,
                url: release.html_url.clone(),
            })
        })
        .filter(|update| update.version > *current)
        .max_by(|a, b| a.version.cmp(&b.version))
}

async fn fetch_releases() -> anyhow::Result<Vec<GithubRelease>> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client.get(RELEASES_URL).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("Release list returned status {}", response.status());
    }
    Ok(response.json().await?)
}

/// Log a notice when a newer release is available. Failures are ignored.
pub async fn check_for_update() {
    let current = match Version::parse(env!("CARGO_PKG_VERSION")) {
        Ok(version) => version,
        Err(_) => return,
    };
    let releases = match fetch_releases().await {
        Ok(releases) => releases,
        Err(e) => {
            tracing::debug!("Update check failed: {e:#}");
            return;
        }
    };
    if let Some(update) = newest_release(&releases, &current) {
        tracing::info!("=======================================");
        tracing::info!("New version {} of graphml-neo4j-importer is available", update.version);
        if let Some(url) = update.url {
            tracing::info!("{url}");
        }
        tracing::info!("=======================================");
    }
}
