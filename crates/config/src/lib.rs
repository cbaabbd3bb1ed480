//! Credential discovery and environment setup for the hosted Gemini backend.
//!
//! Scans the working directory for a GCP service-account key file and
//! exports the environment variables the model client reads.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Path of the discovered key file, consumed as application default credentials.
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
/// Backend-selection flag: `"true"` routes the client through Vertex AI.
pub const ENV_USE_VERTEX: &str = "GOOGLE_GENAI_USE_VERTEXAI";
/// Resolved GCP project identifier.
pub const ENV_PROJECT: &str = "GOOGLE_CLOUD_PROJECT";
/// Vertex AI region, defaulted when unset.
pub const ENV_LOCATION: &str = "GOOGLE_CLOUD_LOCATION";

/// Region used when `GOOGLE_CLOUD_LOCATION` is not set.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Errors in credential discovery
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid credential file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no service account JSON found in {0} (place your GCP key file there)")]
    NoCredentials(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// The fields of a service-account key file we care about. Everything else
/// (private key material, client email) stays on disk.
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    #[serde(rename = "type")]
    key_type: Option<String>,
    project_id: Option<String>,
}

/// Outcome of credential discovery
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub project_id: String,
    pub location: String,
    pub credentials_path: PathBuf,
}

/// Scan a directory for the first `*.json` file that parses as a
/// service-account descriptor with a project id. Directory order wins;
/// unreadable or unrelated JSON files are skipped.
fn find_service_account(dir: &Path) -> Result<Option<(String, PathBuf)>> {
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                debug!("skipping unreadable {}: {}", path.display(), e);
                continue;
            }
        };

        match serde_json::from_str::<ServiceAccountKey>(&content) {
            Ok(key) if key.key_type.as_deref() == Some("service_account") => {
                if let Some(project_id) = key.project_id {
                    return Ok(Some((project_id, path)));
                }
                debug!("skipping {}: no project_id", path.display());
            }
            Ok(_) => debug!("skipping {}: not a service account key", path.display()),
            Err(e) => debug!("skipping {}: {}", path.display(), e),
        }
    }

    Ok(None)
}

/// Resolve credentials from the current working directory.
///
/// See [`resolve_credentials_in`] for the contract.
pub fn resolve_credentials() -> Result<ResolvedCredentials> {
    let dir = std::env::current_dir()?;
    resolve_credentials_in(&dir)
}

/// Locate a service-account key in `dir`, then export the environment the
/// Gemini client consumes: the credentials path, the Vertex backend flag,
/// the project id, and the location (preexisting value kept, else
/// [`DEFAULT_LOCATION`]).
///
/// The side effect is process-wide. Calling this once per agent is
/// idempotent; every call re-scans the directory and re-sets the same
/// variables.
pub fn resolve_credentials_in(dir: &Path) -> Result<ResolvedCredentials> {
    let (project_id, credentials_path) =
        find_service_account(dir)?.ok_or_else(|| ConfigError::NoCredentials(dir.to_path_buf()))?;

    let location = std::env::var(ENV_LOCATION).unwrap_or_else(|_| DEFAULT_LOCATION.to_string());

    std::env::set_var(ENV_CREDENTIALS, &credentials_path);
    std::env::set_var(ENV_USE_VERTEX, "true");
    std::env::set_var(ENV_PROJECT, &project_id);
    std::env::set_var(ENV_LOCATION, &location);

    info!("connecting to Vertex AI (project: {}, location: {})", project_id, location);
    debug!("using credentials: {}", credentials_path.display());

    Ok(ResolvedCredentials {
        project_id,
        location,
        credentials_path,
    })
}
