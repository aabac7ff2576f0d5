//! Fixture loading
//!
//! The in-memory store is seeded from YAML. Without a path the bundled
//! storefront is used.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use satchel_app::backend::{InMemoryBackend, Seed};

const BUNDLED: &str = include_str!("../../../fixtures/storefront.yaml");

/// Errors from reading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("failed to read fixture {path}")]
    Read {
        /// Requested file
        path: PathBuf,

        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The fixture is not valid seed YAML.
    #[error("failed to parse fixture")]
    Parse(#[from] serde_norway::Error),
}

/// Parse seed YAML.
///
/// # Errors
///
/// Returns [`FixtureError::Parse`] if the YAML does not describe a seed.
pub fn parse_seed(yaml: &str) -> Result<Seed, FixtureError> {
    Ok(serde_norway::from_str(yaml)?)
}

/// Build a store from `path`, or from the bundled storefront.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_backend(path: Option<&Path>) -> Result<InMemoryBackend, FixtureError> {
    let seed = match path {
        Some(path) => {
            let yaml = fs::read_to_string(path).map_err(|source| FixtureError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            parse_seed(&yaml)?
        }
        None => parse_seed(BUNDLED)?,
    };

    Ok(InMemoryBackend::from_seed(seed))
}
