//! JSON fixtures standing in for the CMS repositories
//!
//! Content items and stored collections are read from JSON arrays, a
//! submission from a single JSON object, in the same shape the library
//! types serialize to.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use info_collection::config::InfoCollectionConfig;
use info_collection::content::{Content, InMemoryContentRepository, SubmissionEvent};
use info_collection::export::{Collection, InMemoryCollections};
use serde::de::DeserializeOwned;

/// Service name used when no configuration file is given
pub const SERVICE_NAME: &str = "infocollect";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load content items from a JSON array
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not an array of
/// content items
pub fn load_contents(path: &Path) -> Result<InMemoryContentRepository> {
    let contents: Vec<Content> = read_json(path)?;
    Ok(contents.into_iter().collect())
}

/// Load a submission event from a JSON object
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed
pub fn load_event(path: &Path) -> Result<SubmissionEvent> {
    read_json(path)
}

/// Load stored collections from a JSON array
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed
pub fn load_collections(path: &Path) -> Result<InMemoryCollections> {
    let collections: Vec<Collection> = read_json(path)?;
    Ok(collections.into_iter().collect())
}

/// Load configuration from `path`, or from the standard locations
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid
pub fn load_config(path: Option<&Path>) -> Result<InfoCollectionConfig> {
    match path {
        Some(path) => {
            let path = path
                .to_str()
                .with_context(|| format!("Config path is not UTF-8: {}", path.display()))?;
            InfoCollectionConfig::load_from(path)
        }
        None => InfoCollectionConfig::load_for_service(SERVICE_NAME),
    }
}
