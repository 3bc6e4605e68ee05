//! Routing of incoming messages to bookmark handler kinds and the
//! per-kind archival logic.

mod classify;
mod service;
mod twitter;
mod web_page;
mod youtube;

use serde::Deserialize;
use std::path::PathBuf;

pub(crate) use classify::*;
pub(crate) use service::*;

#[derive(Deserialize)]
pub(crate) struct Config {
    /// Where photo/document/web page snapshots end up on disk.
    pub(crate) output_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum BookmarkError {
    #[error("There is nothing in this message I could bookmark")]
    UnsupportedMessage,
}
