//! Export a generated playlist as JSON.
//!
//! Writes the playlist name, per-element descriptions and the ordered
//! entities, so an external renderer can pick them up.

use anyhow::{Context, Result};
use std::path::Path;

use crate::pipeline::Playlist;

/// Write `playlist` as pretty JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub fn export_playlist(playlist: &Playlist, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(playlist)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} entities to {}",
                playlist.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
