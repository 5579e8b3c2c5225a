//! Implementations of the `setlist` subcommands.
//!
//! Each function prints to stdout and returns `anyhow::Result`, so `main`
//! stays a thin dispatcher.

use anyhow::{Context, Result};
use std::path::Path;

use crate::export::export_playlist;
use crate::patch::{validate_args, PatchRegistry};
use crate::pipeline::{Pipeline, Playlist};
use crate::progress::ProgressMode;

/// `setlist list`: every registered patch with its description.
pub fn run_list(registry: &PatchRegistry) -> Result<()> {
    if registry.is_empty() {
        println!("No patches registered.");
        return Ok(());
    }

    println!("{:<20} DESCRIPTION", "PATCH");
    for patch in registry.patches() {
        println!("{:<20} {}", patch.slug(), patch.description());
    }
    Ok(())
}

/// `setlist info <patch>`: description and expected inputs.
pub fn run_info(registry: &PatchRegistry, slug: &str) -> Result<()> {
    let patch = registry.find(slug).with_context(|| {
        format!(
            "Cannot load patch '{}'. Use `setlist list` to see available patches.",
            slug
        )
    })?;

    println!("patch {}", patch.slug());
    println!("  {}", patch.description());
    println!();
    println!("  expected inputs:");
    for input in patch.inputs() {
        let presence = match (&input.default, input.optional) {
            (Some(default), _) => format!("optional, default {}", default),
            (None, true) => "optional".to_string(),
            (None, false) => "required".to_string(),
        };
        println!("    {:<16} {:<24} {}", input.name, input.kind.to_string(), presence);
    }
    Ok(())
}

/// `setlist playlist <patch> [args...]`: validate, build, generate, print.
///
/// `progress` overrides the reporter that `debug` would pick.
pub async fn run_playlist(
    registry: &PatchRegistry,
    slug: &str,
    args: &[String],
    debug: bool,
    progress: Option<ProgressMode>,
    output: Option<&Path>,
) -> Result<Playlist> {
    let patch = registry.find(slug).with_context(|| {
        format!(
            "Cannot load patch '{}'. Use `setlist list` to see available patches.",
            slug
        )
    })?;

    let values = validate_args(patch, args)?;
    let root = patch.create(&values)?;

    let mode = progress.unwrap_or_else(|| ProgressMode::from_debug(debug));
    let mut pipeline = Pipeline::new().with_reporter(mode.reporter());
    pipeline.set_source(root);
    pipeline
        .generate(debug)
        .await
        .context("Failed to generate playlist")?;

    let playlist = pipeline
        .into_playlist()
        .context("Pipeline finished without a playlist")?;

    print_playlist(&playlist);
    if let Some(path) = output {
        export_playlist(&playlist, Some(path))?;
    }

    Ok(playlist)
}

fn print_playlist(playlist: &Playlist) {
    println!("{}", playlist.name);
    for (i, entity) in playlist.entities.iter().enumerate() {
        println!("{:>4}. {}", i + 1, entity.label());
    }
    println!(
        "-- generated playlist with {} {}.",
        playlist.len(),
        if playlist.len() == 1 { "entry" } else { "entries" }
    );
}
