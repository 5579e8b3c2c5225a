//! # setlist
//!
//! Composable playlist pipelines built from small, typed elements.
//!
//! A [`patch::Patch`] turns validated arguments into a tree of
//! [`element::Element`]s. [`pipeline::Pipeline`] resolves that tree
//! depth-first, feeding each element the outputs of its sources, and the
//! root's output becomes the playlist.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Patch    │──▶│ Element tree │──▶│   Pipeline   │──▶ Playlist
//! │ slug+args  │   │ sources ...  │   │ depth-first  │
//! └────────────┘   └──────┬───────┘   └──────────────┘
//!                         │ data-origin elements
//!                         ▼
//!                 ┌────────────────┐
//!                 │ RecordingSource│  MusicBrainz / ListenBrainz
//!                 └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! setlist list                              # available patches
//! setlist info top-country                  # inputs of a patch
//! setlist playlist top-country Germany hard --debug
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Music entities |
//! | [`error`] | Element and pipeline error types |
//! | [`ranked`] | Rank-ordered lists and percentile-window sampling |
//! | [`element`] | Element trait and shared pipeline state |
//! | [`pipeline`] | Depth-first resolution and the playlist artifact |
//! | [`patch`] | Patch trait, argument validation, registry |
//! | [`patches`] | Built-in patches |
//! | [`filters`] | Generic recording filters |
//! | [`source`] | External metadata services |
//! | [`progress`] | Resolution progress output |
//! | [`config`] | TOML configuration |
//! | [`export`] | JSON playlist export |
//! | [`commands`] | CLI subcommand implementations |

pub mod commands;
pub mod config;
pub mod element;
pub mod error;
pub mod export;
pub mod filters;
pub mod models;
pub mod patch;
pub mod patches;
pub mod pipeline;
pub mod progress;
pub mod ranked;
pub mod source;
