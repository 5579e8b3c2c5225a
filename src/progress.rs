//! Resolution progress reporting.
//!
//! Reports which element is being resolved and how many entities it produced,
//! so `setlist playlist --debug` shows the pipeline walking its tree.
//! `--progress json` switches to one JSON object per line.
//! Progress is emitted on **stderr** so stdout stays clean for the playlist.

use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

/// A single progress event during `Pipeline::generate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveEvent {
    /// About to resolve this element's sources, then the element itself.
    Resolving { element: String, depth: usize },
    /// Element resolved and produced `count` entities.
    Resolved {
        element: String,
        depth: usize,
        count: usize,
    },
}

/// Receives resolution events. Implementations write to stderr (human or JSON).
pub trait ResolveReporter: Send + Sync {
    fn report(&self, event: ResolveEvent);
}

/// Human-friendly progress on stderr, indented by tree depth:
/// `  resolve country Germany ... 50 entities`.
pub struct StderrProgress;

impl ResolveReporter for StderrProgress {
    fn report(&self, event: ResolveEvent) {
        let line = match &event {
            ResolveEvent::Resolving { element, depth } => {
                format!("{}resolve {} ...\n", indent(*depth), element)
            }
            ResolveEvent::Resolved {
                element,
                depth,
                count,
            } => format!(
                "{}{} -> {} {}\n",
                indent(*depth),
                element,
                count,
                if *count == 1 { "entity" } else { "entities" }
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ResolveReporter for JsonProgress {
    fn report(&self, event: ResolveEvent) {
        let line = json_line(&event);
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
        let _ = std::io::stderr().lock().flush();
    }
}

/// `{"event":"resolved","element":"...","depth":0,"count":3}`
fn json_line(event: &ResolveEvent) -> String {
    let obj = match event {
        ResolveEvent::Resolving { element, depth } => serde_json::json!({
            "event": "resolving",
            "element": element,
            "depth": depth
        }),
        ResolveEvent::Resolved {
            element,
            depth,
            count,
        } => serde_json::json!({
            "event": "resolved",
            "element": element,
            "depth": depth,
            "count": count
        }),
    };
    obj.to_string()
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ResolveReporter for NoProgress {
    fn report(&self, _event: ResolveEvent) {}
}

/// Keeps every event in memory; handy for inspecting resolution order.
#[derive(Default)]
pub struct CollectProgress {
    events: Mutex<Vec<ResolveEvent>>,
}

impl CollectProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ResolveEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ResolveReporter for CollectProgress {
    fn report(&self, event: ResolveEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl<R: ResolveReporter + ?Sized> ResolveReporter for std::sync::Arc<R> {
    fn report(&self, event: ResolveEvent) {
        (**self).report(event)
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// `--debug` turns on human progress.
    pub fn from_debug(debug: bool) -> Self {
        if debug {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ResolveReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Ok(ProgressMode::Off),
            "human" => Ok(ProgressMode::Human),
            "json" => Ok(ProgressMode::Json),
            other => Err(format!(
                "unknown progress mode '{}' (expected off, human or json)",
                other
            )),
        }
    }
}
