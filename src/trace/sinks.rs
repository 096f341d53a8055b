//! Built-in tracers.

use super::{TraceEvent, Tracer};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryTracer {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemoryTracer {
    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    /// Recorded events with the given name.
    pub fn named(&self, name: &str) -> Vec<TraceEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.name == name)
            .collect()
    }
}

impl Tracer for MemoryTracer {
    fn record(&self, event: &TraceEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(event.clone());
    }
}

/// Appends every event as one JSON line to a file.
///
/// The file and its parent directory are created on first write. Write
/// failures are logged and otherwise ignored; tracing never fails a run.
#[derive(Debug)]
pub struct JsonlTracer {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlTracer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl Tracer for JsonlTracer {
    fn record(&self, event: &TraceEvent) {
        let _guard = self.lock.lock().unwrap_or_else(|poison| poison.into_inner());

        let result = event
            .to_ndjson_line()
            .map_err(std::io::Error::other)
            .and_then(|line| self.append(&line));

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write trace event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_tracer_filters_by_name() {
        let tracer = MemoryTracer::default();
        tracer.record(&TraceEvent::new("render"));
        tracer.record(&TraceEvent::new("parse"));
        tracer.record(&TraceEvent::new("render"));

        assert_eq!(tracer.events().len(), 3);
        assert_eq!(tracer.named("render").len(), 2);
        assert!(tracer.named("execute").is_empty());
    }

    #[test]
    fn test_jsonl_tracer_appends_one_line_per_event() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("runs/trace.ndjson");
        let tracer = JsonlTracer::new(&path);

        tracer.record(&TraceEvent::new("render").with_fact("result", "a"));
        tracer.record(&TraceEvent::new("parse").with_fact("result", "b"));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: TraceEvent = serde_json::from_str(lines[0]).unwrap();
        let second: TraceEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first.name, "render");
        assert_eq!(second.facts["result"], "b");
    }
}
