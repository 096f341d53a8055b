//! Observability for pipeline runs.
//!
//! Every stage invocation and every drained stream produces a [`TraceEvent`]:
//! a name plus named facts (`signature`, `inputs`, `result`, ...). Events are
//! always logged through `tracing` at debug level and then handed to every
//! registered [`Tracer`].
//!
//! ```no_run
//! use prompty::trace::{JsonlTracer, add_tracer};
//! use std::sync::Arc;
//!
//! add_tracer(Arc::new(JsonlTracer::new(".runs/trace.ndjson")));
//! ```

mod event;
mod sinks;

pub use event::TraceEvent;
pub use sinks::{JsonlTracer, MemoryTracer};

use std::sync::{Arc, LazyLock, RwLock};

/// A sink for trace events.
pub trait Tracer: Send + Sync {
    fn record(&self, event: &TraceEvent);
}

static TRACERS: LazyLock<RwLock<Vec<Arc<dyn Tracer>>>> = LazyLock::new(|| RwLock::new(Vec::new()));

/// Register a process-wide tracer.
pub fn add_tracer(tracer: Arc<dyn Tracer>) {
    TRACERS
        .write()
        .unwrap_or_else(|poison| poison.into_inner())
        .push(tracer);
}

/// Remove every registered tracer.
pub fn clear_tracers() {
    TRACERS
        .write()
        .unwrap_or_else(|poison| poison.into_inner())
        .clear();
}

/// Log an event and hand it to every registered tracer.
pub fn emit(event: &TraceEvent) {
    tracing::debug!(name = %event.name, facts = %serde_json::Value::Object(event.facts.clone()), "trace");

    // Snapshot so a tracer may register others without deadlocking.
    let tracers: Vec<Arc<dyn Tracer>> = TRACERS
        .read()
        .unwrap_or_else(|poison| poison.into_inner())
        .clone();
    for tracer in tracers {
        tracer.record(event);
    }
}
