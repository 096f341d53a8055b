use crate::definition::{Content, Prompty};
use crate::registry::{Executor, Parser, Processor, Registry, Renderer, Response};
use crate::stream::{AsyncPromptyStream, PromptyStream};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Sets or removes an environment variable, restoring the old value on drop.
///
/// Tests using this must be `#[serial]`.
pub(crate) struct EnvGuard {
    name: String,
    original: Option<OsString>,
}

impl EnvGuard {
    pub(crate) fn set(name: &str, value: &str) -> Self {
        let original = std::env::var_os(name);
        unsafe { std::env::set_var(name, value) };
        Self {
            name: name.to_string(),
            original,
        }
    }

    pub(crate) fn unset(name: &str) -> Self {
        let original = std::env::var_os(name);
        unsafe { std::env::remove_var(name) };
        Self {
            name: name.to_string(),
            original,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(value) => unsafe { std::env::set_var(&self.name, value) },
            None => unsafe { std::env::remove_var(&self.name) },
        }
    }
}

/// Write `content` to `dir/rel`, creating parent directories.
pub(crate) fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// Recording plugins
// =============================================================================

/// Shared log of plugin calls, in order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    fn push(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_string());
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Number of calls whose name starts with `prefix`.
    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.snapshot()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

/// Replaces `{{name}}` in text content with the matching value.
pub(crate) struct SubstituteRenderer {
    calls: Calls,
}

impl SubstituteRenderer {
    fn substitute(values: &Map<String, Value>, content: &Content) -> Value {
        let mut text = content.to_value().as_str().unwrap_or_default().to_string();
        for (name, value) in values {
            let replacement = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text = text.replace(&format!("{{{{{}}}}}", name), &replacement);
        }
        json!(text)
    }
}

#[async_trait]
impl Renderer for SubstituteRenderer {
    fn render(
        &self,
        prompty: &Prompty,
        values: &Map<String, Value>,
        content: &Content,
    ) -> anyhow::Result<Value> {
        assert!(prompty.template.nonce.is_some(), "nonce stamped before render");
        self.calls.push("render");
        Ok(Self::substitute(values, content))
    }

    async fn render_async(
        &self,
        prompty: &Prompty,
        values: &Map<String, Value>,
        content: &Content,
    ) -> anyhow::Result<Value> {
        assert!(prompty.template.nonce.is_some(), "nonce stamped before render");
        tokio::task::yield_now().await;
        self.calls.push("render_async");
        Ok(Self::substitute(values, content))
    }
}

/// Wraps rendered text as a single user message.
pub(crate) struct MessageParser {
    calls: Calls,
}

impl Parser for MessageParser {
    fn parse(&self, _prompty: &Prompty, rendered: Value) -> anyhow::Result<Value> {
        self.calls.push("parse");
        Ok(json!([{"role": "user", "content": rendered}]))
    }
}

/// Echoes content plus the effective model settings.
pub(crate) struct EchoExecutor {
    calls: Calls,
}

impl EchoExecutor {
    fn echo(prompty: &Prompty, content: Value) -> Response {
        Response::Value(json!({
            "content": content,
            "configuration": prompty.model.configuration,
            "parameters": prompty.model.parameters,
        }))
    }
}

#[async_trait]
impl Executor for EchoExecutor {
    fn execute(&self, prompty: &Prompty, content: Value) -> anyhow::Result<Response> {
        self.calls.push("execute");
        Ok(Self::echo(prompty, content))
    }

    async fn execute_async(&self, prompty: &Prompty, content: Value) -> anyhow::Result<Response> {
        tokio::task::yield_now().await;
        self.calls.push("execute_async");
        Ok(Self::echo(prompty, content))
    }
}

/// Streams each element of an array content.
pub(crate) struct ChunkExecutor {
    calls: Calls,
}

fn chunks(content: Value) -> Vec<Value> {
    match content {
        Value::Array(items) => items,
        other => vec![other],
    }
}

#[async_trait]
impl Executor for ChunkExecutor {
    fn execute(&self, _prompty: &Prompty, content: Value) -> anyhow::Result<Response> {
        self.calls.push("execute");
        Ok(PromptyStream::new("ChunkExecutor", chunks(content)).into())
    }

    async fn execute_async(&self, _prompty: &Prompty, content: Value) -> anyhow::Result<Response> {
        self.calls.push("execute_async");
        let source = futures::stream::iter(chunks(content));
        Ok(AsyncPromptyStream::new("ChunkExecutor", source).into())
    }
}

/// Fails every call.
#[derive(Default)]
pub(crate) struct FailingExecutor;

impl Executor for FailingExecutor {
    fn execute(&self, _prompty: &Prompty, _content: Value) -> anyhow::Result<Response> {
        anyhow::bail!("connection refused")
    }
}

/// Wraps complete results as `{"processed": ...}`; streams pass through.
pub(crate) struct WrapProcessor {
    calls: Calls,
}

impl Processor for WrapProcessor {
    fn process(&self, _prompty: &Prompty, response: Response) -> anyhow::Result<Response> {
        self.calls.push("process");
        Ok(match response {
            Response::Value(value) => Response::Value(json!({"processed": value})),
            stream => stream,
        })
    }
}

/// A registry with the built-ins plus recording plugins:
///
/// - renderer `mock`, parser `mock`
/// - executor + processor `echo`
/// - executor + processor `chunks`
/// - executor `broken` (always fails, no processor)
pub(crate) fn mock_registry(calls: &Calls) -> Registry {
    let registry = Registry::with_defaults();

    let c = calls.clone();
    registry.register_renderer("mock", move || SubstituteRenderer { calls: c.clone() });
    let c = calls.clone();
    registry.register_parser("mock", move || MessageParser { calls: c.clone() });

    for api in ["echo", "chunks"] {
        let c = calls.clone();
        registry.register_processor(api, move || WrapProcessor { calls: c.clone() });
    }
    let c = calls.clone();
    registry.register_executor("echo", move || EchoExecutor { calls: c.clone() });
    let c = calls.clone();
    registry.register_executor("chunks", move || ChunkExecutor { calls: c.clone() });
    registry.register_executor_type::<FailingExecutor>("broken");

    registry
}
