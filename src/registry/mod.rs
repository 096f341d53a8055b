//! Capability registry.
//!
//! Maps selector strings to plugin factories, one namespace per [`Stage`]:
//!
//! | Stage     | Selector                                   |
//! |-----------|--------------------------------------------|
//! | renderer  | `template.format`                          |
//! | parser    | `template.parser` (`"<parser>.<api>"` first) |
//! | executor  | `model.api`                                |
//! | processor | `model.api`                                |
//!
//! Registering a selector twice replaces the earlier factory. Lookups clone the
//! factory out of the map and build the plugin after the lock is released, so
//! a plugin is never constructed (or awaited) while the registry is locked.
//!
//! ```
//! use prompty::definition::{Content, Prompty};
//! use prompty::registry::{Registry, Renderer};
//! use serde_json::{Map, Value, json};
//!
//! #[derive(Default)]
//! struct Shout;
//!
//! impl Renderer for Shout {
//!     fn render(&self, _: &Prompty, _: &Map<String, Value>, content: &Content) -> anyhow::Result<Value> {
//!         Ok(json!(content.to_value().as_str().unwrap_or_default().to_uppercase()))
//!     }
//! }
//!
//! let registry = Registry::with_defaults();
//! registry.register_renderer_type::<Shout>("shout");
//! assert!(registry.renderer("shout").is_ok());
//! assert!(registry.renderer("jinja2").is_err());
//! ```

mod plugins;

pub use plugins::{
    Executor, NoopParser, NoopRenderer, Parser, Processor, Renderer, Response,
};

use crate::error::{PromptyError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

/// Selector registered for the built-in pass-through renderer and parser.
pub const NOOP: &str = "NOOP";

/// One of the four pluggable pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Render,
    Parse,
    Execute,
    Process,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Render, Stage::Parse, Stage::Execute, Stage::Process];

    /// Name of the plugin role ("renderer", "parser", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Render => "renderer",
            Stage::Parse => "parser",
            Stage::Execute => "executor",
            Stage::Process => "processor",
        }
    }

    /// Name of the step itself ("render", "parse", ...), used for trace events.
    pub fn verb(&self) -> &'static str {
        match self {
            Stage::Render => "render",
            Stage::Parse => "parse",
            Stage::Execute => "execute",
            Stage::Process => "process",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a fresh plugin instance.
pub type Factory<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

/// Factories for a single stage.
struct Slot<T: ?Sized> {
    stage: Stage,
    factories: RwLock<HashMap<String, Factory<T>>>,
}

impl<T: ?Sized> Slot<T> {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            factories: RwLock::new(HashMap::new()),
        }
    }

    fn insert(&self, selector: &str, factory: Factory<T>) {
        let replaced = self
            .factories
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
            .insert(selector.to_string(), factory)
            .is_some();

        tracing::debug!(stage = %self.stage, selector, replaced, "registered plugin");
    }

    fn factory(&self, selector: &str) -> Option<Factory<T>> {
        self.factories
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .get(selector)
            .cloned()
    }

    fn create(&self, selector: &str) -> Result<Box<T>> {
        let factory = self
            .factory(selector)
            .ok_or_else(|| PromptyError::UnregisteredPlugin {
                stage: self.stage,
                selector: selector.to_string(),
            })?;
        Ok(factory())
    }

    fn contains(&self, selector: &str) -> bool {
        self.factory(selector).is_some()
    }

    fn selectors(&self) -> Vec<String> {
        let mut selectors: Vec<String> = self
            .factories
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .keys()
            .cloned()
            .collect();
        selectors.sort();
        selectors
    }
}

/// Selector-to-factory maps for every stage.
pub struct Registry {
    renderers: Slot<dyn Renderer>,
    parsers: Slot<dyn Parser>,
    executors: Slot<dyn Executor>,
    processors: Slot<dyn Processor>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("renderers", &self.renderers.selectors())
            .field("parsers", &self.parsers.selectors())
            .field("executors", &self.executors.selectors())
            .field("processors", &self.processors.selectors())
            .finish()
    }
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::with_defaults);

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            renderers: Slot::new(Stage::Render),
            parsers: Slot::new(Stage::Parse),
            executors: Slot::new(Stage::Execute),
            processors: Slot::new(Stage::Process),
        }
    }

    /// A registry holding the built-in `NOOP` renderer and parser.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register_renderer_type::<NoopRenderer>(NOOP);
        registry.register_parser_type::<NoopParser>(NOOP);
        registry
    }

    /// The process-wide registry used by the free pipeline functions.
    ///
    /// Register plugins here during startup, before the first pipeline run.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn register_renderer<F, R>(&self, selector: &str, factory: F)
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Renderer + 'static,
    {
        self.renderers
            .insert(selector, Arc::new(move || Box::new(factory()) as Box<dyn Renderer>));
    }

    pub fn register_renderer_type<R: Renderer + Default + 'static>(&self, selector: &str) {
        self.register_renderer(selector, R::default);
    }

    pub fn register_parser<F, P>(&self, selector: &str, factory: F)
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Parser + 'static,
    {
        self.parsers
            .insert(selector, Arc::new(move || Box::new(factory()) as Box<dyn Parser>));
    }

    pub fn register_parser_type<P: Parser + Default + 'static>(&self, selector: &str) {
        self.register_parser(selector, P::default);
    }

    pub fn register_executor<F, E>(&self, selector: &str, factory: F)
    where
        F: Fn() -> E + Send + Sync + 'static,
        E: Executor + 'static,
    {
        self.executors
            .insert(selector, Arc::new(move || Box::new(factory()) as Box<dyn Executor>));
    }

    pub fn register_executor_type<E: Executor + Default + 'static>(&self, selector: &str) {
        self.register_executor(selector, E::default);
    }

    pub fn register_processor<F, P>(&self, selector: &str, factory: F)
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Processor + 'static,
    {
        self.processors
            .insert(selector, Arc::new(move || Box::new(factory()) as Box<dyn Processor>));
    }

    pub fn register_processor_type<P: Processor + Default + 'static>(&self, selector: &str) {
        self.register_processor(selector, P::default);
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Build the renderer registered for `format`.
    pub fn renderer(&self, format: &str) -> Result<Box<dyn Renderer>> {
        self.renderers.create(format)
    }

    /// Resolve the parser selector for a definition.
    ///
    /// `"<parser>.<api>"` wins over the bare `parser` when both are registered.
    /// Returns the bare selector when neither is, so the error names what the
    /// definition declared.
    pub fn parser_selector(&self, parser: &str, api: &str) -> String {
        if !api.is_empty() {
            let qualified = format!("{}.{}", parser, api);
            if self.parsers.contains(&qualified) {
                return qualified;
            }
        }
        parser.to_string()
    }

    /// Build the parser registered for `selector`.
    pub fn parser(&self, selector: &str) -> Result<Box<dyn Parser>> {
        self.parsers.create(selector)
    }

    /// Build the executor registered for `api`.
    pub fn executor(&self, api: &str) -> Result<Box<dyn Executor>> {
        self.executors.create(api)
    }

    /// Build the processor registered for `api`.
    pub fn processor(&self, api: &str) -> Result<Box<dyn Processor>> {
        self.processors.create(api)
    }

    /// Check whether a selector is registered for a stage.
    pub fn contains(&self, stage: Stage, selector: &str) -> bool {
        match stage {
            Stage::Render => self.renderers.contains(selector),
            Stage::Parse => self.parsers.contains(selector),
            Stage::Execute => self.executors.contains(selector),
            Stage::Process => self.processors.contains(selector),
        }
    }

    /// Registered selectors for a stage, sorted.
    pub fn selectors(&self, stage: Stage) -> Vec<String> {
        match stage {
            Stage::Render => self.renderers.selectors(),
            Stage::Parse => self.parsers.selectors(),
            Stage::Execute => self.executors.selectors(),
            Stage::Process => self.processors.selectors(),
        }
    }
}
