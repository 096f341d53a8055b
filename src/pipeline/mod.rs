//! Pipeline runner: validate, render, parse, execute, process.
//!
//! ```text
//! inputs ──validate──▶ values ──render──▶ rendered ──parse──▶ content      (prepare)
//! content ──execute──▶ response ──process──▶ response                      (run)
//! ```
//!
//! [`Invoker`] runs the stages against a [`Registry`]; the free functions use
//! [`Registry::global`]. Every operation has an `_async` twin that awaits the
//! plugins' async methods instead. Both forms share input validation, option
//! layering and error tagging, and differ only in how each stage is called.
//!
//! `prepare` stamps a fresh nonce on the definition and `run` layers caller
//! settings into its model, so both take the definition mutably. Callers that
//! share a definition between concurrent runs should clone it per run.

mod inputs;


pub use inputs::validate_inputs;

use crate::config::DEFAULT_CONNECTION;
use crate::definition::{Prompty, param_hoisting};
use crate::error::{PromptyError, Result};
use crate::loader;
use crate::registry::{Registry, Response, Stage};
use crate::trace::{self, TraceEvent};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Caller overrides for [`Invoker::run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Layered over `model.configuration` (caller wins) when non-empty.
    pub configuration: Map<String, Value>,
    /// Layered over `model.parameters` (caller wins) when non-empty.
    pub parameters: Map<String, Value>,
    /// Skip the processor and return the executor's result as-is.
    pub raw: bool,
}

/// Options for [`Invoker::execute`].
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    pub configuration: Map<String, Value>,
    pub parameters: Map<String, Value>,
    pub inputs: Map<String, Value>,
    pub raw: bool,
    /// Fill missing inputs from the definition's sample values.
    pub merge_sample: bool,
    /// `prompty.json` profile used when loading from a path.
    pub connection: String,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            configuration: Map::new(),
            parameters: Map::new(),
            inputs: Map::new(),
            raw: false,
            merge_sample: false,
            connection: DEFAULT_CONNECTION.to_string(),
        }
    }
}

impl ExecuteOptions {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            configuration: self.configuration.clone(),
            parameters: self.parameters.clone(),
            raw: self.raw,
        }
    }
}

/// What [`Invoker::execute`] runs: a file to load, or a loaded definition.
#[derive(Debug, Clone)]
pub enum PromptySource {
    Path(PathBuf),
    Loaded(Box<Prompty>),
}

impl From<PathBuf> for PromptySource {
    fn from(path: PathBuf) -> Self {
        PromptySource::Path(path)
    }
}

impl From<&std::path::Path> for PromptySource {
    fn from(path: &std::path::Path) -> Self {
        PromptySource::Path(path.to_path_buf())
    }
}

impl From<Prompty> for PromptySource {
    fn from(prompty: Prompty) -> Self {
        PromptySource::Loaded(Box::new(prompty))
    }
}

/// Runs pipeline stages against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Invoker<'r> {
    registry: &'r Registry,
}

impl Invoker<'static> {
    /// Invoker over the process-wide registry.
    pub fn global() -> Self {
        Self::new(Registry::global())
    }
}

impl<'r> Invoker<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    // =========================================================================
    // prepare
    // =========================================================================

    /// Validate `inputs`, then render and parse the definition's content.
    #[tracing::instrument(skip_all, fields(format = %prompty.template.format, parser = %prompty.template.parser))]
    pub fn prepare(
        &self,
        prompty: &mut Prompty,
        inputs: &Map<String, Value>,
        merge_sample: bool,
    ) -> Result<Value> {
        let values = validate_inputs(prompty, inputs, merge_sample)?;
        stamp_nonce(prompty);
        let prompty = &*prompty;

        let format = prompty.template.format.as_str();
        let rendered = self
            .registry
            .renderer(format)?
            .render(prompty, &values, &prompty.content)
            .map_err(stage_error(Stage::Render, format))?;
        trace_stage(Stage::Render, format, &values, &rendered);

        let selector = self.parser_selector(prompty);
        let parsed = self
            .registry
            .parser(&selector)?
            .parse(prompty, rendered.clone())
            .map_err(stage_error(Stage::Parse, &selector))?;
        trace_stage(Stage::Parse, &selector, &rendered, &parsed);

        Ok(parsed)
    }

    /// [`Invoker::prepare`] using the plugins' async methods.
    #[tracing::instrument(skip_all, fields(format = %prompty.template.format, parser = %prompty.template.parser))]
    pub async fn prepare_async(
        &self,
        prompty: &mut Prompty,
        inputs: &Map<String, Value>,
        merge_sample: bool,
    ) -> Result<Value> {
        let values = validate_inputs(prompty, inputs, merge_sample)?;
        stamp_nonce(prompty);
        let prompty = &*prompty;

        let format = prompty.template.format.as_str();
        let renderer = self.registry.renderer(format)?;
        let rendered = renderer
            .render_async(prompty, &values, &prompty.content)
            .await
            .map_err(stage_error(Stage::Render, format))?;
        trace_stage(Stage::Render, format, &values, &rendered);

        let selector = self.parser_selector(prompty);
        let parser = self.registry.parser(&selector)?;
        let parsed = parser
            .parse_async(prompty, rendered.clone())
            .await
            .map_err(stage_error(Stage::Parse, &selector))?;
        trace_stage(Stage::Parse, &selector, &rendered, &parsed);

        Ok(parsed)
    }

    // =========================================================================
    // run
    // =========================================================================

    /// Execute prepared `content`, then process the result unless `raw`.
    #[tracing::instrument(skip_all, fields(api = %prompty.model.api, raw = options.raw))]
    pub fn run(
        &self,
        prompty: &mut Prompty,
        content: Value,
        options: &RunOptions,
    ) -> Result<Response> {
        apply_overrides(prompty, options);
        let prompty = &*prompty;
        let api = prompty.model.api.as_str();

        let executor = self.registry.executor(api)?;
        let event = stage_event(Stage::Execute, api, &content);
        let response = executor
            .execute(prompty, content)
            .map_err(stage_error(Stage::Execute, api))?;
        trace::emit(&event.with_fact("result", response_fact(&response)));

        if options.raw {
            return Ok(response);
        }

        let processor = self.registry.processor(api)?;
        let event = stage_event(Stage::Process, api, response_fact(&response));
        let processed = processor
            .process(prompty, response)
            .map_err(stage_error(Stage::Process, api))?;
        trace::emit(&event.with_fact("result", response_fact(&processed)));

        Ok(processed)
    }

    /// [`Invoker::run`] using the plugins' async methods.
    #[tracing::instrument(skip_all, fields(api = %prompty.model.api, raw = options.raw))]
    pub async fn run_async(
        &self,
        prompty: &mut Prompty,
        content: Value,
        options: &RunOptions,
    ) -> Result<Response> {
        apply_overrides(prompty, options);
        let prompty = &*prompty;
        let api = prompty.model.api.as_str();

        let executor = self.registry.executor(api)?;
        let event = stage_event(Stage::Execute, api, &content);
        let response = executor
            .execute_async(prompty, content)
            .await
            .map_err(stage_error(Stage::Execute, api))?;
        trace::emit(&event.with_fact("result", response_fact(&response)));

        if options.raw {
            return Ok(response);
        }

        let processor = self.registry.processor(api)?;
        let event = stage_event(Stage::Process, api, response_fact(&response));
        let processed = processor
            .process_async(prompty, response)
            .await
            .map_err(stage_error(Stage::Process, api))?;
        trace::emit(&event.with_fact("result", response_fact(&processed)));

        Ok(processed)
    }

    // =========================================================================
    // execute
    // =========================================================================

    /// Load (when given a path), prepare and run in one call.
    pub fn execute(
        &self,
        source: impl Into<PromptySource>,
        options: &ExecuteOptions,
    ) -> Result<Response> {
        let mut prompty = match source.into() {
            PromptySource::Path(path) => loader::load(&path, &options.connection)?,
            PromptySource::Loaded(prompty) => *prompty,
        };

        let content = self.prepare(&mut prompty, &options.inputs, options.merge_sample)?;
        self.run(&mut prompty, content, &options.run_options())
    }

    /// [`Invoker::execute`] without blocking.
    pub async fn execute_async(
        &self,
        source: impl Into<PromptySource>,
        options: &ExecuteOptions,
    ) -> Result<Response> {
        let mut prompty = match source.into() {
            PromptySource::Path(path) => loader::load_async(&path, &options.connection).await?,
            PromptySource::Loaded(prompty) => *prompty,
        };

        let content = self
            .prepare_async(&mut prompty, &options.inputs, options.merge_sample)
            .await?;
        self.run_async(&mut prompty, content, &options.run_options())
            .await
    }

    fn parser_selector(&self, prompty: &Prompty) -> String {
        self.registry
            .parser_selector(&prompty.template.parser, &prompty.model.api)
    }
}

fn stamp_nonce(prompty: &mut Prompty) {
    prompty.template.nonce = Some(uuid::Uuid::new_v4().simple().to_string());
}

fn apply_overrides(prompty: &mut Prompty, options: &RunOptions) {
    if !options.configuration.is_empty() {
        prompty.model.configuration =
            param_hoisting(&options.configuration, &prompty.model.configuration);
    }
    if !options.parameters.is_empty() {
        prompty.model.parameters = param_hoisting(&options.parameters, &prompty.model.parameters);
    }
}

/// Tag a plugin failure with the stage and selector that produced it.
fn stage_error(stage: Stage, selector: &str) -> impl FnOnce(anyhow::Error) -> PromptyError + '_ {
    move |source| PromptyError::Stage {
        stage,
        selector: selector.to_string(),
        source,
    }
}

/// Streams are reported by kind; they are traced themselves when drained.
fn response_fact(response: &Response) -> Value {
    match response {
        Response::Value(value) => value.clone(),
        Response::Stream(_) => Value::String("PromptyStream".to_string()),
        Response::AsyncStream(_) => Value::String("AsyncPromptyStream".to_string()),
    }
}

/// Stage event carrying its inputs; the result is attached once known.
fn stage_event(stage: Stage, selector: &str, inputs: impl Serialize) -> TraceEvent {
    TraceEvent::new(stage.verb())
        .with_fact("signature", format!("prompty.{}.{}", stage, selector))
        .with_fact("inputs", inputs)
}

fn trace_stage(stage: Stage, selector: &str, inputs: &impl Serialize, result: &Value) {
    trace::emit(&stage_event(stage, selector, inputs).with_fact("result", result));
}

// =============================================================================
// Free functions over the global registry
// =============================================================================

/// [`Invoker::prepare`] over [`Registry::global`].
pub fn prepare(
    prompty: &mut Prompty,
    inputs: &Map<String, Value>,
    merge_sample: bool,
) -> Result<Value> {
    Invoker::global().prepare(prompty, inputs, merge_sample)
}

/// [`Invoker::prepare_async`] over [`Registry::global`].
pub async fn prepare_async(
    prompty: &mut Prompty,
    inputs: &Map<String, Value>,
    merge_sample: bool,
) -> Result<Value> {
    Invoker::global()
        .prepare_async(prompty, inputs, merge_sample)
        .await
}

/// [`Invoker::run`] over [`Registry::global`].
pub fn run(prompty: &mut Prompty, content: Value, options: &RunOptions) -> Result<Response> {
    Invoker::global().run(prompty, content, options)
}

/// [`Invoker::run_async`] over [`Registry::global`].
pub async fn run_async(
    prompty: &mut Prompty,
    content: Value,
    options: &RunOptions,
) -> Result<Response> {
    Invoker::global().run_async(prompty, content, options).await
}

/// [`Invoker::execute`] over [`Registry::global`].
pub fn execute(source: impl Into<PromptySource>, options: &ExecuteOptions) -> Result<Response> {
    Invoker::global().execute(source, options)
}

/// [`Invoker::execute_async`] over [`Registry::global`].
pub async fn execute_async(
    source: impl Into<PromptySource>,
    options: &ExecuteOptions,
) -> Result<Response> {
    Invoker::global().execute_async(source, options).await
}
