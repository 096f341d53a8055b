//! Plugin contracts for the four pipeline stages.
//!
//! Every contract has a blocking method and an async one. The async method
//! defaults to calling the blocking one, so a plugin only needs to override it
//! when it has real suspension points (network calls, file reads).

use crate::definition::{Content, Prompty};
use crate::stream::{AsyncPromptyStream, PromptyStream};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// What an executor (and therefore a processor) hands back.
#[derive(Debug)]
pub enum Response {
    /// A complete result.
    Value(Value),
    /// A lazily produced result, drained by the caller.
    Stream(PromptyStream),
    /// A lazily produced result, drained by the caller without blocking.
    AsyncStream(AsyncPromptyStream),
}

impl Response {
    /// The complete result, if this is not a stream.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Response::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The complete result, if this is not a stream.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Response::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        !matches!(self, Response::Value(_))
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Response::Value(value)
    }
}

impl From<PromptyStream> for Response {
    fn from(stream: PromptyStream) -> Self {
        Response::Stream(stream)
    }
}

impl From<AsyncPromptyStream> for Response {
    fn from(stream: AsyncPromptyStream) -> Self {
        Response::AsyncStream(stream)
    }
}

/// Turns the content body plus validated inputs into rendered content.
///
/// Selected by `template.format`.
#[async_trait]
pub trait Renderer: Send + Sync {
    fn render(
        &self,
        prompty: &Prompty,
        values: &Map<String, Value>,
        content: &Content,
    ) -> anyhow::Result<Value>;

    async fn render_async(
        &self,
        prompty: &Prompty,
        values: &Map<String, Value>,
        content: &Content,
    ) -> anyhow::Result<Value> {
        self.render(prompty, values, content)
    }
}

/// Shapes rendered content into what an executor expects.
///
/// Selected by `template.parser`.
#[async_trait]
pub trait Parser: Send + Sync {
    fn parse(&self, prompty: &Prompty, rendered: Value) -> anyhow::Result<Value>;

    async fn parse_async(&self, prompty: &Prompty, rendered: Value) -> anyhow::Result<Value> {
        self.parse(prompty, rendered)
    }
}

/// Sends prepared content to a model.
///
/// Selected by `model.api`.
#[async_trait]
pub trait Executor: Send + Sync {
    fn execute(&self, prompty: &Prompty, content: Value) -> anyhow::Result<Response>;

    async fn execute_async(&self, prompty: &Prompty, content: Value) -> anyhow::Result<Response> {
        self.execute(prompty, content)
    }
}

/// Shapes a raw executor result for the caller.
///
/// Selected by `model.api`.
#[async_trait]
pub trait Processor: Send + Sync {
    fn process(&self, prompty: &Prompty, response: Response) -> anyhow::Result<Response>;

    async fn process_async(
        &self,
        prompty: &Prompty,
        response: Response,
    ) -> anyhow::Result<Response> {
        self.process(prompty, response)
    }
}

/// Renderer that returns the content body untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(
        &self,
        _prompty: &Prompty,
        _values: &Map<String, Value>,
        content: &Content,
    ) -> anyhow::Result<Value> {
        Ok(content.to_value())
    }
}

/// Parser that returns its input untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopParser;

impl Parser for NoopParser {
    fn parse(&self, _prompty: &Prompty, rendered: Value) -> anyhow::Result<Value> {
        Ok(rendered)
    }
}
