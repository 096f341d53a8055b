//! Streaming results.
//!
//! Executors that stream return their items wrapped in [`PromptyStream`] (or
//! [`AsyncPromptyStream`]). The wrapper hands every item to the caller and
//! keeps a copy; when the source runs dry the copies are reported once, as a
//! single completion record, so a streamed run is as observable as a plain one.
//! A source that produced nothing reports nothing.
//!
//! After exhaustion the wrapper stays exhausted: the source is not polled
//! again and the completion is not reported again.

use crate::trace::{self, TraceEvent};
use futures::stream::{BoxStream, FusedStream, Stream, StreamExt};
use serde_json::Value;
use std::fmt;
use std::iter::FusedIterator;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Called once with the stream name and every item it produced.
pub type Completion = Box<dyn FnOnce(&str, &[Value]) + Send>;

/// Completion that emits a trace event named `kind`.
fn trace_completion(kind: &'static str) -> Completion {
    Box::new(move |name, items| {
        trace::emit(
            &TraceEvent::new(kind)
                .with_fact("signature", format!("{}.{}", name, kind))
                .with_fact("inputs", "None")
                .with_fact("result", items),
        );
    })
}

/// Blocking stream wrapper.
pub struct PromptyStream {
    name: String,
    inner: Box<dyn Iterator<Item = Value> + Send>,
    items: Vec<Value>,
    on_complete: Option<Completion>,
    done: bool,
}

impl PromptyStream {
    /// Wrap `items`, reporting completion to the registered tracers.
    pub fn new<I>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self::with_completion(name, items, trace_completion("PromptyStream"))
    }

    /// Wrap `items`, reporting completion to `on_complete`.
    pub fn with_completion<I>(name: impl Into<String>, items: I, on_complete: Completion) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self {
            name: name.into(),
            inner: Box::new(items.into_iter()),
            items: Vec::new(),
            on_complete: Some(on_complete),
            done: false,
        }
    }

    /// Items produced so far.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn is_exhausted(&self) -> bool {
        self.done
    }
}

impl Iterator for PromptyStream {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.done {
            return None;
        }

        match self.inner.next() {
            Some(item) => {
                self.items.push(item.clone());
                Some(item)
            }
            None => {
                self.done = true;
                if !self.items.is_empty()
                    && let Some(on_complete) = self.on_complete.take()
                {
                    on_complete(&self.name, &self.items);
                }
                None
            }
        }
    }
}

impl FusedIterator for PromptyStream {}

impl fmt::Debug for PromptyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptyStream")
            .field("name", &self.name)
            .field("items", &self.items)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Async stream wrapper.
pub struct AsyncPromptyStream {
    name: String,
    inner: BoxStream<'static, Value>,
    items: Vec<Value>,
    on_complete: Option<Completion>,
    done: bool,
}

impl AsyncPromptyStream {
    /// Wrap `stream`, reporting completion to the registered tracers.
    pub fn new<S>(name: impl Into<String>, stream: S) -> Self
    where
        S: Stream<Item = Value> + Send + 'static,
    {
        Self::with_completion(name, stream, trace_completion("AsyncPromptyStream"))
    }

    /// Wrap `stream`, reporting completion to `on_complete`.
    pub fn with_completion<S>(name: impl Into<String>, stream: S, on_complete: Completion) -> Self
    where
        S: Stream<Item = Value> + Send + 'static,
    {
        Self {
            name: name.into(),
            inner: stream.boxed(),
            items: Vec::new(),
            on_complete: Some(on_complete),
            done: false,
        }
    }

    /// Items produced so far.
    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

impl Stream for AsyncPromptyStream {
    type Item = Value;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Value>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        match this.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(item)) => {
                this.items.push(item.clone());
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => {
                this.done = true;
                if !this.items.is_empty()
                    && let Some(on_complete) = this.on_complete.take()
                {
                    on_complete(&this.name, &this.items);
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedStream for AsyncPromptyStream {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl fmt::Debug for AsyncPromptyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPromptyStream")
            .field("name", &self.name)
            .field("items", &self.items)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
