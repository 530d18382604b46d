use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use tracing::debug;

use crate::ambient::Ambient;
use crate::context::ScopedContext;

/// Future returned by [`ScopedContext::run_scoped_async`].
///
/// Each poll pushes the captured frame, polls the body and pops the frame
/// again, so the override is visible for the whole of the body's execution
/// but never while the body is suspended.
#[must_use = "futures do nothing unless polled"]
pub struct Scoped<C: Ambient, F> {
    ctx: ScopedContext<C>,
    frame: Rc<C>,
    body: Pin<Box<F>>,
    polls: u64,
}

impl<C: Ambient, F> Scoped<C, F> {
    pub(crate) fn new(ctx: ScopedContext<C>, frame: Rc<C>, body: F) -> Self {
        Self { ctx, frame, body: Box::pin(body), polls: 0 }
    }

    /// The value the body runs under.
    pub fn value(&self) -> &C {
        &self.frame
    }
}

impl<C: Ambient, F: Future> Future for Scoped<C, F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        this.polls += 1;

        let _guard = this.ctx.enter(Rc::clone(&this.frame));
        let out = this.body.as_mut().poll(cx);
        if out.is_ready() {
            debug!(polls = this.polls, value = %this.frame, "async scope settled");
        }
        out
    }
}
