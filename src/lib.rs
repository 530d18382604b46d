pub mod errors;
pub mod ambient;
pub mod context;
pub mod scoped;
pub mod demo;

use std::future::Future;

pub use ambient::{Ambient, AmbientContext, Overrides};
pub use context::ScopedContext;
pub use errors::{ContextError, Result};
pub use scoped::Scoped;

thread_local! {
    static AMBIENT: ScopedContext<AmbientContext> = ScopedContext::new(AmbientContext::default());
}

/// Handle to this thread's default ambient context, initialized to `{a:0,s:""}`.
pub fn ambient() -> ScopedContext<AmbientContext> {
    AMBIENT.with(ScopedContext::clone)
}

/// Current value of the default ambient context.
pub fn read() -> AmbientContext {
    AMBIENT.with(|ctx| ctx.read())
}

/// Convenience: [`ScopedContext::run_scoped`] on the default context.
pub fn run_scoped<T>(overrides: Overrides, body: impl FnOnce() -> T) -> T {
    ambient().run_scoped(overrides, body)
}

/// Convenience: [`ScopedContext::run_scoped_async`] on the default context.
pub fn run_scoped_async<F: Future>(overrides: Overrides, body: F) -> Scoped<AmbientContext, F> {
    ambient().run_scoped_async(overrides, body)
}

/// Wrap `f` so every call runs under `overrides` on the default context.
pub fn with_context<A, T, F>(overrides: Overrides, f: F) -> impl Fn(A) -> T
where
    F: Fn(A) -> T,
{
    ambient().bind(overrides, f)
}

pub fn expect_current(expected: &AmbientContext) -> Result<()> {
    AMBIENT.with(|ctx| ctx.expect_current(expected))
}

pub fn depth() -> usize {
    AMBIENT.with(|ctx| ctx.depth())
}
