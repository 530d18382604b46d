use itertools::Itertools;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use tracing::{trace, warn};

use crate::ambient::Ambient;
use crate::errors::{ContextError, Result};
use crate::scoped::Scoped;

/// Handle to an ambient value with scoped, merge-based overrides.
///
/// The bottom frame is the default value; every active scope pushes one
/// merged snapshot on top of it. Handles are cheap to clone and all clones
/// share the same frames. The handle is `!Send`: one logical thread of
/// control owns it.
pub struct ScopedContext<C: Ambient> {
    frames: Rc<RefCell<Vec<Rc<C>>>>,
}

impl<C: Ambient> Clone for ScopedContext<C> {
    fn clone(&self) -> Self {
        Self { frames: Rc::clone(&self.frames) }
    }
}

impl<C: Ambient> ScopedContext<C> {
    pub fn new(default: C) -> Self {
        Self { frames: Rc::new(RefCell::new(vec![Rc::new(default)])) }
    }

    /// Current value.
    pub fn read(&self) -> C {
        C::clone(&self.snapshot())
    }

    pub(crate) fn snapshot(&self) -> Rc<C> {
        let frames = self.frames.borrow();
        // the default frame is never popped
        Rc::clone(&frames[frames.len() - 1])
    }

    /// Number of active scopes; 0 when only the default is in effect.
    pub fn depth(&self) -> usize {
        self.frames.borrow().len() - 1
    }

    /// Active frames from the default to the innermost override.
    pub fn trail(&self) -> String {
        self.frames.borrow().iter().join(" > ")
    }

    /// Runs `body` with `patch` merged onto the current value.
    ///
    /// The previous value is back in place when this returns, including when
    /// `body` returns an error or unwinds.
    pub fn run_scoped<T>(&self, patch: C::Patch, body: impl FnOnce() -> T) -> T {
        let frame = Rc::new(self.snapshot().merge(&patch));
        let _guard = self.enter(frame);
        body()
    }

    /// Async form of [`run_scoped`](Self::run_scoped).
    ///
    /// The merged value is computed now, from the caller's current value, and
    /// is installed only while `body` is being polled. Other scoped futures
    /// interleaved on the same thread never see it.
    pub fn run_scoped_async<F: Future>(&self, patch: C::Patch, body: F) -> Scoped<C, F> {
        let frame = Rc::new(self.snapshot().merge(&patch));
        Scoped::new(self.clone(), frame, body)
    }

    /// Wraps `f` so that every call runs under `patch`.
    pub fn bind<A, T, F>(&self, patch: C::Patch, f: F) -> impl Fn(A) -> T
    where
        C::Patch: Clone,
        F: Fn(A) -> T,
    {
        let ctx = self.clone();
        move |arg| ctx.run_scoped(patch.clone(), || f(arg))
    }

    /// Checks the current value against the one the caller's override chain implies.
    pub fn expect_current(&self, expected: &C) -> Result<()> {
        let observed = self.snapshot();
        if *observed == *expected {
            Ok(())
        } else {
            Err(ContextError::InvariantViolation {
                expected: expected.to_string(),
                observed: observed.to_string(),
            })
        }
    }

    pub(crate) fn enter(&self, frame: Rc<C>) -> ScopeGuard<C> {
        let depth = {
            let mut frames = self.frames.borrow_mut();
            frames.push(Rc::clone(&frame));
            frames.len() - 1
        };
        trace!(depth, value = %frame, "enter scope");
        ScopeGuard { frames: Rc::clone(&self.frames), depth }
    }
}

impl<C: Ambient + Default> Default for ScopedContext<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

/// Pops the frame pushed by `enter` on drop.
pub(crate) struct ScopeGuard<C: Ambient> {
    frames: Rc<RefCell<Vec<Rc<C>>>>,
    depth: usize,
}

impl<C: Ambient> Drop for ScopeGuard<C> {
    fn drop(&mut self) {
        let found = {
            let mut frames = self.frames.borrow_mut();
            let found = frames.len();
            frames.truncate(self.depth);
            found
        };
        if found != self.depth + 1 {
            warn!(expected = self.depth + 1, found, "scope exit out of order, truncated");
        }
        trace!(depth = self.depth, "exit scope");
    }
}
