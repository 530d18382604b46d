//! Call-chain scenarios run by the `scx` binary.
//!
//! Every function checks the ambient value it observes against the value its
//! call site implies and bails out with `InvariantViolation` otherwise.

use std::time::Duration;
use tracing::info;

use crate::ambient::{Ambient, AmbientContext, Overrides};
use crate::errors::Result;
use crate::{depth, expect_current, read, run_scoped_async, with_context};

pub fn world() -> Overrides {
    Overrides::new().a(2).s("world")
}

pub fn foo() -> Overrides {
    Overrides::new().a(3).s("foo")
}

/// Runs the four wrapped entry points under `base` and returns their results.
pub fn run_chain(base: Overrides) -> Result<Vec<String>> {
    let outer = read().merge(&base);
    info!(%outer, "running call chain");

    let wrapped3 = with_context(base.clone(), |()| func3(&outer));
    let wrapped1 = with_context(base.clone(), |k| func1(&outer, k));
    let wrapped4 = with_context(base.clone(), |()| func4(&outer));
    let wrapped2 = with_context(base, |()| func2(&outer));

    Ok(vec![wrapped3(())?, wrapped1(1)?, wrapped4(())?, wrapped2(())?])
}

fn func1(outer: &AmbientContext, k: i64) -> Result<String> {
    expect_current(outer)?;
    Ok(format!("func1 result {k}"))
}

fn func2(outer: &AmbientContext) -> Result<String> {
    expect_current(outer)?;
    descend(outer, 2)?;
    Ok("func2 result".into())
}

fn func3(outer: &AmbientContext) -> Result<String> {
    expect_current(outer)?;
    let inner = outer.merge(&world());
    with_context(world(), |()| descend(&inner, 2))(())?;
    expect_current(outer)?;
    Ok("func3 result".into())
}

fn func4(outer: &AmbientContext) -> Result<String> {
    expect_current(outer)?;
    let inner = outer.merge(&foo());
    with_context(foo(), |()| descend(&inner, 4))(())?;
    expect_current(outer)?;
    Ok("func4 result".into())
}

/// Plain nested calls with no override of their own; each level must keep
/// seeing `expected`.
fn descend(expected: &AmbientContext, levels: usize) -> Result<()> {
    expect_current(expected)?;
    if levels > 1 {
        descend(expected, levels - 1)?;
    }
    Ok(())
}

/// Two async scopes on one thread, the first suspended longer than the
/// second. Returns the value each body observed after its suspension.
pub async fn interleaved(
    long: Duration,
    short: Duration,
) -> Result<(AmbientContext, AmbientContext)> {
    let before = read();
    let slow_expected = before.merge(&Overrides::new().a(1));
    let fast_expected = before.merge(&Overrides::new().a(3));

    let slow = run_scoped_async(Overrides::new().a(1), async {
        expect_current(&slow_expected)?;
        tokio::time::sleep(long).await;
        expect_current(&slow_expected)?;
        Ok::<_, crate::ContextError>(read())
    });
    let fast = run_scoped_async(Overrides::new().a(3), async {
        expect_current(&fast_expected)?;
        tokio::time::sleep(short).await;
        expect_current(&fast_expected)?;
        Ok::<_, crate::ContextError>(read())
    });

    let (slow, fast) = tokio::join!(slow, fast);
    expect_current(&before)?;
    info!(depth = depth(), "interleaved scopes settled");
    Ok((slow?, fast?))
}
