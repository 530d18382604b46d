use pretty_assertions::assert_eq;
use scoped_context as scx;
use scx::{AmbientContext, Overrides};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_each_body_sees_its_own_override() {
    let slow = scx::run_scoped_async(Overrides::new().a(1), async {
        let mut seen = vec![scx::read().a];
        for _ in 0..3 {
            sleep(Duration::from_millis(15)).await;
            seen.push(scx::read().a);
        }
        seen
    });
    let fast = scx::run_scoped_async(Overrides::new().a(3), async {
        let mut seen = vec![scx::read().a];
        sleep(Duration::from_millis(5)).await;
        seen.push(scx::read().a);
        seen
    });

    let (slow, fast) = tokio::join!(slow, fast);
    assert_eq!(slow, vec![1, 1, 1, 1]);
    assert_eq!(fast, vec![3, 3]);
    assert_eq!(scx::read(), AmbientContext::default());
}

#[tokio::test]
async fn test_async_scope_nested_in_sync_scope_captures_outer() {
    let fut = scx::run_scoped(Overrides::new().s("outer"), || {
        scx::run_scoped_async(Overrides::new().a(7), async {
            sleep(Duration::from_millis(1)).await;
            scx::read()
        })
    });
    // the sync scope has already exited; the future still carries its snapshot
    assert_eq!(scx::read(), AmbientContext::default());
    assert_eq!(fut.await, AmbientContext::new(7, "outer"));
}

#[tokio::test]
async fn test_nested_async_scopes() {
    let out = scx::run_scoped_async(Overrides::new().a(1).s("hello"), async {
        let inner = scx::run_scoped_async(Overrides::new().a(2).s("world"), async {
            sleep(Duration::from_millis(2)).await;
            scx::read()
        })
        .await;
        (inner, scx::read())
    })
    .await;
    assert_eq!(out, (AmbientContext::new(2, "world"), AmbientContext::new(1, "hello")));
    assert_eq!(scx::depth(), 0);
}

#[tokio::test]
async fn test_async_error_restores() {
    let res: Result<(), String> = scx::run_scoped_async(Overrides::new().a(5), async {
        sleep(Duration::from_millis(1)).await;
        Err(format!("gave up at {}", scx::read().a))
    })
    .await;
    assert_eq!(res, Err("gave up at 5".to_string()));
    assert_eq!(scx::read(), AmbientContext::default());
}

#[tokio::test]
async fn test_interleaved_demo() {
    let (slow, fast) = scx::demo::interleaved(Duration::from_millis(20), Duration::from_millis(2))
        .await
        .unwrap();
    assert_eq!((slow.a, fast.a), (1, 3));
}
