use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::task::{Spawn, SpawnError, SpawnExt};

pub type HookFuture = BoxFuture<'static, ()>;

/// Runs fire-and-forget work started by field hooks. Nothing waits on it.
pub trait HookSpawner: Send + Sync {
    fn spawn_hook(&self, hook: HookFuture) -> Result<(), SpawnError>;
}

impl<S> HookSpawner for S
where
    S: Spawn + Send + Sync,
{
    fn spawn_hook(&self, hook: HookFuture) -> Result<(), SpawnError> {
        self.spawn(hook)
    }
}

pub trait SuccessHandler: Send + Sync {
    fn on_success(&self, value: &str);
}

impl<F> SuccessHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_success(&self, value: &str) {
        (self)(value)
    }
}

pub trait ErrorHandler: Send + Sync {
    fn on_error(&self, message: &str);
}

impl<F> ErrorHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_error(&self, message: &str) {
        (self)(message)
    }
}

pub(super) type AsyncHookFn = Arc<dyn Fn(String) -> HookFuture + Send + Sync>;

pub(super) fn boxed_async_hook<F, Fut>(hook: F) -> AsyncHookFn
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |input: String| -> HookFuture { Box::pin(hook(input)) })
}

pub(super) fn spawn_async_hook(
    spawner: Option<&dyn HookSpawner>,
    hook: &AsyncHookFn,
    input: &str,
    field: &str,
) {
    let Some(spawner) = spawner else {
        tracing::warn!(field, "async field hook skipped, no hook spawner configured");
        return;
    };
    if let Err(error) = spawner.spawn_hook(hook(input.to_string())) {
        tracing::warn!(field, %error, "failed to spawn async field hook");
    }
}
