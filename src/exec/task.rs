// src/exec/task.rs

//! The caller-supplied unit of work.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Work executed once per element.
///
/// Receives the element, the run's cancellation token and the results of the
/// element's dependencies, in the order the dependencies were declared.
/// Long-running implementations are expected to watch the token and return
/// promptly once it fires; the executor never aborts a running task.
///
/// Any `Fn(T, CancellationToken, Vec<V>) -> impl Future<Output = anyhow::Result<V>>`
/// implements this trait.
pub trait TaskFunc<T, V>: Send + Sync + 'static {
    type Future: Future<Output = anyhow::Result<V>> + Send + 'static;

    fn call(&self, element: T, token: CancellationToken, inputs: Vec<V>) -> Self::Future;
}

impl<T, V, F, Fut> TaskFunc<T, V> for F
where
    F: Fn(T, CancellationToken, Vec<V>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
{
    type Future = Fut;

    fn call(&self, element: T, token: CancellationToken, inputs: Vec<V>) -> Self::Future {
        (self)(element, token, inputs)
    }
}
