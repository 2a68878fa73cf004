use crate::domain::errors::AggregatorError;
use crate::infrastructure::shutdown::{Shutdown, ShutdownChannel};
use std::future::Future;
use tokio::task::{AbortHandle, JoinHandle};

/// Concurrency scope owned by an aggregator.
///
/// Every task spawned through it runs on the tokio worker pool and races
/// the scope's shutdown signal, so `close` cancels all of them at once no
/// matter which aggregation call started them.
#[derive(Default)]
pub struct TaskScope {
    shutdown: ShutdownChannel,
}

impl TaskScope {
    /// Cancels every task running under the scope. Returns `false` when the
    /// scope was already closed.
    pub fn close(&self) -> bool {
        self.shutdown.trigger()
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_shutdown()
    }

    /// Spawns `task` under the scope. Resolves to
    /// `AggregatorError::Cancelled` if the scope closes first.
    pub fn spawn<F, T>(&self, task: F) -> JoinHandle<Result<T, AggregatorError>>
    where
        F: Future<Output = Result<T, AggregatorError>> + Send + 'static,
        T: Send + 'static,
    {
        // Subscribe before checking the flag so a close racing with this
        // spawn is observed through one or the other.
        let mut shutdown = self.shutdown.subscribe();
        let closed = self.is_closed();
        tokio::spawn(async move {
            if closed {
                return Err(AggregatorError::Cancelled);
            }
            tokio::select! {
                biased;
                _ = shutdown.recv() => Err(AggregatorError::Cancelled),
                result = task => result,
            }
        })
    }
}

/// Aborts the tasks of one aggregation call when the call is abandoned.
#[derive(Default)]
pub struct AbortOnDrop {
    handles: Vec<AbortHandle>,
}

impl AbortOnDrop {
    pub fn track<T>(&mut self, handle: &JoinHandle<T>) {
        self.handles.push(handle.abort_handle());
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn spawned_task_completes_while_open() {
        let scope = TaskScope::default();

        let result = scope.spawn(async { Ok(7) }).await;

        assert_eq!(assert_ok!(assert_ok!(result)), 7);
        assert!(!scope.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_running_tasks() {
        let scope = TaskScope::default();
        let handle = scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(scope.close());

        let result = assert_ok!(handle.await);
        assert_eq!(assert_err!(result), AggregatorError::Cancelled);
    }

    #[tokio::test]
    async fn tasks_spawned_after_close_are_cancelled() {
        let scope = TaskScope::default();
        scope.close();

        let result = assert_ok!(scope.spawn(async { Ok(1) }).await);

        assert_eq!(assert_err!(result), AggregatorError::Cancelled);
    }

    #[test]
    fn close_is_idempotent() {
        let scope = TaskScope::default();

        assert!(scope.close());
        assert!(!scope.close());
        assert!(scope.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_guard_aborts_tracked_tasks() {
        let scope = TaskScope::default();
        let handle = scope.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });

        let mut guard = AbortOnDrop::default();
        guard.track(&handle);
        drop(guard);

        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(!scope.is_closed());
    }
}
