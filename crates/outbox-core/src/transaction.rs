//! Transaction context: one atomic unit of work with commit hooks.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;

use crate::{OutboxError, OutboxResult};

/// Callback invoked when the owning transaction commits.
pub type CommitHook = Box<dyn FnOnce() -> BoxFuture<'static, OutboxResult<()>> + Send>;

/// One logical unit of work.
///
/// Collaborators attach shared state through the keyed item slots and
/// register commit hooks. [`complete`](Self::complete) runs the hooks in
/// registration order, exactly once; dropping the context without completing
/// discards hooks and items (rollback).
pub struct TransactionContext {
    items: Mutex<HashMap<&'static str, Arc<dyn Any + Send + Sync>>>,
    commit_hooks: Mutex<Vec<CommitHook>>,
    completed: AtomicBool,
}

impl TransactionContext {
    /// Create a fresh, open transaction context.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            commit_hooks: Mutex::new(Vec::new()),
            completed: AtomicBool::new(false),
        }
    }

    /// Get the item stored under `key`, creating it with `init` on first
    /// access.
    ///
    /// The same `key` must always be used with the same item type.
    pub fn get_or_insert_with<T, F>(&self, key: &'static str, init: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Arc<T>,
    {
        let mut items = self.items.lock().expect("lock poisoned");
        let entry = items
            .entry(key)
            .or_insert_with(|| init() as Arc<dyn Any + Send + Sync>);
        Arc::clone(entry)
            .downcast::<T>()
            .expect("transaction item type mismatch")
    }

    /// Register a hook to run when the transaction commits.
    ///
    /// Hooks run in registration order inside [`complete`](Self::complete).
    pub fn on_committed<F, Fut>(&self, hook: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = OutboxResult<()>> + Send + 'static,
    {
        let hook: CommitHook = Box::new(move || Box::pin(hook()));
        self.commit_hooks.lock().expect("lock poisoned").push(hook);
    }

    /// Commit the unit of work, running the registered hooks in order.
    ///
    /// A hook error aborts the remaining hooks and surfaces to the caller.
    /// Completing a second time returns [`OutboxError::AlreadyCompleted`].
    pub async fn complete(&self) -> OutboxResult<()> {
        if self.completed.swap(true, Ordering::SeqCst) {
            return Err(OutboxError::AlreadyCompleted);
        }

        let hooks = std::mem::take(&mut *self.commit_hooks.lock().expect("lock poisoned"));
        for hook in hooks {
            hook().await?;
        }
        Ok(())
    }

    /// Whether [`complete`](Self::complete) has already run.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Default for TransactionContext {
    fn default() -> Self {
        Self::new()
    }
}
