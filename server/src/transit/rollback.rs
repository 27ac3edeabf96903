use std::{future::Future, pin::Pin};

use log::{debug, error};

use crate::{error::TransitError, transit::states::TransitStateKind};

type RollbackFuture = Pin<Box<dyn Future<Output = Result<(), TransitError>> + Send>>;

struct RollbackAction {
    state: TransitStateKind,
    label: &'static str,
    action: Box<dyn FnOnce() -> RollbackFuture + Send + Sync>,
}

/// Compensating actions for every side effect applied during one attempt,
/// in the order they were applied
#[derive(Default)]
pub struct RollbackList {
    actions: Vec<RollbackAction>,
}

impl RollbackList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the inverse of a side effect. `label` only shows up in logs.
    pub fn push<F, Fut>(&mut self, state: TransitStateKind, label: &'static str, action: F)
    where
        F: FnOnce() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TransitError>> + Send + 'static,
    {
        self.actions.push(RollbackAction {
            state,
            label,
            action: Box::new(move || -> RollbackFuture { Box::pin(action()) }),
        });
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs every action, most recent first, and empties the list.
    ///
    /// A failing action does not stop the ones after it.
    pub async fn run(&mut self) -> Result<(), TransitError> {
        let total = self.actions.len();
        let mut failed = 0;

        while let Some(rollback) = self.actions.pop() {
            debug!("rolling back {} ({:?})", rollback.label, rollback.state);
            if let Err(err) = (rollback.action)().await {
                error!(
                    "rollback action {} ({:?}) failed: {}",
                    rollback.label, rollback.state, err
                );
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(TransitError::RollbackFailed { failed, total });
        }
        Ok(())
    }
}
