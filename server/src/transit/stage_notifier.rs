use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};

use async_trait::async_trait;
use log::warn;

use transit_shared::{LocalId, TransitStage};

use crate::{
    error::{StageHandlerError, TransitError},
    scene::ScenePresence,
};

/// Receives every stage change of every transit handled by a controller
#[async_trait]
pub trait TransitObserver: Send + Sync {
    async fn on_transit_stage_changed(
        &self,
        presence: &Arc<dyn ScenePresence>,
        stage: TransitStage,
        ride_on_prims: &[LocalId],
    ) -> Result<(), StageHandlerError>;
}

/// Fans stage changes out to the registered observers
#[derive(Default)]
pub struct StageDispatcher {
    observers: RwLock<Vec<Arc<dyn TransitObserver>>>,
}

impl StageDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&self, observer: Arc<dyn TransitObserver>) {
        self.observers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(observer);
    }

    /// Every observer sees the stage, even after an earlier one fails; the
    /// first failure is returned.
    pub async fn dispatch(
        &self,
        presence: &Arc<dyn ScenePresence>,
        stage: TransitStage,
        ride_on_prims: &[LocalId],
    ) -> Result<(), StageHandlerError> {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        let mut first_error = None;
        for observer in observers {
            if let Err(err) = observer
                .on_transit_stage_changed(presence, stage, ride_on_prims)
                .await
            {
                warn!("transit observer failed on {:?}: {}", stage, err);
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Sends one attempt's stage changes, allowing a single terminal stage
pub struct StageNotifier {
    presence: Arc<dyn ScenePresence>,
    ride_on_prims: Arc<[LocalId]>,
    dispatcher: Arc<StageDispatcher>,
    terminal_sent: AtomicBool,
}

impl StageNotifier {
    pub fn new(
        presence: Arc<dyn ScenePresence>,
        ride_on_prims: Arc<[LocalId]>,
        dispatcher: Arc<StageDispatcher>,
    ) -> Self {
        Self {
            presence,
            ride_on_prims,
            dispatcher,
            terminal_sent: AtomicBool::new(false),
        }
    }

    pub async fn notify(&self, stage: TransitStage) -> Result<(), TransitError> {
        if stage.is_terminal() {
            return self.notify_terminal(stage).await;
        }
        self.send(stage).await
    }

    /// Sends `stage` unless a terminal stage already went out for this attempt
    pub async fn notify_terminal(&self, stage: TransitStage) -> Result<(), TransitError> {
        if self.terminal_sent.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.send(stage).await
    }

    async fn send(&self, stage: TransitStage) -> Result<(), TransitError> {
        self.dispatcher
            .dispatch(&self.presence, stage, &self.ride_on_prims)
            .await
            .map_err(|source| TransitError::StageHandler { stage, source })
    }
}
