use std::{sync::Arc, time::Duration};

use log::debug;
use tokio::{sync::oneshot, time::timeout};

use transit_shared::{LocalId, TransitArguments, TransitKind};

use crate::{
    error::{TransitError, TransitTimeout},
    scene::{RegionScene, ScenePresence},
    transit::{
        rollback::RollbackList,
        stage_notifier::{StageDispatcher, StageNotifier},
        states::{StateTransition, TransitState, TransitStateKind},
        transit_config::TransitConfig,
    },
};

const RELEASE_SIGNAL: &str = "release";
const OBJECT_CREATED_SIGNAL: &str = "object created";

/// Senders kept in the controller's registry, raised by network callbacks
pub struct AttemptSignals {
    pub release: oneshot::Sender<()>,
    pub object_created: Option<oneshot::Sender<bool>>,
}

/// The receiving ends of an attempt's signals
pub struct AttemptReceivers {
    release: oneshot::Receiver<()>,
    object_created: Option<oneshot::Receiver<bool>>,
}

impl AttemptSignals {
    /// Creates the signals of a transit. Only seated crossings wait for the
    /// ridden object to be created on the destination.
    pub fn channels(arguments: &TransitArguments) -> (Self, AttemptReceivers) {
        let (release_sender, release_receiver) = oneshot::channel();
        let (object_sender, object_receiver) =
            if arguments.kind == TransitKind::OutboundCrossing && arguments.is_seated() {
                let (sender, receiver) = oneshot::channel();
                (Some(sender), Some(receiver))
            } else {
                (None, None)
            };

        let signals = Self {
            release: release_sender,
            object_created: object_sender,
        };
        let receivers = AttemptReceivers {
            release: release_receiver,
            object_created: object_receiver,
        };

        (signals, receivers)
    }
}

/// One outstanding outbound handoff for one user
pub struct TransitAttempt {
    scene: Arc<dyn RegionScene>,
    presence: Arc<dyn ScenePresence>,
    arguments: TransitArguments,
    config: TransitConfig,
    notifier: Arc<StageNotifier>,
    rollback: RollbackList,
    release: Option<oneshot::Receiver<()>>,
    object_created: Option<oneshot::Receiver<bool>>,
    current_state: Option<TransitStateKind>,
}

impl TransitAttempt {
    pub fn new(
        scene: Arc<dyn RegionScene>,
        presence: Arc<dyn ScenePresence>,
        arguments: TransitArguments,
        config: TransitConfig,
        dispatcher: Arc<StageDispatcher>,
        receivers: AttemptReceivers,
    ) -> Self {
        let ride_on_prims: Arc<[LocalId]> = match &arguments.ride_on {
            Some(ride_on) => ride_on.group_parts.iter().copied().collect(),
            None => Arc::from(Vec::new()),
        };

        let notifier = Arc::new(StageNotifier::new(
            presence.clone(),
            ride_on_prims,
            dispatcher,
        ));

        Self {
            scene,
            presence,
            arguments,
            config,
            notifier,
            rollback: RollbackList::new(),
            release: Some(receivers.release),
            object_created: receivers.object_created,
            current_state: None,
        }
    }

    pub fn scene(&self) -> &Arc<dyn RegionScene> {
        &self.scene
    }

    pub fn presence(&self) -> &Arc<dyn ScenePresence> {
        &self.presence
    }

    pub fn arguments(&self) -> &TransitArguments {
        &self.arguments
    }

    pub fn config(&self) -> &TransitConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Arc<StageNotifier> {
        &self.notifier
    }

    pub fn rollback_mut(&mut self) -> &mut RollbackList {
        &mut self.rollback
    }

    pub fn current_state(&self) -> Option<TransitStateKind> {
        self.current_state
    }

    /// Whether this attempt has to wait for the ridden object to be created
    /// on the destination before it may begin
    pub fn awaits_object_creation(&self) -> bool {
        self.object_created.is_some()
    }

    /// Runs `state` and every state it hands over to, one at a time
    pub async fn set_new_state(
        &mut self,
        state: Box<dyn TransitState>,
    ) -> Result<(), TransitError> {
        let mut state = state;
        loop {
            let kind = state.kind();
            debug!(
                "avatar {} entering transit state {:?}",
                self.arguments.user_id, kind
            );
            self.current_state = Some(kind);

            match state.state_entry(self).await? {
                StateTransition::Next(next) => state = next,
                StateTransition::Complete => return Ok(()),
            }
        }
    }

    /// Waits for the destination to confirm the avatar is established there
    pub async fn wait_for_release(&mut self) -> Result<(), TransitError> {
        let receiver = self.release.take().ok_or(TransitError::SignalDropped {
            signal: RELEASE_SIGNAL,
        })?;
        let waited = self.config.release_timeout;

        match timeout(waited, receiver).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(TransitError::SignalDropped {
                signal: RELEASE_SIGNAL,
            }),
            Err(_) => Err(TransitTimeout::Release {
                name: self.presence.name(),
                waited,
            }
            .into()),
        }
    }

    /// Waits for the result of recreating the ridden object on the destination
    pub async fn wait_for_remote_object_creation(&mut self) -> Result<bool, TransitError> {
        let receiver = self.object_created.take().ok_or(TransitError::SignalDropped {
            signal: OBJECT_CREATED_SIGNAL,
        })?;

        let received = match self.config.object_creation_timeout {
            Some(waited) => timeout(waited, receiver)
                .await
                .map_err(|_| object_creation_timeout(waited))?,
            None => receiver.await,
        };

        received.map_err(|_| TransitError::SignalDropped {
            signal: OBJECT_CREATED_SIGNAL,
        })
    }

    /// Undoes every side effect applied so far, most recent first
    pub async fn rollback(&mut self) -> Result<(), TransitError> {
        if self.rollback.is_empty() {
            return Ok(());
        }
        debug!(
            "rolling back {} actions for avatar {}",
            self.rollback.len(),
            self.arguments.user_id
        );
        self.rollback.run().await
    }
}

fn object_creation_timeout(waited: Duration) -> TransitError {
    TransitTimeout::ObjectCreation { waited }.into()
}
