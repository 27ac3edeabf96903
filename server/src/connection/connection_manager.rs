use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;

use transit_shared::{LocalId, SessionId, TransitStage, UserId};

use crate::{
    connection::{
        avatar_connection::AvatarConnection,
        circuit::{CapsControl, CircuitData},
        error::ConnectionError,
    },
    error::StageHandlerError,
    scene::ScenePresence,
    transit::stage_notifier::TransitObserver,
};

/// Keeps track of every viewer connection to this region
#[derive(Default)]
pub struct AvatarConnectionManager {
    connections: Mutex<HashMap<UserId, Arc<AvatarConnection>>>,
}

impl AvatarConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_connection(
        &self,
        circuit_data: CircuitData,
        caps_control: Option<Arc<dyn CapsControl>>,
    ) -> Result<Arc<AvatarConnection>, ConnectionError> {
        let user_id = circuit_data.user_id;
        let mut connections = self.connections();
        if connections.contains_key(&user_id) {
            return Err(ConnectionError::AlreadyEstablished { user_id });
        }

        let connection = Arc::new(AvatarConnection::new(circuit_data, caps_control));
        connections.insert(user_id, connection.clone());
        Ok(connection)
    }

    pub fn connection(&self, user_id: UserId) -> Option<Arc<AvatarConnection>> {
        self.connections().get(&user_id).cloned()
    }

    pub fn all_connections(&self) -> Vec<Arc<AvatarConnection>> {
        self.connections().values().cloned().collect()
    }

    pub fn remove_connection(&self, user_id: UserId) -> Option<Arc<AvatarConnection>> {
        self.connections().remove(&user_id)
    }

    /// Terminates and forgets the user's connection
    pub fn terminate_connection(&self, user_id: UserId) -> bool {
        match self.remove_connection(user_id) {
            Some(connection) => {
                connection.terminate();
                true
            }
            None => false,
        }
    }

    pub fn is_authorized(&self, user_id: UserId, session_id: SessionId, circuit_code: u32) -> bool {
        self.connections().get(&user_id).map_or(false, |connection| {
            let circuit_data = connection.circuit_data();
            circuit_data.session_id == session_id && circuit_data.circuit_code == circuit_code
        })
    }

    fn connections(&self) -> MutexGuard<'_, HashMap<UserId, Arc<AvatarConnection>>> {
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TransitObserver for AvatarConnectionManager {
    async fn on_transit_stage_changed(
        &self,
        presence: &Arc<dyn ScenePresence>,
        stage: TransitStage,
        ride_on_prims: &[LocalId],
    ) -> Result<(), StageHandlerError> {
        let user_id = presence.user_id();
        let Some(connection) = self.connection(user_id) else {
            return Err(StageHandlerError::new(format!(
                "stage {:?} raised for unknown connection {}",
                stage, user_id
            )));
        };

        connection
            .transit_state_change(presence, stage, ride_on_prims)
            .await;
        Ok(())
    }
}
