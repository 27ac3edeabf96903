use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

use log::{debug, info};

use transit_shared::{AvatarConnectionState, LocalId, TransitStage, UserId};

use crate::{
    connection::{
        circuit::{CapsControl, CircuitData, UdpCircuit},
        error::ConnectionError,
    },
    scene::ScenePresence,
};

struct ConnectionInner {
    state: AvatarConnectionState,
    udp_circuit: Option<Arc<dyn UdpCircuit>>,
}

/// A viewer's connection to this region, made of a UDP circuit and a set of
/// capabilities
pub struct AvatarConnection {
    circuit_data: CircuitData,
    caps_control: Option<Arc<dyn CapsControl>>,
    inner: Mutex<ConnectionInner>,
    paused: AtomicBool,
    terminating: AtomicBool,
}

impl AvatarConnection {
    pub fn new(circuit_data: CircuitData, caps_control: Option<Arc<dyn CapsControl>>) -> Self {
        Self {
            circuit_data,
            caps_control,
            inner: Mutex::new(ConnectionInner {
                state: AvatarConnectionState::UdpCircuitWait,
                udp_circuit: None,
            }),
            paused: AtomicBool::new(false),
            terminating: AtomicBool::new(false),
        }
    }

    pub fn circuit_data(&self) -> &CircuitData {
        &self.circuit_data
    }

    pub fn user_id(&self) -> UserId {
        self.circuit_data.user_id
    }

    pub fn state(&self) -> AvatarConnectionState {
        self.inner().state
    }

    pub fn udp_circuit(&self) -> Option<Arc<dyn UdpCircuit>> {
        self.inner().udp_circuit.clone()
    }

    /// Whether outbound traffic is currently paused for a transit
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn is_terminating(&self) -> bool {
        self.terminating.load(Ordering::Acquire)
    }

    /// Attaches the viewer's UDP circuit, establishing the connection
    pub fn attach_udp_circuit(&self, udp_circuit: Arc<dyn UdpCircuit>) -> Result<(), ConnectionError> {
        let expected = &self.circuit_data;
        let mut inner = self.inner();

        if let Some(existing) = &inner.udp_circuit {
            return Err(ConnectionError::CircuitAlreadyAttached {
                user_id: expected.user_id,
                new_code: udp_circuit.circuit_code(),
                existing_code: existing.circuit_code(),
                existing_matched: udp_circuit.circuit_code() == expected.circuit_code
                    && udp_circuit.session_id() == expected.session_id,
            });
        }

        if udp_circuit.circuit_code() != expected.circuit_code {
            return Err(ConnectionError::CircuitCodeMismatch {
                user_id: expected.user_id,
                expected: expected.circuit_code,
                actual: udp_circuit.circuit_code(),
            });
        }

        if udp_circuit.session_id() != expected.session_id {
            return Err(ConnectionError::SessionMismatch {
                user_id: expected.user_id,
                expected: expected.session_id,
                actual: udp_circuit.session_id(),
            });
        }

        inner.udp_circuit = Some(udp_circuit);
        inner.state = AvatarConnectionState::Established;
        debug!("udp circuit established for {}", expected.user_id);
        Ok(())
    }

    /// Pauses traffic when a transit begins and resumes it when the transit
    /// ends. Traffic is only resumed if this connection paused it.
    pub async fn transit_state_change(
        &self,
        presence: &Arc<dyn ScenePresence>,
        stage: TransitStage,
        ride_on_prims: &[LocalId],
    ) {
        match stage {
            TransitStage::SendBegin => {
                if let Some(physics_actor) = presence.physics_actor() {
                    physics_actor.suspend();
                }
                if let Some(caps_control) = &self.caps_control {
                    caps_control.pause_traffic();
                }
                self.paused.store(true, Ordering::Release);

                if let Some(udp_circuit) = self.udp_circuit() {
                    udp_circuit.pause_updates_and_flush().await;
                }
            }
            TransitStage::SendCompletedSuccess | TransitStage::SendError => {
                if !self.paused.swap(false, Ordering::AcqRel) {
                    return;
                }

                if let Some(caps_control) = &self.caps_control {
                    caps_control.resume_traffic();
                }

                if let Some(udp_circuit) = self.udp_circuit() {
                    if stage == TransitStage::SendCompletedSuccess {
                        udp_circuit.resume_updates(Some(ride_on_prims));
                    } else {
                        // the objects are staying, keep updating them
                        udp_circuit.resume_updates(None);
                    }
                }

                if stage == TransitStage::SendError {
                    if let Some(physics_actor) = presence.physics_actor() {
                        physics_actor.resume();
                    }
                }
            }
            _ => {}
        }
    }

    /// Closes the circuit and tears down capabilities. Only the first call
    /// has any effect; returns whether this call did the work.
    pub fn terminate(&self) -> bool {
        if self.terminating.swap(true, Ordering::AcqRel) {
            return false;
        }

        info!("terminating connection for {}", self.circuit_data.user_id);
        if let Some(udp_circuit) = self.udp_circuit() {
            udp_circuit.close();
        }
        if let Some(caps_control) = &self.caps_control {
            caps_control.teardown();
        }
        true
    }

    fn inner(&self) -> MutexGuard<'_, ConnectionInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
