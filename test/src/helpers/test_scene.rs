use std::{
    collections::HashMap,
    sync::{Arc, Mutex, Weak},
};

use transit_server::{
    AttachmentSerializer, EventQueue, InterregionComms, RegionScene, ScenePresence,
    TransitController,
};
use transit_shared::{LocalId, RegionHandle, RegionInfo, UserId};

use crate::helpers::{EventLog, TestComms, TestEventQueue, TestPresence, TestSerializer};

pub struct TestScene {
    region_info: RegionInfo,
    presences: Mutex<HashMap<UserId, Arc<TestPresence>>>,
    event_queue: Mutex<Option<Arc<TestEventQueue>>>,
    comms: Arc<TestComms>,
    serializer: Mutex<Option<Arc<TestSerializer>>>,
    unseated: Mutex<Vec<(LocalId, UserId)>>,
    departures: Mutex<Vec<(UserId, RegionHandle)>>,
    object_result_on_lookup: Mutex<Option<(Weak<TransitController>, bool)>>,
    object_result_accepted: Mutex<Option<bool>>,
    log: EventLog,
}

impl TestScene {
    pub fn new(region_info: RegionInfo, log: EventLog) -> Self {
        Self {
            region_info,
            presences: Mutex::new(HashMap::new()),
            event_queue: Mutex::new(Some(Arc::new(TestEventQueue::new(log.clone())))),
            comms: Arc::new(TestComms::new(log.clone())),
            serializer: Mutex::new(Some(Arc::new(TestSerializer::new()))),
            unseated: Mutex::new(Vec::new()),
            departures: Mutex::new(Vec::new()),
            object_result_on_lookup: Mutex::new(None),
            object_result_accepted: Mutex::new(None),
            log,
        }
    }

    pub fn add_presence(&self, presence: Arc<TestPresence>) {
        self.presences
            .lock()
            .unwrap()
            .insert(presence.user_id(), presence);
    }

    pub fn presence(&self, user_id: UserId) -> Option<Arc<TestPresence>> {
        self.presences.lock().unwrap().get(&user_id).cloned()
    }

    /// # Panics
    ///
    /// Panics if the event queue was removed.
    pub fn queue(&self) -> Arc<TestEventQueue> {
        self.event_queue
            .lock()
            .unwrap()
            .clone()
            .expect("event queue was removed")
    }

    pub fn remove_event_queue(&self) {
        *self.event_queue.lock().unwrap() = None;
    }

    pub fn comms(&self) -> &Arc<TestComms> {
        &self.comms
    }

    /// # Panics
    ///
    /// Panics if the serializer was removed.
    pub fn serializer(&self) -> Arc<TestSerializer> {
        self.serializer
            .lock()
            .unwrap()
            .clone()
            .expect("serializer was removed")
    }

    pub fn remove_serializer(&self) {
        *self.serializer.lock().unwrap() = None;
    }

    pub fn unseated(&self) -> Vec<(LocalId, UserId)> {
        self.unseated.lock().unwrap().clone()
    }

    pub fn departures(&self) -> Vec<(UserId, RegionHandle)> {
        self.departures.lock().unwrap().clone()
    }

    /// Hands the ridden object result to the controller from inside the next
    /// presence lookup, while the transit is registered but not yet running
    pub fn deliver_object_result_on_lookup(
        &self,
        controller: Weak<TransitController>,
        success: bool,
    ) {
        *self.object_result_on_lookup.lock().unwrap() = Some((controller, success));
    }

    /// Whether the controller accepted the result delivered on lookup
    pub fn object_result_accepted(&self) -> Option<bool> {
        *self.object_result_accepted.lock().unwrap()
    }
}

impl RegionScene for TestScene {
    fn region_info(&self) -> RegionInfo {
        self.region_info.clone()
    }

    fn scene_presence(&self, user_id: UserId) -> Option<Arc<dyn ScenePresence>> {
        let pending = self.object_result_on_lookup.lock().unwrap().take();
        if let Some((controller, success)) = pending {
            if let Some(controller) = controller.upgrade() {
                let accepted = controller.handle_object_send_result(user_id, success);
                *self.object_result_accepted.lock().unwrap() = Some(accepted);
            }
        }

        self.presence(user_id)
            .map(|presence| -> Arc<dyn ScenePresence> { presence })
    }

    fn event_queue(&self) -> Option<Arc<dyn EventQueue>> {
        self.event_queue
            .lock()
            .unwrap()
            .clone()
            .map(|queue| -> Arc<dyn EventQueue> { queue })
    }

    fn interregion_comms(&self) -> Arc<dyn InterregionComms> {
        self.comms.clone()
    }

    fn attachment_serializer(&self) -> Option<Arc<dyn AttachmentSerializer>> {
        self.serializer
            .lock()
            .unwrap()
            .clone()
            .map(|serializer| -> Arc<dyn AttachmentSerializer> { serializer })
    }

    fn remove_seated_avatar(&self, seat_part: LocalId, presence: &Arc<dyn ScenePresence>) {
        self.unseated
            .lock()
            .unwrap()
            .push((seat_part, presence.user_id()));
        self.log.record("remove seated avatar");
    }

    fn trigger_avatar_leaving_region(
        &self,
        presence: &Arc<dyn ScenePresence>,
        destination: &RegionInfo,
    ) {
        self.departures
            .lock()
            .unwrap()
            .push((presence.user_id(), destination.handle));
        self.log.record("avatar leaving region");
    }
}
