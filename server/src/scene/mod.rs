mod region_scene;
mod remote_presences;
mod scene_presence;
mod services;

pub use region_scene::RegionScene;
pub use remote_presences::RemotePresences;
pub use scene_presence::{Attachment, PhysicsActor, ScenePresence};
pub use services::{AttachmentSerializer, EventQueue, InterregionComms};
