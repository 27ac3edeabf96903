pub mod agent_data;
pub mod error;
pub mod queue_events;
pub mod release_callback;
pub mod remote_results;
