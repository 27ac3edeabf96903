pub mod flags;
pub mod transit_arguments;
pub mod transit_kind;
pub mod transit_stage;
