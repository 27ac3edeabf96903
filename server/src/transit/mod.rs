pub mod attempt;
pub mod controller;
pub mod rollback;
pub mod stage_notifier;
pub mod states;
pub mod transit_config;
