pub mod orchestrator;
pub mod registry;
pub mod resolution;
pub mod validation;
pub mod webhook_dispatcher;
