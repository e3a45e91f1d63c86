pub mod capability;
pub mod error;
pub mod id;
pub mod money;
pub mod payment;
pub mod provider;
pub mod webhook;
