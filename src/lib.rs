//! Employee Relay — employee-role workflow plugin for an
//! application-processing chat platform.
//!
//! The host platform owns identity, signing, storage, and delivery; this
//! crate decides, per inbound message, what gets relayed where: customer
//! messages to relationship managers, employee instruments (assignments,
//! judgments, shares, forwards) to their targets, and the employee
//! onboarding lifecycle around them.

pub mod config;
pub mod error;
pub mod host;
pub mod model;
pub mod plugin;
pub mod roster;
pub mod router;
