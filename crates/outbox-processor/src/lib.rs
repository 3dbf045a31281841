//! Background processor that drains the outbox through the real transport.
//!
//! This crate provides:
//! - `OutboxProcessor`: the redelivery loop, one instance per process
//! - `ProcessorHandle`: cooperative-shutdown handle for the running loop
//! - `OutboxOptions` / `configure_outbox`: the integrator-facing wiring

mod config;
mod processor;

pub use config::{configure_outbox, OutboxOptions, OutboxSetup};
pub use processor::{OutboxProcessor, ProcessorHandle};
