//! wifi-rrm - Radio resource management for access point fleets
//!
//! This library keeps a live model of device telemetry and computes transmit
//! power assignments from it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   ┌──────────┐   ┌───────────┐   ┌──────────────┐   ┌────────────────┐
//! │ gateway        │──►│ modeler  │──►│ model     │──►│ optimizers   │──►│ device         │
//! │ (listeners,    │   │ (queue + │   │ DataModel │   │ TPC, channel │   │ TxPowerApplier │
//! │  GatewayClient)│   │  task)   │   │           │   │              │   │                │
//! └────────────────┘   └──────────┘   └───────────┘   └──────────────┘   └────────────────┘
//! ```
//!
//! Ambient modules: [`config`] (INI configuration), [`logging`] (tracing
//! subscriber setup) and [`telemetry`] (modeler counters).

pub mod bands;
pub mod config;
pub mod device;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod modeler;
pub mod optimizers;
pub mod telemetry;
