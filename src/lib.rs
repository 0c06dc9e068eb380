//! Aqara gateway sensor bridge library.
//!
//! Models the sensor devices behind an Aqara Zigbee gateway (temperature/
//! humidity, contact, motion, button) and routes the gateway's report and
//! heartbeat events into typed per-device state.

pub mod config;
pub mod device;
pub mod error;
pub mod gateway;
