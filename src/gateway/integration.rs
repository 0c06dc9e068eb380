//! Gateway integration orchestrator.
//!
//! Owns the device registry and the transport, keeping gateway internals
//! out of main.rs. Routes `report` events to `on_update` and `heartbeat`
//! events to `on_heartbeat`, one device at a time.

use super::message::{Command, GatewayMessage};
use super::transport::GatewayClient;
use crate::config::GatewayConfig;
use crate::device::Device;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct GatewayIntegration {
    config: GatewayConfig,
    devices: HashMap<String, Device>,
}

impl GatewayIntegration {
    /// Create a new integration for the given gateway channel config.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            devices: HashMap::new(),
        }
    }

    /// Register a device. Events for its sid will be routed to it; a
    /// second registration for the same sid replaces the first.
    pub fn with_device(mut self, device: Device) -> Self {
        self.devices.insert(device.sid().to_string(), device);
        self
    }

    /// Start the integration as a background task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        if self.devices.is_empty() {
            info!("No devices configured, skipping gateway integration");
            return;
        }

        let client = match GatewayClient::new(&self.config) {
            Ok(client) => client,
            Err(e) => {
                log::error!("Failed to open gateway channel: {}", e);
                return;
            }
        };

        // Hand every device a read capability before events start flowing.
        let read_handle = Arc::new(client.read_handle());
        for device in self.devices.values_mut() {
            device.set_gateway(read_handle.clone());
        }

        let (msg_tx, mut msg_rx) = mpsc::channel::<GatewayMessage>(64);
        let transport = tokio::spawn(client.run(msg_tx));

        // Ask for a first reading of every device; answers arrive as
        // regular read_ack events.
        for device in self.devices.values() {
            device.update_now();
        }

        info!(
            "Gateway integration started with {} device(s)",
            self.devices.len()
        );

        while let Some(msg) = msg_rx.recv().await {
            self.route_message(&msg);
        }

        transport.abort();
    }

    /// Dispatch one envelope to the device it addresses.
    fn route_message(&mut self, msg: &GatewayMessage) {
        match msg.cmd {
            Command::Report | Command::ReadAck | Command::Heartbeat => {}
            _ => {
                debug!("Ignoring {:?} from {}", msg.cmd, msg.sid);
                return;
            }
        }

        let Some(device) = self.devices.get_mut(&msg.sid) else {
            debug!("Event for unknown device {}, dropped", msg.sid);
            return;
        };

        let data = match msg.data() {
            Ok(data) => data,
            Err(e) => {
                warn!("Unreadable payload from {}: {}", msg.sid, e);
                return;
            }
        };

        match msg.cmd {
            Command::Heartbeat => device.on_heartbeat(&data),
            // read_ack carries the same attribute shape as a report.
            _ => device.on_update(&data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{SensorState, create_device};

    fn integration_with(model: &str, sid: &str) -> GatewayIntegration {
        GatewayIntegration::new(GatewayConfig::default())
            .with_device(create_device(model, sid).unwrap())
    }

    fn envelope(raw: &str) -> GatewayMessage {
        GatewayMessage::parse(raw).unwrap()
    }

    #[test]
    fn test_report_routes_to_on_update() {
        let mut integration = integration_with("motion", "sid-1");
        integration.route_message(&envelope(
            r#"{"cmd":"report","model":"motion","sid":"sid-1","data":"{\"status\":\"motion\"}"}"#,
        ));
        match integration.devices["sid-1"].state() {
            SensorState::Motion(state) => assert!(state.triggered),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_heartbeat_routes_to_on_heartbeat() {
        let mut integration = integration_with("magnet", "sid-2");
        integration.route_message(&envelope(
            r#"{"cmd":"heartbeat","model":"magnet","sid":"sid-2","data":"{\"voltage\":3005}"}"#,
        ));
        match integration.devices["sid-2"].state() {
            SensorState::Contact(state) => assert_eq!(state.voltage, 3005),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_sid_is_dropped() {
        let mut integration = integration_with("motion", "sid-3");
        integration.route_message(&envelope(
            r#"{"cmd":"report","model":"magnet","sid":"elsewhere","data":"{\"status\":\"open\"}"}"#,
        ));
        match integration.devices["sid-3"].state() {
            SensorState::Motion(state) => assert!(!state.triggered),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_read_ack_applies_like_a_report() {
        let mut integration = integration_with("sensor_ht", "sid-4");
        integration.route_message(&envelope(
            r#"{"cmd":"read_ack","model":"sensor_ht","sid":"sid-4","data":"{\"temperature\":\"2350\"}"}"#,
        ));
        match integration.devices["sid-4"].state() {
            SensorState::Ht(state) => assert_eq!(state.temperature, 23.5),
            other => panic!("unexpected state: {other:?}"),
        }
    }
}
