//! Aqara device abstraction.
//!
//! Each physical sensor behind the gateway is modeled as a [`Device`]: a
//! stable identity (`sid` + model tag) plus typed per-kind state. The
//! gateway channel delivers two kinds of events, periodic reports and
//! less-frequent heartbeats, and each device kind interprets their
//! attribute payloads differently.

use crate::error::{BridgeError, Result};
use crate::gateway::GatewayHandle;
use log::warn;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};

mod contact;
mod ht;
mod motion;
mod switch;

pub use contact::ContactState;
pub use ht::HtState;
pub use motion::MotionState;
pub use switch::{ButtonAction, SwitchState};

/// Attribute payload of a single report or heartbeat event.
///
/// The gateway sends attribute values as JSON strings or numbers; the
/// field helpers below accept both.
pub type ReportData = serde_json::Map<String, Value>;

/// Zero-argument listener invoked after each processed event.
pub type UpdateCallback = Box<dyn Fn() + Send>;

/// Device kind tag, matching the model strings the gateway reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DeviceModel {
    /// Temperature/humidity sensor (`sensor_ht`).
    SensorHt,
    /// Door/window contact sensor (`magnet`).
    Magnet,
    /// Motion sensor (`motion`).
    Motion,
    /// Wireless button (`switch`).
    Switch,
}

/// Typed state of one device, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorState {
    Ht(HtState),
    Contact(ContactState),
    Motion(MotionState),
    Switch(SwitchState),
}

impl SensorState {
    fn for_model(model: DeviceModel) -> Self {
        match model {
            DeviceModel::SensorHt => SensorState::Ht(HtState::default()),
            DeviceModel::Magnet => SensorState::Contact(ContactState::default()),
            DeviceModel::Motion => SensorState::Motion(MotionState::default()),
            DeviceModel::Switch => SensorState::Switch(SwitchState::default()),
        }
    }

    /// Apply a report payload. Returns a warning message when the payload
    /// contained a recognized key with an unusable value.
    fn apply_update(&mut self, data: &ReportData) -> Option<String> {
        match self {
            SensorState::Ht(state) => state.apply_update(data),
            SensorState::Contact(state) => state.apply_update(data),
            SensorState::Motion(state) => state.apply_update(data),
            SensorState::Switch(state) => return state.apply_update(data),
        }
        None
    }

    /// Apply a heartbeat payload. Same warning contract as
    /// [`Self::apply_update`].
    fn apply_heartbeat(&mut self, data: &ReportData) -> Option<String> {
        match self {
            SensorState::Ht(state) => state.apply_heartbeat(data),
            SensorState::Contact(state) => state.apply_heartbeat(data),
            SensorState::Motion(state) => state.apply_heartbeat(data),
            SensorState::Switch(state) => state.apply_heartbeat(data),
        }
        None
    }
}

/// One sensor device known to the gateway.
///
/// Events for a device must be delivered one at a time; the device performs
/// no internal locking or queuing.
pub struct Device {
    sid: String,
    model: DeviceModel,
    state: SensorState,
    update_callback: Option<UpdateCallback>,
    gateway: Option<Arc<dyn GatewayHandle>>,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("sid", &self.sid)
            .field("model", &self.model)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Device factory: map a gateway model string to a concrete device.
///
/// Fails with [`BridgeError::UnsupportedDeviceType`] for model strings the
/// bridge does not know.
pub fn create_device(model: &str, sid: impl Into<String>) -> Result<Device> {
    let sid = sid.into();
    let model = DeviceModel::from_str(model).map_err(|_| BridgeError::UnsupportedDeviceType {
        model: model.to_string(),
        sid: sid.clone(),
    })?;
    Ok(Device {
        sid,
        model,
        state: SensorState::for_model(model),
        update_callback: None,
        gateway: None,
    })
}

impl Device {
    /// Stable identifier of the physical device.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Device kind tag.
    pub fn model(&self) -> DeviceModel {
        self.model
    }

    /// Current typed state.
    pub fn state(&self) -> &SensorState {
        &self.state
    }

    /// Register the update listener, replacing any previous one. At most
    /// one listener per device; it takes effect for subsequent events.
    pub fn set_update_callback(&mut self, callback: UpdateCallback) {
        self.update_callback = Some(callback);
    }

    /// Attach the gateway capability handle used by [`Self::update_now`].
    pub fn set_gateway(&mut self, gateway: Arc<dyn GatewayHandle>) {
        self.gateway = Some(gateway);
    }

    /// Ask the gateway to read this device now. Fire-and-forget; the fresh
    /// values arrive later as a regular event.
    pub fn update_now(&self) {
        if let Some(gateway) = &self.gateway {
            gateway.read_device(&self.sid);
        }
    }

    /// Handle a report event: apply the variant's parsing rule, then
    /// notify the listener (if any) exactly once, whether or not any
    /// field changed.
    pub fn on_update(&mut self, data: &ReportData) {
        if let Some(message) = self.state.apply_update(data) {
            self.log_warning(&message);
        }
        self.notify();
    }

    /// Handle a heartbeat event. Same notification contract as
    /// [`Self::on_update`].
    pub fn on_heartbeat(&mut self, data: &ReportData) {
        if let Some(message) = self.state.apply_heartbeat(data) {
            self.log_warning(&message);
        }
        self.notify();
    }

    fn notify(&self) {
        if let Some(callback) = &self.update_callback {
            callback();
        }
    }

    /// Emit a warning prefixed with this device's identity.
    pub fn log_warning(&self, message: &str) {
        warn!("[{}] {}: {}", self.model, self.sid, message);
    }
}

/// String field accessor for a report payload.
pub(crate) fn field_str<'a>(data: &'a ReportData, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

/// Integer field accessor. Accepts both JSON numbers and numeric strings;
/// unparseable values are treated as absent.
pub(crate) fn field_i64(data: &ReportData, key: &str) -> Option<i64> {
    match data.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        value => value.as_i64(),
    }
}

/// Millivolt field accessor. Negative values are treated as absent.
pub(crate) fn field_millivolts(data: &ReportData, key: &str) -> Option<u32> {
    field_i64(data, key).and_then(|v| u32::try_from(v).ok())
}
