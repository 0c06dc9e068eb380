//! Temperature/humidity sensor (model `sensor_ht`).

use super::{ReportData, field_i64};

/// State of a temperature/humidity sensor.
///
/// The gateway reports both values scaled by 100 (e.g. `"2350"` for
/// 23.5 °C); they are stored in units with one fractional digit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HtState {
    /// Temperature in °C.
    pub temperature: f32,
    /// Relative humidity in %.
    pub humidity: f32,
}

impl HtState {
    pub(super) fn apply_update(&mut self, data: &ReportData) {
        if let Some(raw) = field_i64(data, "temperature") {
            self.temperature = from_centi(raw);
        }
        if let Some(raw) = field_i64(data, "humidity") {
            self.humidity = from_centi(raw);
        }
    }

    pub(super) fn apply_heartbeat(&mut self, data: &ReportData) {
        // HT heartbeats carry the same fields as reports.
        self.apply_update(data);
    }
}

/// Convert a centi-scaled raw reading to units, one fractional digit.
fn from_centi(raw: i64) -> f32 {
    (raw as f32 / 10.0).round() / 10.0
}
