//! Door/window contact sensor (model `magnet`).

use super::{ReportData, field_millivolts, field_str};

/// State of a contact sensor. `triggered` means open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub triggered: bool,
    /// Battery voltage in millivolts, reported on heartbeats.
    pub voltage: u32,
}

impl ContactState {
    pub(super) fn apply_update(&mut self, data: &ReportData) {
        // A report without a status leaves the last known position intact.
        if let Some(status) = field_str(data, "status") {
            self.triggered = status == "open";
        }
    }

    pub(super) fn apply_heartbeat(&mut self, data: &ReportData) {
        if let Some(millivolts) = field_millivolts(data, "voltage") {
            self.voltage = millivolts;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> ReportData {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_status_sets_triggered() {
        let mut state = ContactState::default();
        state.apply_update(&payload(json!({"status": "open"})));
        assert!(state.triggered);
        state.apply_update(&payload(json!({"status": "close"})));
        assert!(!state.triggered);
    }

    #[test]
    fn test_absent_status_keeps_triggered() {
        let mut state = ContactState::default();
        state.apply_update(&payload(json!({"status": "open"})));
        state.apply_update(&payload(json!({})));
        assert!(state.triggered);
    }

    #[test]
    fn test_heartbeat_reads_voltage_only() {
        let mut state = ContactState {
            triggered: true,
            voltage: 0,
        };
        state.apply_heartbeat(&payload(json!({"voltage": 3005, "status": "close"})));
        assert_eq!(state.voltage, 3005);
        assert!(state.triggered);
    }
}
