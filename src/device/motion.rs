//! Motion sensor (model `motion`).

use super::{ReportData, field_millivolts, field_str};

/// State of a motion sensor. `triggered` means motion detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionState {
    pub triggered: bool,
    /// Battery voltage in millivolts, reported on heartbeats.
    pub voltage: u32,
}

impl MotionState {
    pub(super) fn apply_update(&mut self, data: &ReportData) {
        // Unlike the contact sensor, a report without a status means the
        // sensor has gone back to idle.
        match field_str(data, "status") {
            Some(status) => self.triggered = status == "motion",
            None => self.triggered = false,
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
        let mut state = MotionState::default();
        state.apply_update(&payload(json!({"status": "motion"})));
        assert!(state.triggered);
    }

    #[test]
    fn test_absent_status_resets_triggered() {
        let mut state = MotionState::default();
        state.apply_update(&payload(json!({"status": "motion"})));
        state.apply_update(&payload(json!({})));
        assert!(!state.triggered);
    }

    #[test]
    fn test_other_status_values_mean_idle() {
        let mut state = MotionState::default();
        state.apply_update(&payload(json!({"status": "motion"})));
        state.apply_update(&payload(json!({"status": "no_motion"})));
        assert!(!state.triggered);
    }

    #[test]
    fn test_heartbeat_does_not_touch_triggered() {
        let mut state = MotionState::default();
        state.apply_update(&payload(json!({"status": "motion"})));
        state.apply_heartbeat(&payload(json!({"voltage": "2985"})));
        assert!(state.triggered);
        assert_eq!(state.voltage, 2985);
    }
}
