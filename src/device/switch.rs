//! Wireless button (model `switch`).

use super::{ReportData, field_millivolts, field_str};
use std::str::FromStr;
use strum::{Display, EnumString};

/// Button press kinds the switch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ButtonAction {
    Click,
    DoubleClick,
    LongClickPress,
    LongClickRelease,
}

/// State of a wireless button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchState {
    /// Most recent button action, if any press has been seen.
    pub last_action: Option<ButtonAction>,
    /// Battery voltage in millivolts, reported on heartbeats.
    pub voltage: u32,
}

impl SwitchState {
    /// Returns a warning message for unrecognized status values; state is
    /// left unmodified in that case.
    pub(super) fn apply_update(&mut self, data: &ReportData) -> Option<String> {
        if let Some(status) = field_str(data, "status") {
            match ButtonAction::from_str(status) {
                Ok(action) => self.last_action = Some(action),
                Err(_) => return Some(format!("invalid status: {status}")),
            }
        }
        None
    }

    pub(super) fn apply_heartbeat(&mut self, data: &ReportData) {
        if let Some(millivolts) = field_millivolts(data, "voltage") {
            self.voltage = millivolts;
        }
    }
}
