//! JSON envelope the gateway multicasts for every event.
//!
//! The envelope's `data` field is itself a JSON-encoded object string, so
//! it is decoded on demand rather than inline.

use crate::device::ReportData;
use crate::error::Result;
use serde::Deserialize;

/// Gateway command discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Report,
    Heartbeat,
    ReadAck,
    WriteAck,
    Iam,
    GetIdListAck,
    /// Commands this bridge does not handle; kept so newer gateway
    /// firmware does not break envelope parsing.
    #[serde(other)]
    Unknown,
}

/// One event envelope as received from the gateway channel.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayMessage {
    pub cmd: Command,
    pub sid: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub short_id: Option<u32>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl GatewayMessage {
    /// Parse a raw datagram payload into an envelope.
    pub fn parse(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Decode the nested attribute object. An envelope without a `data`
    /// field yields an empty payload.
    pub fn data(&self) -> Result<ReportData> {
        match &self.data {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(ReportData::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_envelope() {
        let msg = GatewayMessage::parse(
            r#"{"cmd":"report","model":"motion","sid":"158d00010a2b3c","short_id":4343,"data":"{\"status\":\"motion\"}"}"#,
        )
        .unwrap();
        assert_eq!(msg.cmd, Command::Report);
        assert_eq!(msg.sid, "158d00010a2b3c");
        assert_eq!(msg.model.as_deref(), Some("motion"));

        let data = msg.data().unwrap();
        assert_eq!(data.get("status").and_then(|v| v.as_str()), Some("motion"));
    }

    #[test]
    fn test_parse_heartbeat_without_data() {
        let msg =
            GatewayMessage::parse(r#"{"cmd":"heartbeat","model":"magnet","sid":"sid-1"}"#).unwrap();
        assert_eq!(msg.cmd, Command::Heartbeat);
        assert!(msg.data().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_command_is_tolerated() {
        let msg = GatewayMessage::parse(r#"{"cmd":"server_ack","sid":"sid-1"}"#).unwrap();
        assert_eq!(msg.cmd, Command::Unknown);
    }

    #[test]
    fn test_malformed_envelope_is_an_error() {
        assert!(GatewayMessage::parse("not json").is_err());
        assert!(GatewayMessage::parse(r#"{"cmd":"report"}"#).is_err());
    }

    #[test]
    fn test_malformed_nested_data_is_an_error() {
        let msg = GatewayMessage::parse(r#"{"cmd":"report","sid":"sid-1","data":"{oops"}"#).unwrap();
        assert!(msg.data().is_err());
    }
}
