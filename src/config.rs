use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = &value[1..value.len() - 1];
            }

            // Only set if not already set (env vars take precedence)
            if std::env::var(key).is_err() {
                // SAFETY: We're single-threaded at this point (called before any async runtime)
                unsafe { std::env::set_var(key, value) };
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub devices: Vec<DeviceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Multicast group the gateway reports on.
    pub multicast_addr: String,
    pub multicast_port: u16,
    /// Unicast `ip:port` of the gateway for read commands. When unset, the
    /// transport learns it from the gateway's own traffic.
    pub gateway_addr: Option<String>,
}

/// One statically configured device: gateway model string plus sid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub model: String,
    pub sid: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            multicast_addr: "224.0.0.50".to_string(),
            multicast_port: 9898,
            gateway_addr: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            devices: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("AQARA_MULTICAST_ADDR") {
            config.gateway.multicast_addr = addr;
        }
        if let Ok(port) = std::env::var("AQARA_MULTICAST_PORT")
            && let Ok(p) = port.parse()
        {
            config.gateway.multicast_port = p;
        }
        if let Ok(addr) = std::env::var("AQARA_GATEWAY_ADDR") {
            config.gateway.gateway_addr = Some(addr);
        }

        // Comma-separated model:sid pairs, e.g.
        // AQARA_DEVICES=motion:158d0001234567,sensor_ht:158d0007654321
        if let Ok(devices) = std::env::var("AQARA_DEVICES") {
            config.devices = parse_device_list(&devices);
        }

        config
    }
}

/// Parse the `AQARA_DEVICES` list; malformed entries are skipped.
fn parse_device_list(raw: &str) -> Vec<DeviceEntry> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            let (model, sid) = entry.split_once(':')?;
            if model.is_empty() || sid.is_empty() {
                return None;
            }
            Some(DeviceEntry {
                model: model.trim().to_string(),
                sid: sid.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_list_parsing() {
        let devices = parse_device_list("motion:158d0001234567, sensor_ht:158d0007654321");
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].model, "motion");
        assert_eq!(devices[0].sid, "158d0001234567");
        assert_eq!(devices[1].model, "sensor_ht");
    }

    #[test]
    fn test_malformed_device_entries_are_skipped() {
        let devices = parse_device_list("motion:sid-1,,nosid,:sid-2,switch:");
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].model, "motion");
    }

    #[test]
    fn test_default_gateway_channel() {
        let config = Config::default();
        assert_eq!(config.gateway.multicast_addr, "224.0.0.50");
        assert_eq!(config.gateway.multicast_port, 9898);
        assert!(config.gateway.gateway_addr.is_none());
    }
}
