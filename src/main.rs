use aqara_bridge::config::{Config, load_dotenv};
use aqara_bridge::device::create_device;
use aqara_bridge::gateway::GatewayIntegration;
use log::info;
use tokio::signal;

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();
    load_dotenv();
    info!("Starting Aqara Bridge");

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded:");
    info!(
        "  Multicast group: {}:{}",
        config.gateway.multicast_addr, config.gateway.multicast_port
    );
    match &config.gateway.gateway_addr {
        Some(addr) => info!("  Gateway address: {}", addr),
        None => info!("  Gateway address: learned from traffic"),
    }
    info!("  Configured devices: {}", config.devices.len());

    let mut integration = GatewayIntegration::new(config.gateway.clone());
    for entry in &config.devices {
        match create_device(&entry.model, entry.sid.clone()) {
            Ok(mut device) => {
                let model = device.model();
                let sid = device.sid().to_string();
                device.set_update_callback(Box::new(move || {
                    info!("[{}] {}: state updated", model, sid);
                }));
                integration = integration.with_device(device);
            }
            Err(e) => {
                log::error!("Skipping configured device: {}", e);
            }
        }
    }

    let gateway_task = integration.start();

    info!("Aqara Bridge is running");
    info!("  - Press Ctrl+C to exit");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(e) => {
            log::error!("Failed to listen for shutdown signal: {}", e);
        }
    }

    gateway_task.abort();
}
