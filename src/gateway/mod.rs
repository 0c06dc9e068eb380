//! Gateway channel: JSON envelopes, UDP multicast transport, and routing
//! of gateway events to registered devices.

mod integration;
mod message;
mod transport;

pub use integration::GatewayIntegration;
pub use message::{Command, GatewayMessage};
pub use transport::{GatewayClient, ReadHandle};

/// Capability handle a device uses to ask the gateway for a fresh reading.
///
/// Non-owning; the transport behind it may already be gone, in which case
/// the request is silently dropped.
pub trait GatewayHandle: Send + Sync {
    /// Request a read of device `sid`. Fire-and-forget.
    fn read_device(&self, sid: &str);
}
