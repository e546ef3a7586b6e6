//! Raw packet transport.
//!
//! [`Transport`] is the seam between the session and the USB stack. The
//! session only ever writes one packet and reads one reply at a time; a
//! zero-length read means the amp has nothing more to send.

use crate::constants::PACKET_SIZE;
use crate::error::{MustangError, Result};
use nusb::Interface;
use nusb::transfer::RequestBuffer;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::timeout;
use tracing::{debug, info};

pub trait Transport {
    /// Open the first device matching `vendor_id` and any of `product_ids`,
    /// trying product ids in order.
    fn open(&mut self, vendor_id: u16, product_ids: &[u16]) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Release the device. Closing a closed transport does nothing.
    fn close(&mut self);

    /// Interrupt write; returns the number of bytes written.
    fn write(&mut self, endpoint: u8, data: &[u8]) -> Result<usize>;

    /// Interrupt read of at most `max_len` bytes. An empty buffer ends a
    /// multi-packet reply.
    fn read(&mut self, endpoint: u8, max_len: usize) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub interface: u8,
    /// A read that sees no data for this long returns an empty buffer.
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            interface: 0,
            read_timeout: Duration::from_millis(500),
            write_timeout: Duration::from_millis(500),
        }
    }
}

/// [`Transport`] backed by `nusb`.
pub struct UsbTransport {
    config: TransportConfig,
    runtime: Runtime,
    interface: Option<Interface>,
}

impl UsbTransport {
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
        Ok(Self {
            config,
            runtime,
            interface: None,
        })
    }

    fn interface(&self) -> Result<&Interface> {
        self.interface.as_ref().ok_or(MustangError::TransportClosed)
    }
}

impl Transport for UsbTransport {
    fn open(&mut self, vendor_id: u16, product_ids: &[u16]) -> Result<()> {
        info!("Searching for Mustang amplifier...");
        let candidates: Vec<_> = nusb::list_devices()?.filter(|d| d.vendor_id() == vendor_id).collect();
        let device_info = product_ids
            .iter()
            .find_map(|&pid| candidates.iter().find(|d| d.product_id() == pid))
            .ok_or(MustangError::DeviceNotFound)?;

        info!(
            "Found device {:#06x}:{:#06x} on bus {} addr {}",
            device_info.vendor_id(),
            device_info.product_id(),
            device_info.bus_number(),
            device_info.device_address()
        );

        let device = device_info.open()?;
        let interface = device.detach_and_claim_interface(self.config.interface)?;
        info!("Interface claimed successfully.");

        self.interface = Some(interface);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.interface.is_some()
    }

    fn close(&mut self) {
        if self.interface.take().is_some() {
            info!("USB interface released.");
        }
    }

    fn write(&mut self, endpoint: u8, data: &[u8]) -> Result<usize> {
        let interface = self.interface()?;
        debug!(bytes = hex::encode(data), "USB Write");
        let transfer = interface.interrupt_out(endpoint, data.to_vec());
        let write_timeout = self.config.write_timeout;
        let completion = self.runtime.block_on(async { timeout(write_timeout, transfer).await })?;
        Ok(completion.into_result()?.actual_length())
    }

    fn read(&mut self, endpoint: u8, max_len: usize) -> Result<Vec<u8>> {
        let interface = self.interface()?;
        let transfer = interface.interrupt_in(endpoint, RequestBuffer::new(max_len.min(PACKET_SIZE)));
        let read_timeout = self.config.read_timeout;
        match self.runtime.block_on(async { timeout(read_timeout, transfer).await }) {
            Ok(completion) => {
                let data = completion.into_result()?;
                debug!(bytes = hex::encode(&data), "USB Read");
                Ok(data)
            }
            Err(_) => {
                debug!("USB Read timed out, end of reply");
                Ok(Vec::new())
            }
        }
    }
}
