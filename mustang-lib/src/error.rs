use crate::effects::EffectType;
use nusb::transfer::TransferError;
use thiserror::Error;

/// The primary error type for the `mustang-lib` library.
#[derive(Error, Debug)]
pub enum MustangError {
    #[error("USB device not found. Is a Mustang amplifier connected?")]
    DeviceNotFound,

    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    #[error("USB transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Timeout during USB operation: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("USB transport is closed")]
    TransportClosed,

    #[error("Session is not open; call start() first")]
    SessionClosed,

    #[error("Effect slot {0} is out of range 0-3")]
    InvalidSlot(u8),

    #[error("Invalid effect for this operation: {0}")]
    InvalidEffect(EffectType),

    #[error("No effects supplied to save")]
    NoEffects,

    #[error("Short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, MustangError>;
