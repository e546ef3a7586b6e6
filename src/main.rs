use anyhow::{Context, Result};
use mustang_lib::constants::{PRODUCT_IDS, USB_VID};
use nusb::list_devices;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("Listing connected USB devices...\n");

    let mut count = 0;
    let mut amps = 0;
    for device_info in list_devices().context("Error listing USB devices")? {
        count += 1;
        let supported = device_info.vendor_id() == USB_VID && PRODUCT_IDS.contains(&device_info.product_id());
        if supported {
            amps += 1;
        }

        info!(
            "Device #{}: VID: {:#06x}, PID: {:#06x}, Bus: {:03}, Address: {:03}{}",
            count,
            device_info.vendor_id(),
            device_info.product_id(),
            device_info.bus_number(),
            device_info.device_address(),
            if supported { "  <- Mustang amplifier" } else { "" }
        );
        info!(
            "  Manufacturer: {}",
            device_info.manufacturer_string().unwrap_or("<Not available>")
        );
        info!("  Product: {}", device_info.product_string().unwrap_or("<Not available>"));
        info!("  Serial: {}", device_info.serial_number().unwrap_or("<Not available>"));
        info!("  Speed: {:?}", device_info.speed());
        info!("---");
    }

    if count == 0 {
        info!("No USB devices found.");
    } else {
        info!(total = count, amps, "Done.");
    }
    Ok(())
}
