//! Serial adapter listing for `--list`.

use std::fmt;

use tokio_serial::{SerialPortInfo, SerialPortType, UsbPortInfo};

/// USB identity of an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbIdentity {
    /// Manufacturer string, if reported.
    pub manufacturer: Option<String>,
    /// Serial number string, if reported.
    pub serial_number: Option<String>,
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id.
    pub product_id: u16,
}

impl From<&UsbPortInfo> for UsbIdentity {
    fn from(info: &UsbPortInfo) -> Self {
        Self {
            manufacturer: info.manufacturer.clone(),
            serial_number: info.serial_number.clone(),
            vendor_id: info.vid,
            product_id: info.pid,
        }
    }
}

/// One enumerated serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    /// Device path.
    pub path: String,
    /// Present for USB adapters.
    pub usb: Option<UsbIdentity>,
}

impl From<&SerialPortInfo> for PortEntry {
    fn from(info: &SerialPortInfo) -> Self {
        let usb = match &info.port_type {
            SerialPortType::UsbPort(usb) => Some(UsbIdentity::from(usb)),
            _ => None,
        };
        Self { path: info.port_name.clone(), usb }
    }
}

impl fmt::Display for PortEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(usb) = &self.usb {
            write!(
                f,
                "  {} {} {:04x}:{:04x}",
                usb.manufacturer.as_deref().unwrap_or("-"),
                usb.serial_number.as_deref().unwrap_or("-"),
                usb.vendor_id,
                usb.product_id
            )?;
        }
        Ok(())
    }
}

/// Enumerate serial ports known to the OS.
///
/// # Errors
///
/// Returns the enumeration error from the OS layer.
pub fn list() -> Result<Vec<PortEntry>, tokio_serial::Error> {
    let ports = tokio_serial::available_ports()?;
    tracing::debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports.iter().map(PortEntry::from).collect())
}
