use std::fmt::Debug;

use derive_more::Display;
use serialport::SerialPort;
use tracing::debug;

use crate::constants::SERIAL_POLL_INTERVAL;
use crate::scanner::ScannerError;

/// Identifier for the serial-attached scanner this bridge reads from.
#[derive(Debug, Display, Eq, PartialEq, Clone)]
#[display(fmt = "Serial {{ path: {}, baud_rate: {} }}", path, baud_rate)]
pub struct SerialDeviceIdentifier {
    /// Device node or port name, e.g. `/dev/ttyUSB0` or `COM3`.
    pub path: String,
    pub baud_rate: u32,
}

/// Open the scanner's serial port.
///
/// Reads on the returned port time out after [`SERIAL_POLL_INTERVAL`] so that the scan loop can
/// notice a shutdown request while no barcode is being scanned. The port is closed when the
/// returned handle is dropped.
#[tracing::instrument]
pub fn open_serial_device(
    device: &SerialDeviceIdentifier,
) -> Result<Box<dyn SerialPort>, ScannerError> {
    debug!("Opening serial port.");
    serialport::new(&device.path, device.baud_rate)
        .timeout(SERIAL_POLL_INTERVAL)
        .open()
        .map_err(|source| ScannerError::Open {
            path: device.path.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let device = SerialDeviceIdentifier {
            path: "/dev/ttyACM0".to_string(),
            baud_rate: 9600,
        };
        assert_eq!(
            device.to_string(),
            "Serial { path: /dev/ttyACM0, baud_rate: 9600 }"
        );
    }

    #[test]
    fn test_open_missing_device_fails() {
        let device = SerialDeviceIdentifier {
            path: "/dev/this-scanner-does-not-exist".to_string(),
            baud_rate: 115_200,
        };
        match open_serial_device(&device) {
            Err(ScannerError::Open { path, .. }) => assert_eq!(path, device.path),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opened a device that does not exist"),
        }
    }
}
