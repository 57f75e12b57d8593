use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::backend::Submit;
use crate::config::ScannerConfig;
use crate::devices::open_serial_device;
use crate::icon::EncodedIcon;
use crate::scanner::{ReadOutcome, ScanReader, ScanRecord, ScannerError};
use crate::ticket::SubmissionPayload;

/// Reads barcodes from the scanner and forwards each one to the ticket backend.
pub struct ScannerBridgeServer<S> {
    config: ScannerConfig,
    icon: Option<EncodedIcon>,
    submitter: S,
    shutdown: Arc<AtomicBool>,
}

impl<S: Submit> ScannerBridgeServer<S> {
    pub fn new(
        config: ScannerConfig,
        icon: Option<EncodedIcon>,
        submitter: S,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        info!(
            "Creating scanner bridge for device {}.",
            config.serial_device()
        );

        ScannerBridgeServer {
            config,
            icon,
            submitter,
            shutdown,
        }
    }

    /// Connect to the scanner and serve until shutdown is requested.
    ///
    /// Returns `Ok(())` only when the shutdown flag was raised. Failing to open the port, a
    /// disconnect, a read error or a barcode that is not valid UTF-8 end the loop with an error.
    /// The port is closed on every path.
    #[tracing::instrument(skip(self))]
    pub fn start(&self) -> Result<(), ScannerError> {
        let device = self.config.serial_device();
        let port = open_serial_device(&device)?;

        info!(
            "Successfully connected to serial port '{}' with baud rate {}. Waiting for barcode messages...",
            device.path, device.baud_rate
        );

        self.run(&mut ScanReader::new(port))
    }

    /// Drive the read-submit cycle over an already connected stream.
    pub fn run<R: Read>(&self, reader: &mut ScanReader<R>) -> Result<(), ScannerError> {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(());
            }

            match reader.read_record()? {
                ReadOutcome::Idle => continue,
                ReadOutcome::Closed => return Err(ScannerError::Disconnected),
                ReadOutcome::Record(record) if !record.is_complete() => {
                    warn!(
                        "Discarding partial barcode without terminator: {:?}",
                        String::from_utf8_lossy(record.raw())
                    );
                }
                ReadOutcome::Record(record) => self.handle_record(&record)?,
            }
        }
    }

    fn handle_record(&self, record: &ScanRecord) -> Result<(), ScannerError> {
        let barcode = record.decode()?;
        debug!(
            "Received Raw Barcode: {:?} / Length: {} / Valid Barcode: {}",
            String::from_utf8_lossy(record.raw()),
            record.raw().len(),
            barcode
        );

        let payload = SubmissionPayload::new(&self.config, &barcode, self.icon.as_ref());
        match self.submitter.submit(&payload) {
            Ok(body) => info!("Data sent successfully. Response: {}", body),
            Err(e) => error!("Error sending data to API: {}", e),
        }
        Ok(())
    }
}
