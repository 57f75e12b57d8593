use std::io::{self, BufRead, BufReader, Read};
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::constants::SCAN_DELIMITER;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("failed to open serial port '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("serial read failed: {0}")]
    Io(#[from] io::Error),

    #[error("barcode is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),

    #[error("serial device closed the connection")]
    Disconnected,
}

impl ScannerError {
    /// Whether the serial port itself failed, as opposed to the data read from it.
    pub fn is_serial_fault(&self) -> bool {
        matches!(
            self,
            ScannerError::Open { .. } | ScannerError::Io(_) | ScannerError::Disconnected
        )
    }
}

/// The bytes of one physical scan, as read from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    raw: Vec<u8>,
}

impl ScanRecord {
    pub fn new(raw: Vec<u8>) -> Self {
        ScanRecord { raw }
    }

    /// Everything read for this scan, delimiter included.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// A record is complete when the device sent the delimiter. Anything else was cut short by
    /// the stream ending.
    pub fn is_complete(&self) -> bool {
        self.raw.last() == Some(&SCAN_DELIMITER)
    }

    /// The barcode bytes, with all trailing delimiters removed.
    pub fn barcode_bytes(&self) -> &[u8] {
        let end = self
            .raw
            .iter()
            .rposition(|&b| b != SCAN_DELIMITER)
            .map_or(0, |i| i + 1);
        &self.raw[..end]
    }

    pub fn decode(&self) -> Result<String, FromUtf8Error> {
        String::from_utf8(self.barcode_bytes().to_vec())
    }
}

/// Result of one attempt to read a scan.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A record, complete or partial.
    Record(ScanRecord),
    /// The read timed out before a delimiter arrived. Bytes received so far are kept for the
    /// next attempt.
    Idle,
    /// The stream ended with nothing pending.
    Closed,
}

/// Splits a byte stream into delimiter-terminated scan records.
pub struct ScanReader<R> {
    inner: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: Read> ScanReader<R> {
    pub fn new(inner: R) -> Self {
        ScanReader {
            inner: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Block until a delimiter, the end of the stream or a read timeout.
    pub fn read_record(&mut self) -> Result<ReadOutcome, ScannerError> {
        match self.inner.read_until(SCAN_DELIMITER, &mut self.pending) {
            Ok(0) if self.pending.is_empty() => Ok(ReadOutcome::Closed),
            Ok(_) => {
                let raw = std::mem::take(&mut self.pending);
                Ok(ReadOutcome::Record(ScanRecord::new(raw)))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(ReadOutcome::Idle)
            }
            Err(e) => Err(e.into()),
        }
    }
}
