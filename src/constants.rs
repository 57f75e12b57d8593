use std::time::Duration;

/// Byte the scanner appends to every barcode it sends.
pub static SCAN_DELIMITER: u8 = b'\r';

/// Optional file of `KEY=value` settings, relative to the working directory.
pub static DOTENV_PATH: &str = ".env";

/// Icon attached to every ticket submission, relative to the working directory.
pub static ICON_PATH: &str = "barcode-icon.png";

/// MIME type declared in the icon's data URI.
pub static ICON_MIME_TYPE: &str = "image/png";

/// Backend requests are abandoned after this long.
pub static REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a single serial read blocks before the loop checks for shutdown.
pub static SERIAL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Directory and file name prefix of the rotating log file.
pub static LOG_DIRECTORY: &str = ".";
pub static LOG_FILE_NAME: &str = "barcode_scanner.log";
