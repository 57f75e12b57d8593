use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::backend::BackendClient;
use crate::config::ScannerConfig;
use crate::constants::ICON_PATH;
use crate::server::ScannerBridgeServer;

// Serial barcode scanners in "virtual COM port" mode send each decoded symbol as plain text
// followed by a carriage return. Nothing is ever written back to the device.
//
// Every scan becomes one ticket submission to the backend, carrying the scanned text as both the
// licence plate number and the bar code, plus the configured ticket type and tariff class. A
// failed submission is logged and dropped; the next scan is handled normally.

pub mod backend;
pub mod config;
pub mod constants;
pub mod devices;
pub mod icon;
pub mod scanner;
pub mod server;
pub mod ticket;
pub mod tools;

fn main() -> ExitCode {
    let config = match ScannerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = tools::initialize_logging(config.log_json);
    info!(
        "Configuration values: BACK_APP_API: {}:{}, BARCODE_SERIAL_PORT: {}, BARCODE_SERIAL_BAUDRATE: {}",
        config.back_app_api_url,
        config.back_app_api_port,
        config.barcode_serial_port,
        config.barcode_serial_baudrate
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        warn!("Failed to install the interrupt handler: {}", e);
    }

    let icon = icon::load_icon(Path::new(ICON_PATH));

    let client = match BackendClient::new(config.api_url()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build the HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let server = ScannerBridgeServer::new(config, icon, client, shutdown);
    match server.start() {
        Ok(()) => {
            info!("Program terminated by user.");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_serial_fault() => {
            error!("Error connecting to serial port: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Unexpected error: {}", e);
            ExitCode::FAILURE
        }
    }
}
