use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::constants::ICON_MIME_TYPE;

#[derive(Error, Debug)]
pub enum IconError {
    #[error("Icon file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load image from path '{}'. Error: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An image encoded as a `data:` URI, ready to be embedded in a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedIcon(String);

impl EncodedIcon {
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        EncodedIcon(format!(
            "data:{};base64,{}",
            ICON_MIME_TYPE,
            STANDARD.encode(bytes)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn read_icon(path: &Path) -> Result<EncodedIcon, IconError> {
    if !path.exists() {
        return Err(IconError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| IconError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(EncodedIcon::from_png_bytes(&bytes))
}

/// Load the icon attached to every submission.
///
/// A missing or unreadable file is logged and yields `None`; submissions then go out without an
/// image.
#[tracing::instrument]
pub fn load_icon(path: &Path) -> Option<EncodedIcon> {
    match read_icon(path) {
        Ok(icon) => {
            debug!("Loaded icon ({} encoded bytes).", icon.as_str().len());
            Some(icon)
        }
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}
