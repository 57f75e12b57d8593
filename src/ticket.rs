use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

use crate::config::ScannerConfig;
use crate::icon::EncodedIcon;

/// JSON body of a ticket submission.
///
/// The scanned text is sent twice, once as the licence plate number and once as the bar code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload<'a> {
    pub ticket_type: &'a str,
    #[serde(rename = "LPN")]
    pub lpn: &'a str,
    pub epan: &'a str,
    pub bar_code: &'a str,
    pub image: Option<&'a EncodedIcon>,
    pub tariff_class: i64,
}

impl<'a> SubmissionPayload<'a> {
    pub fn new(config: &'a ScannerConfig, barcode: &'a str, icon: Option<&'a EncodedIcon>) -> Self {
        SubmissionPayload {
            ticket_type: &config.ticket_type,
            lpn: barcode,
            epan: "",
            bar_code: barcode,
            image: icon,
            tariff_class: config.ticket_tariff_class,
        }
    }

    /// JSON of the payload indented by four spaces, without the image, which is too large to
    /// log.
    pub fn to_log_string(&self) -> String {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(fields) = &mut value {
            fields.remove("image");
        }

        let mut out = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        if value.serialize(&mut serializer).is_err() {
            return String::new();
        }
        String::from_utf8(out).unwrap_or_default()
    }
}
