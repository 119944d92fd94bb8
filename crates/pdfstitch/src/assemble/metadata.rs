//! PDF metadata management.
//!
//! This module handles the output document's Info dictionary:
//! - Title, Author, Subject, Keywords
//! - Creator, Producer
//! - Creation and modification dates

use crate::config::Metadata;
use lopdf::{Dictionary, Document, Object, decode_text_string, text_string};
use std::time::{SystemTime, UNIX_EPOCH};

/// Name written to the Creator and Producer entries.
const PRODUCER: &str = concat!("pdfstitch ", env!("CARGO_PKG_VERSION"));

/// Manager for PDF metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Write the Info dictionary of a freshly assembled document.
    ///
    /// Creator, Producer and both dates are always set; the descriptive
    /// fields only when present in `metadata`.
    pub fn set_metadata(&self, doc: &mut Document, metadata: &Metadata) {
        self.set_metadata_at(doc, metadata, SystemTime::now());
    }

    fn set_metadata_at(&self, doc: &mut Document, metadata: &Metadata, now: SystemTime) {
        let mut info = Dictionary::new();

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }

        info.set("Creator", text_string(PRODUCER));
        info.set("Producer", text_string(PRODUCER));

        let date = format_pdf_date(now);
        info.set("CreationDate", text_string(&date));
        info.set("ModDate", text_string(&date));

        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);
    }

    /// Get metadata from a document.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info) = info_dictionary(doc) else {
            return Metadata::default();
        };

        Metadata::new(
            string_field(info, b"Title"),
            string_field(info, b"Author"),
            string_field(info, b"Subject"),
            string_field(info, b"Keywords"),
        )
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).and_then(decode_text_string).ok()
}

/// Format a SystemTime as a PDF date string in UTC: `D:YYYYMMDDHHmmSSZ`.
pub(crate) fn format_pdf_date(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);

    format!(
        "D:{year:04}{month:02}{day:02}{:02}{:02}{:02}Z",
        rem / 3_600,
        (rem % 3_600) / 60,
        rem % 60
    )
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
