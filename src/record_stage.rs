//! Record-at-a-time stage trait and the column-shortening stage.
//!
//! A `RecordStage` rewrites one CSV data record at a time. The executor
//! hands every record after the header to the stage and writes whatever it
//! returns, so a failing stage stops the stream at the offending record.

use csv::StringRecord;

use crate::error::ShortenError;
use crate::shortcode::shorten;

/// A stage that rewrites data records one at a time.
pub trait RecordStage {
    /// Rewrite a single data record.
    ///
    /// An error aborts the run; the record is not written.
    fn process(&mut self, record: StringRecord) -> Result<StringRecord, ShortenError>;

    /// The display name of this stage.
    fn name(&self) -> &str;
}

/// SHORTEN column - replaces one field with its short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortenColumn {
    column: usize,
}

impl ShortenColumn {
    pub fn new(column: usize) -> Self {
        Self { column }
    }

    /// Zero-based index of the rewritten field.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl RecordStage for ShortenColumn {
    fn process(&mut self, record: StringRecord) -> Result<StringRecord, ShortenError> {
        let line = record.position().map_or(0, |p| p.line());

        let Some(value) = record.get(self.column) else {
            return Err(ShortenError::MissingColumn {
                line,
                column: self.column,
                fields: record.len(),
                record: record_line(&record),
            });
        };

        let Some(short) = shorten(value) else {
            return Err(ShortenError::EmptyField {
                line,
                column: self.column,
                record: record_line(&record),
            });
        };

        let mut output = StringRecord::with_capacity(record.as_slice().len(), record.len());
        for (i, field) in record.iter().enumerate() {
            if i == self.column {
                output.push_field(&short);
            } else {
                output.push_field(field);
            }
        }
        output.set_position(record.position().cloned());
        Ok(output)
    }

    fn name(&self) -> &str {
        "SHORTEN"
    }
}

/// Render a record back to a single CSV line, without the terminator.
///
/// A record with no fields (a blank input line) renders as an empty line.
pub fn record_line(record: &StringRecord) -> String {
    if record.is_empty() {
        return String::new();
    }

    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    let rendered = wtr
        .write_record(record)
        .ok()
        .and_then(|()| wtr.into_inner().ok())
        .and_then(|bytes| String::from_utf8(bytes).ok());

    match rendered {
        Some(mut line) => {
            let trimmed = line.trim_end_matches(['\r', '\n']).len();
            line.truncate(trimmed);
            line
        }
        None => record.iter().collect::<Vec<_>>().join(","),
    }
}
