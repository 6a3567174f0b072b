//! Streaming record-at-a-time executor.
//!
//! Reads CSV records from the input one at a time. The first record (the
//! header) is copied to the output unchanged; every later record is pushed
//! through the stage and written before the next one is read. The whole
//! input is never held in memory.
//!
//! The CSV parser skips blank lines and strips a leading UTF-8 BOM. Both are
//! restored here: the input is read through a `LineTap` that sees the raw
//! bytes of every record, so a blank line after the header reaches the stage
//! as a record with no fields, and a BOM is written back ahead of the header.
//!
//! The first stage error stops the run. Everything written before it is
//! flushed so the caller's output keeps the rows that did convert.

use std::io::{self, Read, Write};

use csv::{Position, StringRecord};
use log::{debug, info, warn};

use crate::error::ShortenError;
use crate::record_stage::RecordStage;

const UTF8_BOM: &[u8; 3] = b"\xef\xbb\xbf";

/// Record counts for one run, header included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub input_count: usize,
    pub output_count: usize,
}

/// Execute a stage over a CSV stream.
///
/// The header keeps its field values and a leading BOM, but like every
/// record it is re-serialized: quotes only where needed, `\n` terminator.
/// Blank lines before the header are dropped. A blank line after it is a
/// record with no fields.
///
/// Returns the record counts on success. On a stage error the output is
/// flushed and the error returned; the failing record is not written.
pub fn execute<R, W, S>(input: R, mut output: W, stage: &mut S) -> Result<RunSummary, ShortenError>
where
    R: Read,
    W: Write,
    S: RecordStage + ?Sized,
{
    let (input, has_bom) = detect_bom(input)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(LineTap::new(input));

    let mut summary = RunSummary::default();
    let mut record = StringRecord::new();

    if !rdr.read_record(&mut record)? {
        return Err(ShortenError::MissingHeader);
    }
    let end = rdr.position().byte();
    rdr.get_mut().advance(end);
    summary.input_count += 1;
    debug!("header: {} field(s), passed through", record.len());
    if has_bom {
        debug!("header starts with a UTF-8 BOM");
        output.write_all(UTF8_BOM)?;
    }
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(output);
    wtr.write_record(&record)?;
    summary.output_count += 1;

    // Keep already converted rows even when the run fails.
    if let Err(e) = run_stage(&mut rdr, &mut wtr, stage, &mut summary) {
        if let Err(flush_err) = wtr.flush() {
            warn!("flushing output after failed run: {flush_err}");
        }
        return Err(e);
    }
    wtr.flush()?;

    info!(
        "{}: {} in -> {} out",
        stage.name(),
        summary.input_count,
        summary.output_count
    );
    Ok(summary)
}

fn run_stage<R, W, S>(
    rdr: &mut csv::Reader<LineTap<R>>,
    wtr: &mut csv::Writer<W>,
    stage: &mut S,
    summary: &mut RunSummary,
) -> Result<(), ShortenError>
where
    R: Read,
    W: Write,
    S: RecordStage + ?Sized,
{
    let mut record = StringRecord::new();
    loop {
        let start_line = rdr.position().line();
        let more = rdr.read_record(&mut record)?;
        let end = rdr.position().byte();
        let gap = rdr.get_mut().advance(end);
        let first_line = start_line + gap.line_offset;

        for i in 0..gap.blank_lines {
            let mut blank = StringRecord::new();
            blank.set_position(Some(line_position(first_line + i as u64)));
            push_record(wtr, stage, blank, summary)?;
        }
        if !more {
            return Ok(());
        }

        record.set_position(Some(line_position(first_line + gap.blank_lines as u64)));
        push_record(wtr, stage, std::mem::take(&mut record), summary)?;
    }
}

fn push_record<W, S>(
    wtr: &mut csv::Writer<W>,
    stage: &mut S,
    record: StringRecord,
    summary: &mut RunSummary,
) -> Result<(), ShortenError>
where
    W: Write,
    S: RecordStage + ?Sized,
{
    summary.input_count += 1;
    let converted = stage.process(record)?;
    wtr.write_record(&converted)?;
    summary.output_count += 1;
    Ok(())
}

fn line_position(line: u64) -> Position {
    let mut pos = Position::new();
    pos.set_line(line);
    pos
}

type BomReplay<R> = io::Chain<io::Take<io::Cursor<[u8; 3]>>, R>;

/// Read up to three bytes to look for a UTF-8 BOM, then hand back a reader
/// that still yields the full input.
fn detect_bom<R: Read>(mut input: R) -> io::Result<(BomReplay<R>, bool)> {
    let mut prefix = [0u8; 3];
    let mut filled = 0;
    while filled < prefix.len() {
        match input.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let has_bom = prefix[..filled] == UTF8_BOM[..];
    let replay = io::Cursor::new(prefix).take(filled as u64);
    Ok((replay.chain(input), has_bom))
}

/// Blank lines found ahead of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Gap {
    blank_lines: usize,
    /// Lines between the parser's position and the first blank line: 1 when
    /// the span opens with the `\n` of the previous record's `\r\n`.
    line_offset: u64,
}

/// Keeps the raw bytes the CSV parser has read but not yet accounted for.
///
/// The parser consumes blank lines while looking for the next record, so the
/// bytes between two reader positions are: skipped line terminators, then
/// the record itself.
struct LineTap<R> {
    inner: R,
    buf: Vec<u8>,
    base: u64,
    after_cr: bool,
}

impl<R> LineTap<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            base: 0,
            after_cr: false,
        }
    }

    /// Account for raw bytes up to byte offset `end`.
    fn advance(&mut self, end: u64) -> Gap {
        let len = usize::try_from(end.saturating_sub(self.base))
            .map_or(self.buf.len(), |n| n.min(self.buf.len()));
        let span = &self.buf[..len];

        let mut gap = Gap::default();
        let mut prev_cr = self.after_cr;
        for (i, &b) in span
            .iter()
            .take_while(|&&b| b == b'\r' || b == b'\n')
            .enumerate()
        {
            if b == b'\n' && prev_cr {
                if i == 0 {
                    gap.line_offset = 1;
                }
                prev_cr = false;
                continue;
            }
            gap.blank_lines += 1;
            prev_cr = b == b'\r';
        }

        if let Some(&last) = span.last() {
            self.after_cr = last == b'\r';
        }
        self.buf.drain(..len);
        self.base += len as u64;
        gap
    }
}

impl<R: Read> Read for LineTap<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(out)?;
        self.buf.extend_from_slice(&out[..n]);
        Ok(n)
    }
}
