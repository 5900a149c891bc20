use crate::error::{NavigatorError, Result};
use crate::record::NavigatorRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// `[Item = 12]`
static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\S+)\s*=\s*(.*\S)\s*\]").expect("header pattern is valid")
});

/// `StageXYZ = 1.0 2.0 0.0`
static FIELD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+)\s*=\s*(.*\S)\s*$").expect("field pattern is valid"));

/// Line-oriented parser for the navigator text format.
///
/// A header line `[KEY = VALUE]` opens a record and every following
/// `KEY = VALUE` line is attached to it. Lines before the first header and
/// lines matching neither shape are ignored.
///
/// Known quirk kept for compatibility: a record is only emitted when the
/// *next* header line is seen, so the last record in the file is always
/// dropped. Existing navigator files and downstream acquisition scripts are
/// built around this numbering, so a navigator with N headers yields N-1
/// records.
#[derive(Debug, Default)]
pub struct NavigatorParser {
    records: Vec<NavigatorRecord>,
    current: Option<NavigatorRecord>,
}

impl NavigatorParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse navigator text held in memory.
    ///
    /// `\n`, `\r\n` and a bare `\r` all end a line.
    #[must_use]
    pub fn parse_str(text: &str) -> Vec<NavigatorRecord> {
        let mut parser = Self::new();
        for line in text.split(['\r', '\n']) {
            parser.push_line(line);
        }
        parser.finish()
    }

    /// Parse navigator text from any buffered reader.
    ///
    /// Line endings are handled as in [`Self::parse_str`]. Bytes that are not
    /// valid UTF-8 (a Latin-1 `µ` in a note, say) become U+FFFD instead of
    /// failing the read.
    pub fn parse_reader<R: BufRead>(mut reader: R) -> std::io::Result<Vec<NavigatorRecord>> {
        let mut parser = Self::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            for line in buf.split(|b| matches!(b, b'\r' | b'\n')) {
                parser.push_line(&String::from_utf8_lossy(line));
            }
        }
        Ok(parser.finish())
    }

    /// Open and parse a navigator file
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<NavigatorRecord>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| NavigatorError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let records =
            Self::parse_reader(BufReader::new(file)).map_err(|source| NavigatorError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!(
            "parsed {} navigator records from {}",
            records.len(),
            path.display()
        );
        Ok(records)
    }

    /// Feed one line. Carriage returns and newlines are stripped first.
    pub fn push_line(&mut self, raw: &str) {
        let line: String = raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();

        if let Some(caps) = HEADER_LINE.captures(&line) {
            if let Some(done) = self.current.take() {
                self.records.push(done);
            }
            let label = caps.get(2).map_or("", |m| m.as_str()).trim();
            self.current = Some(NavigatorRecord::new(label));
            return;
        }

        if let Some(caps) = FIELD_LINE.captures(&line) {
            if let Some(record) = self.current.as_mut() {
                let key = caps.get(1).map_or("", |m| m.as_str());
                let value = caps.get(2).map_or("", |m| m.as_str()).trim();
                record.set_field(key, value);
            }
        }
    }

    /// Records completed so far.
    ///
    /// The record still open is discarded (see the type-level docs).
    #[must_use]
    pub fn finish(self) -> Vec<NavigatorRecord> {
        if let Some(open) = &self.current {
            log::debug!(
                "dropping trailing navigator record '{}' ({} fields)",
                open.item_label,
                open.field_count()
            );
        }
        self.records
    }
}
