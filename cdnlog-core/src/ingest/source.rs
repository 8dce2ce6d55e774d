use crate::ingest::error::IngestError;
use crate::parse::ParseBatch;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Parses every line of `reader`. Invalid UTF-8 is decoded lossily.
pub fn parse_reader<R: BufRead>(reader: R) -> io::Result<ParseBatch> {
    let mut batch = ParseBatch::new();

    for (idx, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        batch.push_line(idx + 1, line.trim_end_matches('\r'));
    }

    Ok(batch)
}

/// Parses the given files in order into one batch.
///
/// Paths ending in `.gz` are decompressed on the fly. Line numbers in
/// failures are relative to their own file.
pub fn read_sources<P: AsRef<Path>>(paths: &[P]) -> Result<ParseBatch, IngestError> {
    let mut batch = ParseBatch::new();

    for path in paths {
        let path = path.as_ref();
        let reader = open_source(path).map_err(|e| IngestError::read_file(path, e))?;
        let parsed = parse_reader(reader).map_err(|e| IngestError::read_file(path, e))?;

        info!(
            path = %path.display(),
            parsed = parsed.stats().parsed,
            failed = parsed.stats().failed,
            "parsed log source"
        );

        batch.extend(parsed);
    }

    Ok(batch)
}

fn open_source(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
