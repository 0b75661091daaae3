//! CSV sink: one line of byte/packet rates per successful sample tick.
//!
//! Rates are logged as stored (bytes/s and packets/s); the bits/bytes
//! display toggle never reaches this file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::rates::RateSample;

const HEADER: &str = "time_s,rx_Bps,tx_Bps,rx_pps,tx_pps";

/// Append-per-tick CSV writer, flushed after every line so the file is
/// usable while the monitor is still running.
#[derive(Debug)]
pub struct CsvSink {
    file: File,
}

impl CsvSink {
    /// Opens the sink. A fresh file always gets the header; in append mode
    /// the header is only written when explicitly requested.
    pub fn open(path: &Path, append: bool, force_headers: bool) -> io::Result<Self> {
        let mut file = if append {
            OpenOptions::new().create(true).append(true).open(path)?
        } else {
            File::create(path)?
        };
        if !append || force_headers {
            writeln!(file, "{}", HEADER)?;
            file.flush()?;
        }
        Ok(Self { file })
    }

    /// Writes one sample: monotonic time with microsecond precision,
    /// rates rounded to integers.
    pub fn write(&mut self, sample: &RateSample) -> io::Result<()> {
        writeln!(
            self.file,
            "{:.6},{:.0},{:.0},{:.0},{:.0}",
            sample.taken_at,
            sample.rx_bytes_per_sec,
            sample.tx_bytes_per_sec,
            sample.rx_pkts_per_sec,
            sample.tx_pkts_per_sec,
        )?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RateSample {
        RateSample {
            rx_bytes_per_sec: 125_000_000.4,
            tx_bytes_per_sec: 250.6,
            rx_pkts_per_sec: 1000.0,
            tx_pkts_per_sec: 0.0,
            taken_at: 12.5,
        }
    }

    #[test]
    fn fresh_file_gets_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        let mut sink = CsvSink::open(&path, false, false).unwrap();
        sink.write(&sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("12.500000,125000000,251,1000,0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn append_preserves_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        {
            let mut sink = CsvSink::open(&path, false, false).unwrap();
            sink.write(&sample()).unwrap();
        }
        {
            let mut sink = CsvSink::open(&path, true, false).unwrap();
            sink.write(&sample()).unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        // One header, two data rows.
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.matches(HEADER).count(), 1);
    }

    #[test]
    fn append_with_forced_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        let mut sink = CsvSink::open(&path, true, true).unwrap();
        sink.write(&sample()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(HEADER));
    }
}
