// src/source.rs - Landmark frame sources
use anyhow::{Context, Result};
use nalgebra::Vector3;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::landmarks::HandFrame;

/// What the estimator saw during one capture cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    Hand(HandFrame),
    NoHand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimedCapture {
    /// Time since the start of the session.
    pub timestamp: Duration,
    pub capture: Capture,
}

pub trait FrameSource {
    /// Blocks until the next capture is available. `None` means the stream
    /// has ended.
    fn next_capture(&mut self) -> Result<Option<TimedCapture>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_capture(&mut self) -> Result<Option<TimedCapture>> {
        (**self).next_capture()
    }
}

/// Reads landmark rows written by an external estimator.
///
/// Each row is `timestamp_ms` followed either by nothing (no hand) or by
/// `x,y,z` triples, one per landmark. Lines starting with `#` are ignored.
pub struct CsvFrameSource {
    records: csv::StringRecordsIntoIter<Box<dyn Read + Send>>,
    realtime: bool,
    started: Option<Instant>,
    rows: usize,
}

impl CsvFrameSource {
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_records();
        Self { records, realtime: false, started: None, rows: 0 }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open landmark file {}", path.display()))?;
        info!("Replaying landmarks from {}", path.display());
        Ok(Self::from_reader(Box::new(BufReader::new(file))))
    }

    pub fn stdin() -> Self {
        info!("Reading landmarks from stdin");
        Self::from_reader(Box::new(std::io::stdin()))
    }

    /// Opens `input` as a file path, or stdin when it is `-`.
    pub fn from_input(input: &str, realtime: bool) -> Result<Self> {
        let source = if input == "-" { Self::stdin() } else { Self::open(input)? };
        Ok(source.with_realtime(realtime))
    }

    /// Sleeps so captures are delivered at their recorded pace.
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn is_realtime(&self) -> bool {
        self.realtime
    }

    fn parse_row(&self, record: &csv::StringRecord) -> Result<TimedCapture> {
        let mut fields = record.iter().filter(|f| !f.is_empty());
        let timestamp_ms: f64 = fields
            .next()
            .context("Row has no timestamp")?
            .parse()
            .with_context(|| format!("Invalid timestamp in row {}", self.rows))?;
        if !(timestamp_ms >= 0.0) {
            anyhow::bail!("Negative timestamp in row {}", self.rows);
        }

        let values = fields
            .map(|f| f.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid coordinate in row {}", self.rows))?;

        if values.len() % 3 != 0 {
            anyhow::bail!(
                "Row {} has {} coordinates, expected x,y,z triples",
                self.rows,
                values.len()
            );
        }

        let capture = if values.is_empty() {
            Capture::NoHand
        } else {
            let landmarks = values
                .chunks(3)
                .map(|c| Vector3::new(c[0], c[1], c[2]))
                .collect();
            Capture::Hand(HandFrame::new(landmarks))
        };

        Ok(TimedCapture {
            timestamp: Duration::from_secs_f64(timestamp_ms / 1000.0),
            capture,
        })
    }
}

impl FrameSource for CsvFrameSource {
    fn next_capture(&mut self) -> Result<Option<TimedCapture>> {
        let record = match self.records.next() {
            Some(record) => record.context("Failed to read landmark row")?,
            None => {
                debug!("Landmark stream ended after {} rows", self.rows);
                return Ok(None);
            }
        };
        self.rows += 1;
        let timed = self.parse_row(&record)?;

        if self.realtime {
            let started = *self.started.get_or_insert_with(Instant::now);
            if let Some(wait) = timed.timestamp.checked_sub(started.elapsed()) {
                std::thread::sleep(wait);
            }
        }
        Ok(Some(timed))
    }
}

/// In-memory source, mostly for tests and demos.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    captures: VecDeque<TimedCapture>,
}

impl ScriptedSource {
    pub fn new(captures: impl IntoIterator<Item = TimedCapture>) -> Self {
        Self { captures: captures.into_iter().collect() }
    }

    /// Captures spaced `interval` apart, starting at zero.
    pub fn evenly_spaced(captures: impl IntoIterator<Item = Capture>, interval: Duration) -> Self {
        Self::new(captures.into_iter().enumerate().map(|(i, capture)| TimedCapture {
            timestamp: interval * i as u32,
            capture,
        }))
    }
}

impl FrameSource for ScriptedSource {
    fn next_capture(&mut self) -> Result<Option<TimedCapture>> {
        Ok(self.captures.pop_front())
    }
}
