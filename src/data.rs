// src/data.rs
use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::controller::{FrameOutcome, FrameStatus, PointerAction, SessionStats};
use crate::pointer::MouseButton;

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: u64,
    timestamp_ms: f64,
    status: FrameStatus,
    fingers: Option<String>,
    gesture: Option<String>,
    action: Option<&'static str>,
    cursor_x: Option<i32>,
    cursor_y: Option<i32>,
    scroll_delta: Option<i32>,
    injection_failed: bool,
}

#[derive(Debug, Serialize)]
struct SessionSummary<'a> {
    session: &'a str,
    exported_at: String,
    #[serde(flatten)]
    stats: &'a SessionStats,
}

/// Collects per-frame decisions and writes them out when the session ends.
pub struct DataExporter {
    output_dir: PathBuf,
    session_name: String,
    records: Vec<FrameRecord>,
}

impl DataExporter {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            records: Vec::new(),
        }
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn add_frame(&mut self, outcome: &FrameOutcome) {
        self.records.push(Self::create_record(outcome));
    }

    fn create_record(outcome: &FrameOutcome) -> FrameRecord {
        let mut record = FrameRecord {
            frame: outcome.index,
            timestamp_ms: outcome.timestamp.as_secs_f64() * 1000.0,
            status: outcome.status,
            fingers: outcome.fingers.map(|f| f.to_string()),
            gesture: outcome.gesture.map(|g| g.to_string()),
            action: None,
            cursor_x: None,
            cursor_y: None,
            scroll_delta: None,
            injection_failed: outcome.injection_failed,
        };

        match outcome.action {
            Some(PointerAction::Move { x, y }) => {
                record.action = Some("move");
                record.cursor_x = Some(x);
                record.cursor_y = Some(y);
            }
            Some(PointerAction::Click { button: MouseButton::Left }) => {
                record.action = Some("left_click");
            }
            Some(PointerAction::Click { button: MouseButton::Right }) => {
                record.action = Some("right_click");
            }
            Some(PointerAction::Scroll { delta }) => {
                record.action = Some("scroll");
                record.scroll_delta = Some(delta);
            }
            None => {}
        }
        record
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("frames.csv");

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = File::create(&csv_path)
            .with_context(|| format!("Failed to create {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(csv_path)
    }

    pub fn export_summary(&self, stats: &SessionStats) -> Result<PathBuf> {
        let summary_path = self.session_dir().join("summary.json");

        if let Some(parent) = summary_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let summary = SessionSummary {
            session: &self.session_name,
            exported_at: Local::now().to_rfc3339(),
            stats,
        };
        std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        Ok(summary_path)
    }
}
