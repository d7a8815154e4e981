//! JSON exporter for offline inspection of simulation runs.
//!
//! Exports sampled frames as JSON; each frame carries the scroll state and
//! every card's world position.

use cardtrain_core::{CardItem, FrameReport};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Simulation time in seconds
    pub time_sec: f64,

    pub offset: f64,
    pub velocity: f64,
    pub activity: f64,
    pub fov: f64,

    /// Card positions
    pub cards: Vec<CardPosition>,

    /// Events (input, re-centering, etc.)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SimEvent>,
}

impl SimFrame {
    /// Builds a frame from an engine report.
    pub fn from_report(time_sec: f64, report: &FrameReport, items: &[CardItem]) -> Self {
        let cards = report
            .placements
            .iter()
            .zip(items)
            .map(|(p, item)| CardPosition {
                index: item.index,
                along: p.along,
                x: p.position.x,
                y: p.position.y,
                z: p.position.z,
            })
            .collect();

        let mut events = Vec::new();
        if report.recentered {
            events.push(SimEvent {
                message: format!("offset re-centered to {:.4}", report.state.offset),
                level: Some("info".to_string()),
            });
        }

        Self {
            time_sec,
            offset: report.state.offset,
            velocity: report.state.velocity,
            activity: report.state.activity,
            fov: report.fov,
            cards,
            events,
        }
    }
}

/// Position of a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPosition {
    pub index: usize,
    pub along: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Simulation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimEvent {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Cards on the rail
    pub card_count: usize,

    /// Duration in seconds
    pub duration_sec: f64,

    /// Sampled frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, card_count: usize) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            card_count,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
