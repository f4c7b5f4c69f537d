use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Lane color of a note. The binary format stores the variant index.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Red,
    Green,
    Blue,
}

impl NoteColor {
    pub const NAMES: &'static [&'static str] = &["red", "green", "blue"];

    pub fn wire_index(self) -> i8 {
        self as i8
    }
}

/// Side of the track the note travels in from. The binary format stores the variant index.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub const NAMES: &'static [&'static str] = &["left", "right"];

    pub fn wire_index(self) -> i8 {
        self as i8
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub color: NoteColor,
    pub direction: Direction,
    pub start_ms: u32,
    pub length_ms: u32,
    pub speed: Option<f32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Song {
    pub ms_per_pixel: u32,
    pub lead_in_ms: u32,
    pub author: Option<String>,
    pub difficulty: i8,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Chart {
    pub song: Song,
    pub notes: Vec<Note>,
}

impl Chart {
    /// Extract typed chart data from a document that already passed validation.
    pub fn from_document(doc: Value) -> Result<Self> {
        serde_yaml::from_value(doc).map_err(|e| anyhow!("Failed to extract chart data: {}", e))
    }
}
