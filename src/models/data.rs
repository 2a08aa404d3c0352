use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D coordinate in image space (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Two points on an infinite line, used only for intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Line { p1, p2 }
    }
}

/// Four true document corners, clockwise in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quadrilateral {
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Classes emitted by the card detector, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardType {
    Unknown,
    IdFront,
    IdBack,
    LicenseFront,
    LicenseBack,
}

impl CardType {
    pub const ALL: [CardType; 5] = [
        CardType::Unknown,
        CardType::IdFront,
        CardType::IdBack,
        CardType::LicenseFront,
        CardType::LicenseBack,
    ];

    pub fn from_index(index: usize) -> Option<CardType> {
        Self::ALL.get(index).copied()
    }
}

/// One analyzed frame from the keypoint detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub class_label: CardType,
    pub confidence: f32,
    pub keypoints: [Point; 8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    TD1, // ID Card, 3 lines of 30
    TD3, // Passport, 2 lines of 44
}

impl DocumentFormat {
    pub fn mrz_lines(&self) -> usize {
        match self {
            DocumentFormat::TD1 => 3,
            DocumentFormat::TD3 => 2,
        }
    }

    pub fn mrz_chars_per_line(&self) -> usize {
        match self {
            DocumentFormat::TD1 => 30,
            DocumentFormat::TD3 => 44,
        }
    }

    pub fn mrz_total_chars(&self) -> usize {
        self.mrz_lines() * self.mrz_chars_per_line()
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DocumentFormat::TD1 => write!(f, "TD1"),
            DocumentFormat::TD3 => write!(f, "TD3"),
        }
    }
}

/// A fully check-digit-verified MRZ.
///
/// `document_number`, `birth_date` and `expiry_date` are the verified
/// fields; the descriptive fields are sliced from fixed positions and are
/// informational only. `raw_lines` keep the recognized text verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MrzRecord {
    pub format: DocumentFormat,
    pub document_code: String,
    pub issuing_state: String,
    pub document_number: String,
    pub birth_date: String,
    pub expiry_date: String,
    pub sex: String,
    pub nationality: String,
    pub surname: String,
    pub given_names: String,
    pub optional_data: Option<String>,
    pub raw_lines: Vec<String>,
}

impl MrzRecord {
    /// The MRZ as one string with no separators, as reported to the host.
    pub fn mrz_string(&self) -> String {
        self.raw_lines.concat()
    }
}
