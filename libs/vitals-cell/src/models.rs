use std::fmt;

use serde::{Deserialize, Serialize};

/// Display length above which a reading is rendered in the compact size.
pub const COMPACT_THRESHOLD: usize = 5;

pub const HEART_RATE_TITLE: &str = "Heart rate";
pub const HEART_RATE_UNIT: &str = "bpm";

/// A heart-rate measurement. Sensors publish either a number or a numeric string.
///
/// The text is kept as published, so `"072"` displays (and is measured) as `072`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReading", into = "f64")]
pub struct HeartRateReading {
    value: f64,
    text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReading {
    Number(f64),
    Text(String),
}

impl HeartRateReading {
    /// Whole numbers print without a fractional part: 72, not 72.0
    pub fn new(value: f64) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_text(&self) -> &str {
        &self.text
    }
}

impl TryFrom<RawReading> for HeartRateReading {
    type Error = String;

    fn try_from(raw: RawReading) -> Result<Self, Self::Error> {
        match raw {
            RawReading::Number(value) => Ok(Self::new(value)),
            RawReading::Text(text) => {
                let text = text.trim();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| format!("Not a numeric reading: {}", text))?;
                Ok(Self {
                    value,
                    text: text.to_string(),
                })
            }
        }
    }
}

impl From<HeartRateReading> for f64 {
    fn from(reading: HeartRateReading) -> Self {
        reading.value
    }
}

impl fmt::Display for HeartRateReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontSize {
    Regular,
    Compact,
}

impl FontSize {
    /// Size for a reading shown as `text`: long values shrink to keep the card layout.
    pub fn for_text(text: &str) -> Self {
        if text.chars().count() > COMPACT_THRESHOLD {
            FontSize::Compact
        } else {
            FontSize::Regular
        }
    }

    pub fn px(&self) -> u32 {
        match self {
            FontSize::Regular => 25,
            FontSize::Compact => 20,
        }
    }

    pub fn css(&self) -> String {
        format!("{}px", self.px())
    }
}

/// What the vitals card renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsCard {
    pub title: String,
    pub value: String,
    pub label: String,
    pub font_size: FontSize,
}

impl VitalsCard {
    /// `None` when there is no reading to show.
    pub fn from_reading(reading: Option<HeartRateReading>) -> Option<Self> {
        let reading = reading?;
        let value = reading.to_string();

        Some(Self {
            title: HEART_RATE_TITLE.to_string(),
            label: format!("{} {}", value, HEART_RATE_UNIT),
            font_size: FontSize::for_text(&value),
            value,
        })
    }
}
