//! Story-defined date formats and mixed-radix date linearization.
//!
//! A format such as `"9999.12.31"` lists the width of each positional segment.
//! A date string with the same number of segments is encoded as
//! `sum(d[i] * product(f[i+1..]))`, which orders dates without any calendar
//! knowledge: no leap years, no variable month lengths.

use std::fmt;
use std::str::FromStr;

use crate::error::DateFormatError;

const SEGMENT_SEPARATOR: char = '.';

/// A parsed story date format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    segments: Vec<i64>,
    multipliers: Vec<i64>,
    widths: Vec<usize>,
}

impl DateFormat {
    pub fn parse(format: &str) -> Result<Self, DateFormatError> {
        let format = format.trim();
        if format.is_empty() {
            return Err(DateFormatError::Empty);
        }

        let mut segments = Vec::new();
        let mut widths = Vec::new();
        for raw in format.split(SEGMENT_SEPARATOR) {
            let raw = raw.trim();
            let value = raw
                .parse::<i64>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or_else(|| DateFormatError::InvalidSegment {
                    segment: raw.to_string(),
                })?;
            segments.push(value);
            widths.push(raw.len());
        }

        let mut multipliers = vec![1i64; segments.len()];
        for i in (0..segments.len().saturating_sub(1)).rev() {
            multipliers[i] = multipliers[i + 1]
                .checked_mul(segments[i + 1])
                .ok_or_else(|| DateFormatError::Overflow {
                    format: format.to_string(),
                })?;
        }

        Ok(Self {
            segments,
            multipliers,
            widths,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Positional weight of each segment; the last one is always 1.
    pub fn multipliers(&self) -> &[i64] {
        &self.multipliers
    }

    /// Encodes a date string as a single comparable integer.
    ///
    /// Returns `None` when the segment count differs from the format, a
    /// segment is not an integer, or the encoding overflows.
    pub fn linearize(&self, date: &str) -> Option<i64> {
        let mut total: i64 = 0;
        let mut count = 0;
        for (i, raw) in date.trim().split(SEGMENT_SEPARATOR).enumerate() {
            let multiplier = *self.multipliers.get(i)?;
            let value = raw.trim().parse::<i64>().ok()?;
            total = total.checked_add(value.checked_mul(multiplier)?)?;
            count += 1;
        }
        (count == self.segments.len()).then_some(total)
    }

    /// Splits a linearized value back into its segments.
    pub fn decompose(&self, value: i64) -> Vec<i64> {
        let mut parts = Vec::with_capacity(self.segments.len());
        let mut rest = value;
        for (i, multiplier) in self.multipliers.iter().enumerate() {
            let part = if i == 0 {
                rest.div_euclid(*multiplier)
            } else {
                rest / multiplier
            };
            rest -= part * multiplier;
            parts.push(part);
        }
        parts
    }

    /// Renders a linearized value in the story's own notation, padding each
    /// segment to the digit width of its format segment.
    pub fn format(&self, value: i64) -> String {
        self.decompose(value)
            .iter()
            .zip(&self.widths)
            .map(|(part, width)| format!("{:0width$}", part, width = *width))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Value of the top-level segment (the "year") of a linearized date.
    pub fn top_level(&self, value: i64) -> i64 {
        value.div_euclid(self.multipliers[0])
    }

    /// Linearized start of a top-level period: every lower segment set to 1,
    /// i.e. the first day of the year for calendar-like formats.
    pub fn top_level_start(&self, top: i64) -> i64 {
        let lower: i64 = self.multipliers.iter().skip(1).sum();
        top.saturating_mul(self.multipliers[0]).saturating_add(lower)
    }
}

impl FromStr for DateFormat {
    type Err = DateFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .segments
            .iter()
            .zip(&self.widths)
            .map(|(segment, width)| format!("{:0width$}", segment, width = *width))
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&rendered)
    }
}
