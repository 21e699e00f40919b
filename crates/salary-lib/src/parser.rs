//! Salary text normalization
//!
//! Converts free-form compensation strings ("15k-25k", "1.5万-2万", "25k")
//! into a single representative numeric value. Unparsable text yields
//! `None` so callers can drop bad rows without special-casing.

use regex::Regex;

/// Multiplier applied when a thousand marker ("k"/"K") is present
const THOUSAND: f64 = 1_000.0;

/// Multiplier applied when a ten-thousand marker ("万") is present
const TEN_THOUSAND: f64 = 10_000.0;

/// Parses free-form salary strings into numeric estimates
pub struct SalaryTextParser {
    range_pattern: Regex,
    single_pattern: Regex,
}

impl SalaryTextParser {
    pub fn new() -> Self {
        Self {
            range_pattern: Regex::new(r"(\d+(?:\.\d+)?)\s*([kK万]?)\s*-\s*(\d+(?:\.\d+)?)\s*([kK万]?)")
                .expect("range pattern compiles"),
            single_pattern: Regex::new(r"(\d+(?:\.\d+)?)\s*([kK万]?)")
                .expect("single pattern compiles"),
        }
    }

    /// Parse a salary string into a representative value.
    ///
    /// A range resolves to the arithmetic mean of its rescaled bounds; a
    /// lone number resolves to itself rescaled. Returns `None` when neither
    /// pattern matches or a numeric conversion fails.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let has_thousand_marker = text.contains(['k', 'K']);
        let has_ten_thousand_marker = text.contains('万');

        if let Some(caps) = self.range_pattern.captures(text) {
            let low: f64 = caps.get(1)?.as_str().parse().ok()?;
            let high: f64 = caps.get(3)?.as_str().parse().ok()?;
            // A marker on either bound (or anywhere in the string) rescales
            // both bounds together
            let scale = if has_thousand_marker {
                THOUSAND
            } else if has_ten_thousand_marker {
                TEN_THOUSAND
            } else {
                1.0
            };
            return Some((low * scale + high * scale) / 2.0);
        }

        let caps = self.single_pattern.captures(text)?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        let scale = if has_thousand_marker {
            THOUSAND
        } else if has_ten_thousand_marker {
            TEN_THOUSAND
        } else {
            1.0
        };
        Some(value * scale)
    }
}

impl Default for SalaryTextParser {
    fn default() -> Self {
        Self::new()
    }
}
