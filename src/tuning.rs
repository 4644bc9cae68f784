//! Data-driven game balance
//!
//! Everything that shapes how the game *feels* lives here so it can be tweaked
//! from a JSON file without recompiling. Geometry that the scoring and pipe
//! indexing depend on (pipe spacing, bird radius, bounds) stays in
//! [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating tuning data
#[derive(Error, Debug)]
pub enum TuningError {
    /// Tuning file could not be read
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    /// Tuning document is not valid JSON for [`Tuning`]
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside the range the simulation can handle
    #[error("tuning value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },

    /// Pipes would overlap vertically and close the gap
    #[error("gap_half_height {gap_half_height} must exceed half the pipe height {half_pipe}")]
    ClosedGap { gap_half_height: f32, half_pipe: f32 },
}

/// Gameplay balance parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Horizontal bird speed while alive (world units/s)
    pub forward_speed: f32,
    /// Downward acceleration (world units/s²)
    pub gravity: f32,
    /// Vertical velocity set by a fresh flap
    pub flap_impulse: f32,
    /// Distance from the gap center to the center of each pipe sprite
    pub gap_half_height: f32,
    pub pipe_width: f32,
    pub pipe_height: f32,
    /// Background parallax speed, independent of the bird
    pub background_scroll_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            forward_speed: 3.0,
            gravity: 24.0,
            flap_impulse: 7.5,
            // 5.0 - 8.0 / 2 leaves a 2.0 unit opening
            gap_half_height: 5.0,
            pipe_width: 1.0,
            pipe_height: 8.0,
            background_scroll_speed: 0.5,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values the simulation cannot make sense of
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("forward_speed", self.forward_speed),
            ("gravity", self.gravity),
            ("flap_impulse", self.flap_impulse),
            ("pipe_width", self.pipe_width),
            ("pipe_height", self.pipe_height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }

        if !(self.background_scroll_speed.is_finite() && self.background_scroll_speed >= 0.0) {
            return Err(TuningError::OutOfRange {
                field: "background_scroll_speed",
                value: self.background_scroll_speed,
            });
        }

        let half_pipe = self.pipe_height / 2.0;
        if !(self.gap_half_height.is_finite() && self.opening_height() > 0.0) {
            return Err(TuningError::ClosedGap {
                gap_half_height: self.gap_half_height,
                half_pipe,
            });
        }

        Ok(())
    }

    /// Height of the passable opening between a pipe pair
    pub fn opening_height(&self) -> f32 {
        2.0 * self.gap_half_height - self.pipe_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert!((tuning.opening_height() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 30.0 }"#).unwrap();
        assert_eq!(tuning.gravity, 30.0);
        assert_eq!(tuning.forward_speed, Tuning::default().forward_speed);
    }

    #[test]
    fn test_rejects_negative_speed() {
        let err = Tuning::from_json(r#"{ "forward_speed": -1.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "forward_speed",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_closed_gap() {
        let err = Tuning::from_json(r#"{ "gap_half_height": 3.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::ClosedGap { .. }));
    }

    #[test]
    fn test_opening_must_be_positive() {
        // pipe_height 8 leaves no room at gap_half_height 4
        let touching = Tuning::from_json(r#"{ "gap_half_height": 4.0 }"#);
        assert!(matches!(touching, Err(TuningError::ClosedGap { .. })));

        let narrow = Tuning::from_json(r#"{ "gap_half_height": 4.25 }"#).unwrap();
        assert!((narrow.opening_height() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ gravity"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Tuning::load("/nonexistent/flappy-tuning.json"),
            Err(TuningError::Io(_))
        ));
    }
}
