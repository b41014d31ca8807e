// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Structural position tracking for error messages.

use std::fmt;

use crate::error::{GpError, Result};

/// Structural unit a scope can mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Track,
    Measure,
    Voice,
    Beat,
}

/// 1-based position of the unit currently being decoded or encoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub track: Option<usize>,
    pub measure: Option<usize>,
    pub voice: Option<usize>,
    pub beat: Option<usize>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.track.is_none() && self.measure.is_none() && self.voice.is_none() && self.beat.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set(&mut self, unit: Unit, number: Option<usize>) {
        let slot = match unit {
            Unit::Track => &mut self.track,
            Unit::Measure => &mut self.measure,
            Unit::Voice => &mut self.voice,
            Unit::Beat => &mut self.beat,
        };
        *slot = number;
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            ("track", self.track),
            ("measure", self.measure),
            ("voice", self.voice),
            ("beat", self.beat),
        ];
        let mut first = true;
        for (name, number) in parts {
            if let Some(number) = number {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{name} {number}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A codec endpoint that carries a [`Location`].
///
/// Scopes nest: a beat scope inside a measure scope reports both numbers.
pub trait Located: Sized {
    /// Verb used in localized error messages
    const ACTION: &'static str;

    fn location(&self) -> &Location;
    fn location_mut(&mut self) -> &mut Location;

    /// Run `f` with one location component set.
    ///
    /// A failure is wrapped while the component is still set, so the
    /// innermost scope produces the message. The component is cleared on
    /// exit either way.
    fn scoped<T>(&mut self, unit: Unit, number: usize, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.location_mut().set(unit, Some(number));
        let result = f(self).map_err(|error| self.localize(error));
        self.location_mut().set(unit, None);
        result
    }

    /// Wrap an error with the current location, if any is set
    fn localize(&self, error: GpError) -> GpError {
        let location = self.location();
        if location.is_empty() || matches!(error, GpError::LocalizedDecode { .. }) {
            return error;
        }
        GpError::LocalizedDecode {
            action: Self::ACTION,
            location: location.to_string(),
            kind: error.kind(),
            source: Box::new(error),
        }
    }

    /// Run `f` with a fresh location, clearing it again afterwards
    fn annotate_errors<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.location_mut().clear();
        let result = f(self);
        self.location_mut().clear();
        result
    }
}
