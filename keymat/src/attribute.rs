//! Continuous attribute metadata
//!
//! Tracks the observed range of a continuous feature while instances are
//! ingested. Observation is thread-safe; readers see the extrema of every
//! observation that completed before the read.

use std::sync::Mutex;

/// Named min/max accumulator for a continuous attribute
#[derive(Debug)]
pub struct RangeAttribute {
    name: String,
    bounds: Mutex<Bounds>,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    minimum: f32,
    maximum: f32,
}

impl RangeAttribute {
    /// New accumulator with an empty observed range
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Mutex::new(Bounds {
                minimum: f32::INFINITY,
                maximum: f32::NEG_INFINITY,
            }),
        }
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fold one observation into the running extrema, returning the value
    pub fn observe(&self, value: f32) -> f32 {
        let mut bounds = self.bounds.lock().expect("attribute bounds poisoned");
        if value > bounds.maximum {
            bounds.maximum = value;
        }
        if value < bounds.minimum {
            bounds.minimum = value;
        }
        value
    }

    /// Largest observed value, `-inf` before any observation
    pub fn maximum(&self) -> f32 {
        self.bounds.lock().expect("attribute bounds poisoned").maximum
    }

    /// Smallest observed value, `+inf` before any observation
    pub fn minimum(&self) -> f32 {
        self.bounds.lock().expect("attribute bounds poisoned").minimum
    }
}
