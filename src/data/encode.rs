//! Conversions from raw MNIST values into what the network trains on.
//!
//! Neither inputs nor targets ever reach exactly 0 or 1: a zero input would
//! block learning on its weights, and a 0/1 target would push the sigmoid
//! into saturation where its derivative vanishes.

use crate::error::{NetError, Result};

/// Largest raw pixel intensity.
pub const MAX_PIXEL: f64 = 255.0;
/// Target value for the wrong classes.
pub const TARGET_OFF: f64 = 0.01;
/// Target value for the correct class.
pub const TARGET_ON: f64 = 0.99;

/// Maps a raw pixel in [0, 255] to [0.01, 1.0].
pub fn scale_pixel(value: f64) -> f64 {
    (value / MAX_PIXEL * 0.99) + 0.01
}

/// One-hot target of length `classes` with 0.99 at `label` and 0.01 elsewhere.
pub fn one_hot(label: usize, classes: usize) -> Result<Vec<f64>> {
    if label >= classes {
        return Err(NetError::Configuration(format!(
            "label {label} out of range for {classes} classes"
        )));
    }
    let mut target = vec![TARGET_OFF; classes];
    target[label] = TARGET_ON;
    Ok(target)
}
