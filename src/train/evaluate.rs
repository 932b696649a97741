use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::data::Sample;
use crate::error::Result;
use crate::network::network::Network;

/// Outcome of running a network over a labeled test set.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Samples checked.
    pub tests: usize,
    /// Samples whose predicted class matched the label.
    pub score: usize,
    pub elapsed: Duration,
}

impl Evaluation {
    /// Fraction of correct predictions in [0, 1]; 0 for an empty test set.
    pub fn accuracy(&self) -> f64 {
        if self.tests == 0 {
            return 0.0;
        }
        self.score as f64 / self.tests as f64
    }
}

/// Classifies every sample and counts how many match their label.
pub fn evaluate(network: &Network, samples: &[Sample]) -> Result<Evaluation> {
    let t_start = Instant::now();
    let mut score = 0;

    for sample in samples {
        if network.classify(&sample.input)? == sample.label {
            score += 1;
        }
    }

    let evaluation = Evaluation {
        tests: samples.len(),
        score,
        elapsed: t_start.elapsed(),
    };
    debug!(tests = evaluation.tests, score = evaluation.score, "evaluation finished");
    Ok(evaluation)
}

/// Index of the maximum element in a slice.
///
/// Ties resolve to the lowest index; an empty slice gives 0.
pub fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x > v[best] {
            best = i;
        }
    }
    best
}
