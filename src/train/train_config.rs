use std::sync::mpsc;
use crate::train::epoch_stats::EpochStats;

/// Number of full passes over the MNIST training set used by default.
pub const DEFAULT_EPOCHS: usize = 5;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`      — total number of full passes over the training data
/// - `progress_tx` — optional channel sender; one `EpochStats` is sent per
///                   completed epoch.  If the receiver is dropped the loop
///                   terminates early (clean shutdown).
pub struct TrainConfig {
    pub epochs: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            progress_tx: None,
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(DEFAULT_EPOCHS)
    }
}
