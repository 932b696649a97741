use std::time::Instant;

use tracing::{info, warn};

use crate::data::Sample;
use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;
use crate::train::trainer::train_epoch;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns the statistics of
/// every completed epoch.
///
/// Each epoch walks `samples` in order and applies one gradient step per
/// sample; there is no shuffling and no batching.
///
/// # Early termination
/// The loop stops between epochs if the `progress_tx` receiver has been dropped.
///
/// # Errors
/// `NetError::Dataset` if `samples` is empty; any error from `Network::train`
/// (e.g. a sample of the wrong length) aborts the run.
pub fn train_loop(
    network: &mut Network,
    samples: &[Sample],
    config: &TrainConfig,
) -> Result<Vec<EpochStats>> {
    if samples.is_empty() {
        return Err(NetError::Dataset {
            row: 0,
            reason: "training set contains no samples".into(),
        });
    }

    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let mean_squared_error = train_epoch(network, samples)?;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            mean_squared_error,
            samples: samples.len(),
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        info!(
            epoch,
            total = config.epochs,
            mse = stats.mean_squared_error,
            elapsed_ms = stats.elapsed_ms,
            "epoch finished"
        );
        history.push(stats.clone());

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                warn!(epoch, "progress receiver dropped, ending training early");
                break;
            }
        }
    }

    Ok(history)
}
