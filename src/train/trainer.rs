use crate::{
    data::Sample,
    error::Result,
    network::network::Network,
};

/// Runs one pass over `samples` in order, one `train` call per sample.
///
/// Returns the mean squared error seen before each update. A failing sample
/// aborts the pass; samples before it stay applied.
pub fn train_epoch(network: &mut Network, samples: &[Sample]) -> Result<f64> {
    let mut total_error = 0.0;

    for sample in samples {
        total_error += network.train_with_error(&sample.input, &sample.target)?;
    }

    Ok(total_error / samples.len().max(1) as f64)
}
