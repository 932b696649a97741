use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};

/// Architecture and learning rate of a network.
///
/// Fields:
/// - `inputs`        — number of input units (784 for 28×28 MNIST images)
/// - `hiddens`       — number of hidden sigmoid units
/// - `outputs`       — number of output units, one per class
/// - `learning_rate` — step size of every weight update
///
/// A `NetworkSpec` can be saved to / loaded from JSON on its own, so a run's
/// configuration can live next to the trained weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub inputs: usize,
    pub hiddens: usize,
    pub outputs: usize,
    pub learning_rate: f64,
}

impl Default for NetworkSpec {
    /// 784 inputs (28×28 pixels), 200 hidden units, 10 digits, rate 0.1.
    fn default() -> Self {
        NetworkSpec {
            inputs: 784,
            hiddens: 200,
            outputs: 10,
            learning_rate: 0.1,
        }
    }
}

impl NetworkSpec {
    pub fn new(inputs: usize, hiddens: usize, outputs: usize, learning_rate: f64) -> Self {
        NetworkSpec { inputs, hiddens, outputs, learning_rate }
    }

    /// Rejects zero layer sizes and a learning rate that is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [("inputs", self.inputs), ("hiddens", self.hiddens), ("outputs", self.outputs)] {
            if size == 0 {
                return Err(NetError::Configuration(format!("{name} must be positive, got 0")));
            }
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NetError::Configuration(format!(
                "learning rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
