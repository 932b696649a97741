use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::sigmoid::{activate, activated_derivative};
use crate::error::{NetError, Result};
use crate::loss::squared::SquaredError;
use crate::math::matrix::Matrix;
use crate::math::random::random_array;
use crate::network::spec::NetworkSpec;

/// Feed-forward network with exactly one hidden layer and sigmoid activations.
///
/// - `hidden_weights` is `hiddens x inputs`; entry (i, j) links input j to hidden unit i.
/// - `output_weights` is `outputs x hiddens`; entry (i, j) links hidden unit j to output i.
///
/// Both shapes are fixed at construction. Only `train` and `load_weights`
/// change entries, and both validate everything before writing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRecord")]
pub struct Network {
    inputs: usize,
    hiddens: usize,
    outputs: usize,
    learning_rate: f64,
    hidden_weights: Matrix,
    output_weights: Matrix,
}

/// On-disk form of a `Network`; shapes are re-checked when converting back.
#[derive(Deserialize)]
struct NetworkRecord {
    inputs: usize,
    hiddens: usize,
    outputs: usize,
    learning_rate: f64,
    hidden_weights: Matrix,
    output_weights: Matrix,
}

impl TryFrom<NetworkRecord> for Network {
    type Error = NetError;

    fn try_from(record: NetworkRecord) -> Result<Self> {
        let net = Network::from_weights(record.hidden_weights, record.output_weights, record.learning_rate)?;
        if (net.inputs, net.hiddens, net.outputs) != (record.inputs, record.hiddens, record.outputs) {
            return Err(NetError::Configuration(format!(
                "recorded sizes {}-{}-{} do not match weight shapes {}-{}-{}",
                record.inputs, record.hiddens, record.outputs, net.inputs, net.hiddens, net.outputs
            )));
        }
        Ok(net)
    }
}

/// Activations kept from one forward pass for the backward pass.
struct Activations {
    inputs: Matrix,
    hidden_outputs: Matrix,
    final_outputs: Matrix,
}

impl Network {
    /// Builds a network with weights drawn uniformly from `(-1/sqrt(fan_in), 1/sqrt(fan_in))`.
    ///
    /// Fails with `NetError::Configuration` if any size is zero or the
    /// learning rate is not a positive finite number.
    pub fn new<R: Rng + ?Sized>(
        inputs: usize,
        hiddens: usize,
        outputs: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Network> {
        Network::from_spec(&NetworkSpec::new(inputs, hiddens, outputs, learning_rate), rng)
    }

    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;

        let hidden_weights = Matrix::new(
            spec.hiddens,
            spec.inputs,
            random_array(rng, spec.hiddens * spec.inputs, spec.inputs as f64),
        )?;
        let output_weights = Matrix::new(
            spec.outputs,
            spec.hiddens,
            random_array(rng, spec.outputs * spec.hiddens, spec.hiddens as f64),
        )?;

        Ok(Network {
            inputs: spec.inputs,
            hiddens: spec.hiddens,
            outputs: spec.outputs,
            learning_rate: spec.learning_rate,
            hidden_weights,
            output_weights,
        })
    }

    /// Builds a network around explicit weight matrices.
    ///
    /// Layer sizes are read off the shapes; `output_weights.cols()` must equal
    /// `hidden_weights.rows()`.
    pub fn from_weights(hidden_weights: Matrix, output_weights: Matrix, learning_rate: f64) -> Result<Network> {
        let spec = NetworkSpec::new(
            hidden_weights.cols(),
            hidden_weights.rows(),
            output_weights.rows(),
            learning_rate,
        );
        spec.validate()?;
        if output_weights.cols() != hidden_weights.rows() {
            return Err(NetError::DimensionMismatch {
                op: "from_weights",
                left: hidden_weights.shape(),
                right: output_weights.shape(),
            });
        }

        Ok(Network {
            inputs: spec.inputs,
            hiddens: spec.hiddens,
            outputs: spec.outputs,
            learning_rate,
            hidden_weights,
            output_weights,
        })
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn hiddens(&self) -> usize {
        self.hiddens
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn hidden_weights(&self) -> &Matrix {
        &self.hidden_weights
    }

    pub fn output_weights(&self) -> &Matrix {
        &self.output_weights
    }

    pub fn spec(&self) -> NetworkSpec {
        NetworkSpec::new(self.inputs, self.hiddens, self.outputs, self.learning_rate)
    }

    /// Forward pass. Returns the `outputs x 1` column of per-class activations,
    /// each strictly inside (0, 1) for finite input.
    pub fn predict(&self, input: &[f64]) -> Result<Matrix> {
        self.check_len("input", input, self.inputs)?;
        Ok(self.forward(input)?.final_outputs)
    }

    /// Index of the strongest output for `input`.
    pub fn classify(&self, input: &[f64]) -> Result<usize> {
        let outputs = self.predict(input)?;
        Ok(crate::train::argmax(outputs.as_slice()))
    }

    /// One step of gradient descent on the squared error for a single sample.
    pub fn train(&mut self, input: &[f64], target: &[f64]) -> Result<()> {
        self.train_with_error(input, target).map(|_| ())
    }

    /// Same as `train`, returning the squared error of the outputs seen
    /// before the update.
    ///
    /// Both weight deltas are computed in full before either matrix is
    /// touched, so any error leaves the network unchanged.
    pub fn train_with_error(&mut self, input: &[f64], target: &[f64]) -> Result<f64> {
        self.check_len("input", input, self.inputs)?;
        self.check_len("target", target, self.outputs)?;

        let Activations { inputs, hidden_outputs, final_outputs } = self.forward(input)?;

        // Errors
        let targets = Matrix::column(target);
        let output_errors = targets.subtract(&final_outputs)?;
        let hidden_errors = self.output_weights.transpose().dot(&output_errors)?;

        // Deltas: lr * ((error ⊙ y(1-y)) · previous_activationsᵀ)
        let output_delta = output_errors
            .multiply(&activated_derivative(&final_outputs))?
            .dot(&hidden_outputs.transpose())?
            .scale(self.learning_rate);
        let hidden_delta = hidden_errors
            .multiply(&activated_derivative(&hidden_outputs))?
            .dot(&inputs.transpose())?
            .scale(self.learning_rate);

        if output_delta.shape() != self.output_weights.shape() || hidden_delta.shape() != self.hidden_weights.shape() {
            return Err(NetError::DimensionMismatch {
                op: "train",
                left: output_delta.shape(),
                right: hidden_delta.shape(),
            });
        }

        self.output_weights.add_assign(&output_delta)?;
        self.hidden_weights.add_assign(&hidden_delta)?;

        Ok(SquaredError::loss(final_outputs.as_slice(), target))
    }

    /// Replaces both weight matrices, e.g. with values read back from disk.
    ///
    /// The new matrices must have exactly the current shapes; otherwise
    /// nothing is replaced.
    pub fn load_weights(&mut self, hidden_weights: Matrix, output_weights: Matrix) -> Result<()> {
        if hidden_weights.shape() != self.hidden_weights.shape() {
            return Err(NetError::DimensionMismatch {
                op: "load_weights (hidden)",
                left: self.hidden_weights.shape(),
                right: hidden_weights.shape(),
            });
        }
        if output_weights.shape() != self.output_weights.shape() {
            return Err(NetError::DimensionMismatch {
                op: "load_weights (output)",
                left: self.output_weights.shape(),
                right: output_weights.shape(),
            });
        }
        self.hidden_weights = hidden_weights;
        self.output_weights = output_weights;
        Ok(())
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads a saved network and copies its weights into `self`.
    /// The saved file must describe the same layer sizes.
    pub fn restore_weights(&mut self, path: &str) -> Result<()> {
        let saved = Network::load_json(path)?;
        self.load_weights(saved.hidden_weights, saved.output_weights)
    }

    fn forward(&self, input: &[f64]) -> Result<Activations> {
        let inputs = Matrix::column(input);
        let hidden_outputs = activate(&self.hidden_weights.dot(&inputs)?);
        let final_outputs = activate(&self.output_weights.dot(&hidden_outputs)?);
        Ok(Activations { inputs, hidden_outputs, final_outputs })
    }

    fn check_len(&self, what: &'static str, values: &[f64], expected: usize) -> Result<()> {
        if values.len() != expected {
            return Err(NetError::InputShape { what, expected, actual: values.len() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const INPUT: [f64; 4] = [0.1, 0.2, 0.3, 0.4];
    const TARGET: [f64; 2] = [0.99, 0.01];

    fn small_network() -> Network {
        let hidden = Matrix::from_rows(vec![
            vec![0.1, -0.2, 0.3, -0.4],
            vec![0.5, 0.6, -0.7, 0.8],
            vec![-0.9, 0.1, 0.2, 0.3],
        ])
        .unwrap();
        let output = Matrix::from_rows(vec![
            vec![0.2, -0.3, 0.4],
            vec![-0.5, 0.6, 0.1],
        ])
        .unwrap();
        Network::from_weights(hidden, output, 0.1).unwrap()
    }

    fn assert_close(actual: &Matrix, expected: &[&[f64]]) {
        assert_eq!(actual.rows(), expected.len());
        for (i, row) in expected.iter().enumerate() {
            for (j, &e) in row.iter().enumerate() {
                let a = actual.get(i, j);
                assert!((a - e).abs() < 1e-12, "entry ({i}, {j}): {a} != {e}");
            }
        }
    }

    #[test]
    fn new_builds_expected_shapes() {
        let mut rng = StdRng::seed_from_u64(3);
        let net = Network::new(784, 200, 10, 0.1, &mut rng).unwrap();
        assert_eq!(net.hidden_weights().shape(), (200, 784));
        assert_eq!(net.output_weights().shape(), (10, 200));
        let hb = 1.0 / 784f64.sqrt();
        let ob = 1.0 / 200f64.sqrt();
        assert!(net.hidden_weights().as_slice().iter().all(|w| w.abs() < hb));
        assert!(net.output_weights().as_slice().iter().all(|w| w.abs() < ob));
    }

    #[test]
    fn new_rejects_bad_configuration() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(Network::new(0, 3, 2, 0.1, &mut rng), Err(NetError::Configuration(_))));
        assert!(matches!(Network::new(4, 3, 2, 0.0, &mut rng), Err(NetError::Configuration(_))));
    }

    #[test]
    fn from_weights_rejects_unchained_shapes() {
        let err = Network::from_weights(Matrix::zeros(3, 4), Matrix::zeros(2, 5), 0.1).unwrap_err();
        assert!(matches!(err, NetError::DimensionMismatch { .. }));
    }

    #[test]
    fn predict_matches_hand_computed_forward_pass() {
        let out = small_network().predict(&INPUT).unwrap();
        assert_eq!(out.shape(), (2, 1));
        assert_close(&out, &[&[0.5337309928175172], &[0.5391607694602022]]);
    }

    #[test]
    fn one_training_step_matches_golden_weights() {
        let mut net = small_network();
        let loss = net.train_with_error(&INPUT, &TARGET).unwrap();
        assert!((loss - 0.4881925268510018).abs() < 1e-12);

        assert_close(
            net.output_weights(),
            &[
                &[0.20539377193205735, -0.29353290981001706, 0.40598934875087256],
                &[-0.5062455113902222, 0.592511680888271, 0.09306486326919652],
            ],
        );
        assert_close(
            net.hidden_weights(),
            &[
                &[0.10088736520311486, -0.1982252695937703, 0.3026620956093446, -0.3964505391875406],
                &[0.4988860338473996, 0.5977720676947992, -0.7033418984578012, 0.7955441353895983],
                &[-0.8996769992480742, 0.10064600150385164, 0.20096900225577746, 0.30129200300770326],
            ],
        );
    }

    #[test]
    fn train_rejects_bad_lengths_without_touching_weights() {
        let mut net = small_network();
        let before = net.clone();

        let err = net.train(&[0.1; 10], &TARGET).unwrap_err();
        assert!(matches!(err, NetError::InputShape { what: "input", expected: 4, actual: 10 }));

        let err = net.train(&INPUT, &[0.99, 0.01, 0.01]).unwrap_err();
        assert!(matches!(err, NetError::InputShape { what: "target", expected: 2, actual: 3 }));

        assert_eq!(net, before);
    }

    #[test]
    fn predict_rejects_bad_length() {
        let err = small_network().predict(&[0.5; 3]).unwrap_err();
        assert!(matches!(err, NetError::InputShape { what: "input", expected: 4, actual: 3 }));
    }

    #[test]
    fn load_weights_checks_shapes() {
        let mut net = small_network();
        let before = net.clone();
        assert!(net.load_weights(Matrix::zeros(3, 4), Matrix::zeros(3, 2)).is_err());
        assert!(net.load_weights(Matrix::zeros(4, 3), Matrix::zeros(2, 3)).is_err());
        assert_eq!(net, before);

        net.load_weights(Matrix::zeros(3, 4), Matrix::zeros(2, 3)).unwrap();
        assert!(net.hidden_weights().as_slice().iter().all(|&w| w == 0.0));
        // All-zero weights give 0.5 everywhere.
        assert_eq!(net.predict(&INPUT).unwrap().column_values(), vec![0.5, 0.5]);
    }

    #[test]
    fn classify_picks_strongest_output() {
        // Output row 0 is strongly positive, row 1 strongly negative.
        let hidden = Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap();
        let output = Matrix::from_rows(vec![vec![5.0], vec![-5.0]]).unwrap();
        let net = Network::from_weights(hidden, output, 0.1).unwrap();
        assert_eq!(net.classify(&[0.5, 0.5]).unwrap(), 0);
    }

    #[test]
    fn deserialize_rejects_mismatched_sizes() {
        let net = small_network();
        let mut value = serde_json::to_value(&net).unwrap();
        value["hiddens"] = serde_json::json!(5);
        assert!(serde_json::from_value::<Network>(value).is_err());
    }
}
