pub mod csv;
pub mod encode;

pub use csv::{parse_csv, read_csv};
pub use encode::{one_hot, scale_pixel};

/// One labeled example, already scaled and encoded for the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Class index in `[0, outputs)`.
    pub label: usize,
    /// Scaled pixel values, length `inputs`.
    pub input: Vec<f64>,
    /// One-hot target, length `outputs`.
    pub target: Vec<f64>,
}
