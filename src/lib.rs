pub mod error;
pub mod math;
pub mod activation;
pub mod loss;
pub mod network;
pub mod data;
pub mod train;

// Convenience re-exports
pub use error::{NetError, Result};
pub use math::matrix::Matrix;
pub use activation::sigmoid::{sigmoid, sigmoid_prime};
pub use network::network::Network;
pub use network::spec::NetworkSpec;
pub use data::Sample;
pub use loss::squared::SquaredError;
pub use train::{evaluate, train_loop, EpochStats, Evaluation, TrainConfig};
