pub mod trainer;
pub mod epoch_stats;
pub mod evaluate;
pub mod train_config;
pub mod loop_fn;

pub use trainer::train_epoch;
pub use epoch_stats::EpochStats;
pub use evaluate::{argmax, evaluate, Evaluation};
pub use train_config::{TrainConfig, DEFAULT_EPOCHS};
pub use loop_fn::train_loop;
