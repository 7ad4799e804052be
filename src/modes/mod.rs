pub mod evaluate;
pub mod train;

pub use evaluate::EvaluateMode;
pub use train::{TrainConfig, TrainMode, scheduled_epsilon};
