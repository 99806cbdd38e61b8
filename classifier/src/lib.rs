pub mod checkpoint;
pub mod device;
pub mod evaluation;
pub mod model;
pub mod network;
pub mod optimizer;
pub mod samples;
pub mod training;

pub use checkpoint::SafetensorsCheckpoint;
pub use model::Model;
pub use network::ModelKind;
pub use optimizer::{Optim, OptimizerKind};
pub use samples::{split_indices, Samples, Split};
