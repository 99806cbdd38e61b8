pub mod confusion;
pub mod report;

pub use confusion::ConfusionMatrix;
pub use report::{ClassificationReport, Summary};
