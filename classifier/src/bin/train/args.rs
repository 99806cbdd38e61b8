use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use classifier::{ModelKind, OptimizerKind};
use controller::Mode;

/// Validation quantity the early-stopping controller watches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Monitor {
    /// Validation accuracy, higher is better.
    Accuracy,
    /// Validation loss, lower is better.
    Loss,
}

impl From<Monitor> for Mode {
    fn from(monitor: Monitor) -> Self {
        match monitor {
            Monitor::Accuracy => Mode::Maximize,
            Monitor::Loss => Mode::Minimize,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Classifier Trainer")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = "0.1.0")]
pub struct Args {
    /// CSV file with a header and `label,f0,f1,...` rows.
    #[arg(long)]
    pub data: PathBuf,

    /// Separate CSV for the final test evaluation. Without it the test set
    /// is carved out of `--data` using `--test-ratio`.
    #[arg(long)]
    pub test_data: Option<PathBuf>,

    /// Network architecture.
    #[arg(long, value_enum, default_value_t = ModelKind::Mlp)]
    pub model: ModelKind,

    /// Where the best checkpoint is kept. Defaults to
    /// `models/classifier_<model>.safetensors`.
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// Directory receiving one timestamped folder of scalars per run.
    #[arg(long, default_value = "runs")]
    pub runs_dir: PathBuf,

    /// Comma separated class names, indexed by label.
    #[arg(long, value_delimiter = ',')]
    pub class_names: Vec<String>,

    /// Number of classes. Defaults to the highest label seen plus one.
    #[arg(long)]
    pub num_classes: Option<usize>,

    /// Maximum number of training epochs.
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Consecutive epochs without improvement tolerated before stopping.
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Margin a new score must clear to count as an improvement.
    #[arg(long, default_value_t = 0.0)]
    pub tolerance: f64,

    /// Validation quantity to monitor.
    #[arg(long, value_enum, default_value_t = Monitor::Accuracy)]
    pub monitor: Monitor,

    /// Run on the CPU even when an accelerator is available.
    #[arg(long)]
    pub cpu: bool,

    /// Number of samples per training batch.
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Initial learning rate for the optimizer.
    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    /// Optimizer.
    #[arg(long, value_enum, default_value_t = OptimizerKind::Adamw)]
    pub optimizer: OptimizerKind,

    /// Learning rate decay factor per epoch.
    #[arg(long, default_value_t = 1.0)]
    pub lr_decay: f64,

    /// Fraction of the training data held out for validation.
    #[arg(long, default_value_t = 0.2)]
    pub val_ratio: f64,

    /// Fraction of the data held out for testing when no test file is given.
    #[arg(long, default_value_t = 0.2)]
    pub test_ratio: f64,

    /// Seed for splitting and shuffling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of threads for data parsing.
    #[arg(long, default_value_t = num_cpus::get())]
    pub workers: usize,
}

impl Args {
    pub fn model_path(&self) -> PathBuf {
        self.model_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!("models/classifier_{}.safetensors", self.model))
        })
    }
}
