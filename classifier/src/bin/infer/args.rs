use std::path::PathBuf;

use clap::Parser;
use classifier::ModelKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "Classifier Inference")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = "0.1.0")]
pub struct Args {
    /// CSV file with a header and `label,f0,f1,...` rows.
    #[arg(long)]
    pub data: PathBuf,

    /// Network architecture the checkpoint was trained with.
    #[arg(long, value_enum, default_value_t = ModelKind::Mlp)]
    pub model: ModelKind,

    /// Checkpoint to load. Defaults to `models/classifier_<model>.safetensors`.
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// Number of classes the checkpoint predicts. Defaults to the highest
    /// label in `--data` plus one.
    #[arg(long)]
    pub num_classes: Option<usize>,

    /// Comma separated class names, indexed by label.
    #[arg(long, value_delimiter = ',')]
    pub class_names: Vec<String>,

    /// Run on the CPU even when an accelerator is available.
    #[arg(long)]
    pub cpu: bool,

    /// Number of samples per batch.
    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    /// Number of random samples to show predictions for.
    #[arg(long, default_value_t = 9)]
    pub show: usize,

    /// Seed for picking the shown samples.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl Args {
    pub fn model_path(&self) -> PathBuf {
        self.model_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!("models/classifier_{}.safetensors", self.model))
        })
    }
}
