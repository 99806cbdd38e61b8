mod args;
mod data;
mod scalars;

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use args::Args;
use clap::Parser;
use classifier::device::select_device;
use classifier::evaluation::{confusion_matrix, evaluate, write_evaluation};
use classifier::training::{Trainer, Validator};
use classifier::{Model, Optim, SafetensorsCheckpoint};
use controller::{Controller, LogReporter, Mode, RunConfig};
use data::Dataset;
use log::LevelFilter;
use metrics::ClassificationReport;
use scalars::ScalarLog;
use simplelog::{Config, SimpleLogger};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers.max(1))
        .build_global()?;

    let dataset = Dataset::load(&args)?;
    let num_classes = class_count(args.num_classes, dataset.num_classes())?;
    let num_features = dataset.samples.num_features();

    let device = select_device(args.cpu)?;
    log::info!(
        "Creating {} network ({} features, {} classes)",
        args.model,
        num_features,
        num_classes
    );
    let mut model = Model::new(args.model, num_features, num_classes, &device)?;

    let optimizer = Optim::new(args.optimizer, model.vars(), args.learning_rate)?;
    let trainer = Trainer::new(
        &dataset.samples,
        dataset.split.train.clone(),
        optimizer,
        args.batch_size,
        args.seed,
    )
    .with_lr_decay(args.lr_decay);
    let validator = Validator::new(&dataset.samples, dataset.split.val.clone(), args.batch_size);

    let model_path = args.model_path();
    let mut store = SafetensorsCheckpoint::new(&model_path)?;

    let mode = Mode::from(args.monitor);
    let config = RunConfig::new(args.epochs, args.patience, args.tolerance, mode);
    let mut controller = Controller::new(config)?
        .observe(LogReporter::with_slot(model_path.display().to_string()))
        .observe(ScalarLog::create(&args.runs_dir)?);

    log::info!("Training network");
    let summary = controller.run(&mut model, trainer, validator, &mut store)?;

    let run = controller.into_state();
    log::info!("{}", run.history().summary(mode));

    match summary.best_epoch {
        Some(epoch) => {
            log::info!("Best epoch was {}", epoch + 1);
            store.restore(&mut model)?;
        }
        None => log::warn!("No epoch improved, evaluating the final parameters"),
    }
    test_model(&model, &dataset, &args, &model_path)?;

    log::info!("Done!");
    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();
    SimpleLogger::init(LevelFilter::Info, Config::default())?;

    Ok(args)
}

/// Number of output classes, which has to cover every label in the data.
fn class_count(requested: Option<usize>, seen: usize) -> Result<usize, Box<dyn Error>> {
    match requested {
        Some(n) if n < seen => Err(format!(
            "--num-classes {} is too small, the data has labels up to {}",
            n,
            seen - 1
        )
        .into()),
        Some(n) => Ok(n),
        None => Ok(seen),
    }
}

fn test_model(
    model: &Model,
    dataset: &Dataset,
    args: &Args,
    model_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let (samples, indices) = dataset.test_set();
    if indices.is_empty() {
        log::warn!("No test samples, skipping final evaluation");
        return Ok(());
    }

    log::info!("Running final test set evaluation on {} samples", indices.len());
    let metrics = evaluate(model, samples, &indices, args.batch_size)?;
    log::info!(
        "Test loss: {:.5}, test accuracy: {:.2}%",
        metrics.loss,
        metrics.metric * 100.0
    );

    let matrix = confusion_matrix(model, samples, &indices, args.batch_size)?;
    log::info!(
        "\n{}",
        ClassificationReport::new(&matrix, &args.class_names)
    );

    write_evaluation(
        model_path.with_extension("evaluation.txt"),
        &matrix,
        &args.class_names,
    )?;

    let csv_path = model_path.with_extension("confusion.csv");
    let mut writer = BufWriter::new(File::create(&csv_path)?);
    matrix.write_csv(&mut writer, &args.class_names)?;
    log::info!("Confusion matrix written to {}", csv_path.display());

    Ok(())
}
