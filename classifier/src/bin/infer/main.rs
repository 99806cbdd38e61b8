mod args;

use std::error::Error;

use args::Args;
use clap::Parser;
use classifier::device::select_device;
use classifier::evaluation::{class_name, confusion_matrix};
use classifier::{Model, Samples};
use log::LevelFilter;
use metrics::{ClassificationReport, Summary};
use rand::{rngs::StdRng, seq::index::sample, SeedableRng};
use simplelog::{Config, SimpleLogger};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let samples = Samples::load(&args.data)?;
    let num_classes = args.num_classes.unwrap_or_else(|| samples.num_classes());

    let device = select_device(args.cpu)?;
    let model_path = args.model_path();
    log::info!("Loading {} model from {}", args.model, model_path.display());
    let model = Model::load(
        args.model,
        samples.num_features(),
        num_classes,
        &device,
        &model_path,
    )?;

    let indices: Vec<usize> = (0..samples.len()).collect();
    let matrix = confusion_matrix(&model, &samples, &indices, args.batch_size)?;
    log::info!("{}", Summary::new(&matrix));
    log::info!(
        "\n{}",
        ClassificationReport::new(&matrix, &args.class_names)
    );

    show_predictions(&model, &samples, &args)?;

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();
    SimpleLogger::init(LevelFilter::Info, Config::default())?;

    Ok(args)
}

fn show_predictions(model: &Model, samples: &Samples, args: &Args) -> Result<(), Box<dyn Error>> {
    let amount = args.show.min(samples.len());
    if amount == 0 {
        return Ok(());
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let picked = sample(&mut rng, samples.len(), amount).into_vec();

    let (x, y) = samples.batch(&picked, model.device())?;
    let predicted = model.predict(&x)?;
    let actual = y.to_vec1::<u32>()?;

    for ((index, p), a) in picked.iter().zip(predicted).zip(actual) {
        let marker = if p == a { "ok" } else { "MISS" };
        log::info!(
            "Sample {:>6}: predicted {:<12} actual {:<12} {}",
            index,
            class_name(&args.class_names, p as usize),
            class_name(&args.class_names, a as usize),
            marker
        );
    }

    Ok(())
}
