mod progress;
mod trainer;
mod validator;

pub use progress::TrainingProgressBar;
pub use trainer::Trainer;
pub use validator::Validator;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::SafetensorsCheckpoint;
    use crate::evaluation::evaluate;
    use crate::model::Model;
    use crate::network::ModelKind;
    use crate::optimizer::{Optim, OptimizerKind};
    use crate::samples::{split_indices, Samples};
    use candle_core::Device;
    use controller::{Controller, EpochTrainer, Mode, RunConfig};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Two gaussian blobs in four dimensions, one per class.
    fn blobs(n: usize, seed: u64) -> Samples {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut features = Vec::with_capacity(n * 4);
        let mut labels = Vec::with_capacity(n);

        for i in 0..n {
            let label = (i % 2) as u32;
            let center = if label == 0 { -1.0 } else { 1.0 };
            for _ in 0..4 {
                features.push(center + rng.gen_range(-0.5f32..0.5));
            }
            labels.push(label);
        }

        Samples::new(features, labels, 4).unwrap()
    }

    #[test]
    fn test_best_checkpoint_matches_best_epoch() {
        let samples = blobs(200, 3);
        let split = split_indices(samples.len(), 0.25, 0.0, 11);
        let dir = tempfile::tempdir().unwrap();

        let mut model = Model::new(ModelKind::Linear, 4, 2, &Device::Cpu).unwrap();
        let optim = Optim::new(OptimizerKind::Sgd, model.vars(), 0.5).unwrap();
        let mut trainer = Trainer::new(&samples, split.train.clone(), optim, 16, 5)
            .with_lr_decay(0.9)
            .with_progress(false);
        let validator = Validator::new(&samples, split.val.clone(), 32);
        let mut store = SafetensorsCheckpoint::new(dir.path().join("best.safetensors")).unwrap();

        let config = RunConfig::new(8, 2, 0.0, Mode::Maximize);
        let mut controller = Controller::new(config).unwrap();
        let summary = controller
            .run(&mut model, &mut trainer, validator, &mut store)
            .unwrap();

        let run = controller.state();
        let best_epoch = summary.best_epoch.unwrap();
        let best = run.history().get(best_epoch).unwrap().validation;
        assert_eq!(summary.best_score, best.metric);
        assert!(best.metric > 0.9, "separable blobs reached {}", best.metric);
        assert!(trainer.learning_rate() < 0.5);

        let mut restored = Model::new(ModelKind::Linear, 4, 2, &Device::Cpu).unwrap();
        store.restore(&mut restored).unwrap();
        let again = evaluate(&restored, &samples, &split.val, 32).unwrap();
        assert!((again.metric - best.metric).abs() < 1e-9);
        assert!((again.loss - best.loss).abs() < 1e-5);
    }

    #[test]
    fn test_minimize_loss_with_adamw() {
        let samples = blobs(120, 9);
        let split = split_indices(samples.len(), 0.25, 0.0, 1);
        let dir = tempfile::tempdir().unwrap();

        let mut model = Model::new(ModelKind::Mlp, 4, 2, &Device::Cpu).unwrap();
        let optim = Optim::new(OptimizerKind::Adamw, model.vars(), 0.01).unwrap();
        let trainer = Trainer::new(&samples, split.train, optim, 16, 2).with_progress(false);
        let validator = Validator::new(&samples, split.val, 32);
        let store = SafetensorsCheckpoint::new(dir.path().join("best.safetensors")).unwrap();

        let config = RunConfig::new(4, 1, 0.0, Mode::Minimize);
        let mut controller = Controller::new(config).unwrap();
        let summary = controller.run(&mut model, trainer, validator, store).unwrap();

        let history = controller.state().history();
        assert!(summary.epochs >= 1 && summary.epochs <= 4);
        assert_eq!(history.len(), summary.epochs);
        let lowest = history
            .iter()
            .map(|r| r.validation.loss)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(summary.best_score, lowest);
    }

    #[test]
    fn test_trainer_without_samples_fails() {
        let samples = blobs(10, 1);
        let mut model = Model::new(ModelKind::Linear, 4, 2, &Device::Cpu).unwrap();
        let optim = Optim::new(OptimizerKind::Sgd, model.vars(), 0.1).unwrap();
        let mut trainer = Trainer::new(&samples, vec![], optim, 4, 0).with_progress(false);
        assert!(trainer.train_epoch(&mut model, 0).is_err());
    }
}
