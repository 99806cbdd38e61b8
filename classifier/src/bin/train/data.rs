use std::error::Error;

use classifier::{split_indices, Samples, Split};

use crate::args::Args;

/// Training data with its split, plus an optional separate test file.
pub struct Dataset {
    pub samples: Samples,
    pub split: Split,
    test_samples: Option<Samples>,
}

impl Dataset {
    pub fn load(args: &Args) -> Result<Self, Box<dyn Error>> {
        let samples = Samples::load(&args.data)?;
        samples.log_statistics(&args.class_names);

        let test_samples = args.test_data.as_ref().map(Samples::load).transpose()?;
        if let Some(test) = &test_samples {
            if test.num_features() != samples.num_features() {
                return Err(format!(
                    "test data has {} features, training data has {}",
                    test.num_features(),
                    samples.num_features()
                )
                .into());
            }
        }

        let test_ratio = if test_samples.is_some() {
            0.0
        } else {
            args.test_ratio
        };
        let split = split_indices(samples.len(), args.val_ratio, test_ratio, args.seed);

        if split.train.is_empty() || split.val.is_empty() {
            return Err("not enough samples for a training and a validation set".into());
        }

        Ok(Self {
            samples,
            split,
            test_samples,
        })
    }

    pub fn num_classes(&self) -> usize {
        let test = self.test_samples.as_ref().map_or(0, Samples::num_classes);
        self.samples.num_classes().max(test)
    }

    /// The samples and row indices used for the final evaluation.
    pub fn test_set(&self) -> (&Samples, Vec<usize>) {
        match &self.test_samples {
            Some(test) => (test, (0..test.len()).collect()),
            None => (&self.samples, self.split.test.clone()),
        }
    }
}
