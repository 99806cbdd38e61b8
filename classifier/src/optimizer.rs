use std::fmt;

use candle_core::{Result, Tensor, Var};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, SGD};
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OptimizerKind {
    Sgd,
    Adamw,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Sgd => f.write_str("sgd"),
            OptimizerKind::Adamw => f.write_str("adamw"),
        }
    }
}

/// The optimizers a trainer can be configured with.
pub enum Optim {
    Sgd(SGD),
    AdamW(AdamW),
}

impl Optim {
    pub fn new(kind: OptimizerKind, vars: Vec<Var>, learning_rate: f64) -> Result<Self> {
        Ok(match kind {
            OptimizerKind::Sgd => Optim::Sgd(SGD::new(vars, learning_rate)?),
            OptimizerKind::Adamw => Optim::AdamW(AdamW::new(
                vars,
                ParamsAdamW {
                    lr: learning_rate,
                    ..Default::default()
                },
            )?),
        })
    }

    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Optim::Sgd(opt) => opt.backward_step(loss),
            Optim::AdamW(opt) => opt.backward_step(loss),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        match self {
            Optim::Sgd(opt) => opt.learning_rate(),
            Optim::AdamW(opt) => opt.learning_rate(),
        }
    }

    pub fn set_learning_rate(&mut self, lr: f64) {
        match self {
            Optim::Sgd(opt) => opt.set_learning_rate(lr),
            Optim::AdamW(opt) => opt.set_learning_rate(lr),
        }
    }

    /// Multiplies the learning rate by `factor`. A factor of 1 or more is ignored.
    pub fn decay(&mut self, factor: f64) {
        if factor < 1.0 {
            let lr = self.learning_rate() * factor;
            self.set_learning_rate(lr);
        }
    }
}
