use std::fmt;

use candle_core::{Result, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};
use clap::ValueEnum;

/// Width of the hidden layers of the multilayer perceptron.
pub const MLP_HIDDEN_SIZE: usize = 512;

/// Size of the embedding that the residual network projects inputs into.
pub const EMBEDDING_SIZE: usize = 256;

/// Size of the residual hidden layers.
pub const HIDDEN_SIZE: usize = 64;

/// Available architectures, selected once at setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModelKind {
    /// Single linear layer (softmax regression).
    Linear,
    /// Two hidden ReLU layers of 512 units.
    Mlp,
    /// Embedding followed by a residual hidden block.
    Residual,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Linear, ModelKind::Mlp, ModelKind::Residual];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Mlp => "mlp",
            ModelKind::Residual => "residual",
        }
    }

    pub fn build(self, vs: &VarBuilder, num_features: usize, num_classes: usize) -> Result<Network> {
        Ok(match self {
            ModelKind::Linear => {
                Network::Linear(linear(num_features, num_classes, vs.pp("output"))?)
            }
            ModelKind::Mlp => Network::Mlp(Mlp::new(vs, num_features, num_classes)?),
            ModelKind::Residual => {
                Network::Residual(Residual::new(vs, num_features, num_classes)?)
            }
        })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub enum Network {
    Linear(Linear),
    Mlp(Mlp),
    Residual(Residual),
}

impl Module for Network {
    #[inline]
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        match self {
            Network::Linear(layer) => layer.forward(x),
            Network::Mlp(net) => net.forward(x),
            Network::Residual(net) => net.forward(x),
        }
    }
}

pub struct Mlp {
    hidden1: Linear,
    hidden2: Linear,
    output: Linear,
}

impl Mlp {
    pub fn new(vs: &VarBuilder, num_features: usize, num_classes: usize) -> Result<Self> {
        Ok(Self {
            hidden1: linear(num_features, MLP_HIDDEN_SIZE, vs.pp("hidden1"))?,
            hidden2: linear(MLP_HIDDEN_SIZE, MLP_HIDDEN_SIZE, vs.pp("hidden2"))?,
            output: linear(MLP_HIDDEN_SIZE, num_classes, vs.pp("output"))?,
        })
    }
}

impl Module for Mlp {
    #[inline]
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let x = x.apply(&self.hidden1)?.relu()?;
        let x = x.apply(&self.hidden2)?.relu()?;
        x.apply(&self.output)
    }
}

pub struct Residual {
    embedding: Linear,
    hidden1: Linear,
    hidden2: Linear,
    output: Linear,
}

impl Residual {
    pub fn new(vs: &VarBuilder, num_features: usize, num_classes: usize) -> Result<Self> {
        Ok(Self {
            embedding: linear(num_features, EMBEDDING_SIZE, vs.pp("embedding"))?,
            hidden1: linear(EMBEDDING_SIZE, HIDDEN_SIZE, vs.pp("hidden1"))?,
            hidden2: linear(HIDDEN_SIZE, HIDDEN_SIZE, vs.pp("hidden2"))?,
            output: linear(HIDDEN_SIZE, num_classes, vs.pp("output"))?,
        })
    }
}

impl Module for Residual {
    #[inline]
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let x = x.apply(&self.embedding)?.relu()?;
        let h1 = x.apply(&self.hidden1)?.relu()?;
        let h2 = (h1.apply(&self.hidden2)? + &h1)?.relu()?;
        h2.apply(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_every_kind_produces_logits() -> Result<()> {
        for kind in ModelKind::ALL {
            let varmap = VarMap::new();
            let vs = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
            let net = kind.build(&vs, 12, 4)?;

            let x = Tensor::zeros((5, 12), DType::F32, &Device::Cpu)?;
            let logits = net.forward(&x)?;
            assert_eq!(logits.dims(), &[5, 4], "{}", kind);
            assert!(!varmap.all_vars().is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_kind_names_match_cli_values() {
        for kind in ModelKind::ALL {
            let parsed = ModelKind::from_str(kind.name(), true).unwrap();
            assert_eq!(parsed, kind);
        }
    }
}
