use std::path::Path;

use candle_core::{DType, Device, Result, Tensor, Var, D};
use candle_nn::{Module, VarBuilder, VarMap};

use crate::network::{ModelKind, Network};

/// A network together with the variables that back it.
pub struct Model {
    network: Network,
    varmap: VarMap,
    device: Device,
    num_classes: usize,
}

impl Model {
    pub fn new(
        kind: ModelKind,
        num_features: usize,
        num_classes: usize,
        device: &Device,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let network = kind.build(&vs, num_features, num_classes)?;

        Ok(Self {
            network,
            varmap,
            device: device.clone(),
            num_classes,
        })
    }

    /// Builds the network and loads parameters saved by [`Model::save`].
    pub fn load(
        kind: ModelKind,
        num_features: usize,
        num_classes: usize,
        device: &Device,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let mut model = Self::new(kind, num_features, num_classes, device)?;
        model.restore(path)?;
        Ok(model)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(path)
    }

    /// Overwrites the current parameters in place.
    pub fn restore(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.load(path)
    }

    #[inline]
    pub fn logits(&self, x: &Tensor) -> Result<Tensor> {
        self.network.forward(x)
    }

    pub fn predict(&self, x: &Tensor) -> Result<Vec<u32>> {
        self.logits(x)?.argmax(D::Minus1)?.to_vec1::<u32>()
    }

    pub fn vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    #[inline]
    pub fn device(&self) -> &Device {
        &self.device
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}
