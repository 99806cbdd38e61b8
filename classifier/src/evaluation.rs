use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use candle_core::{bail, Result, Tensor, D};
use candle_nn::loss::cross_entropy;
use controller::EpochMetrics;
use metrics::{ClassificationReport, ConfusionMatrix, Summary};

use crate::model::Model;
use crate::samples::Samples;

/// Mean cross-entropy and accuracy of `model` over the rows at `indices`.
///
/// An empty index set scores `0` for both.
pub fn evaluate(
    model: &Model,
    samples: &Samples,
    indices: &[usize],
    batch_size: usize,
) -> Result<EpochMetrics> {
    let mut total_loss = 0.0;
    let mut correct = 0usize;

    for batch in samples.batches(indices, batch_size, model.device()) {
        let (x, y) = batch?;
        let n = y.dim(0)?;

        let logits = model.logits(&x)?;
        let loss = cross_entropy(&logits, &y)?.to_vec0::<f32>()?;

        total_loss += loss as f64 * n as f64;
        correct += correct_predictions(&logits, &y)?;
    }

    if indices.is_empty() {
        return Ok(EpochMetrics::new(0.0, 0.0));
    }

    let n = indices.len() as f64;
    Ok(EpochMetrics::new(total_loss / n, correct as f64 / n))
}

/// Number of rows whose highest logit is the target class.
pub fn correct_predictions(logits: &Tensor, y: &Tensor) -> Result<usize> {
    let predicted = logits.argmax(D::Minus1)?;
    let hits = predicted.eq(y)?.to_dtype(candle_core::DType::U32)?;
    Ok(hits.sum_all()?.to_vec0::<u32>()? as usize)
}

pub fn confusion_matrix(
    model: &Model,
    samples: &Samples,
    indices: &[usize],
    batch_size: usize,
) -> Result<ConfusionMatrix> {
    let mut matrix = ConfusionMatrix::new(model.num_classes());

    for batch in samples.batches(indices, batch_size, model.device()) {
        let (x, y) = batch?;
        let predicted = model.predict(&x)?;
        let actual = y.to_vec1::<u32>()?;

        for (a, p) in actual.into_iter().zip(predicted) {
            if a as usize >= model.num_classes() {
                bail!(
                    "label {} is outside the {} classes of the model",
                    a,
                    model.num_classes()
                );
            }
            matrix.record(a as usize, p as usize);
        }
    }

    Ok(matrix)
}

/// Display name of a class, falling back to its index.
pub fn class_name(class_names: &[String], class: usize) -> String {
    class_names
        .get(class)
        .cloned()
        .unwrap_or_else(|| class.to_string())
}

/// Writes the summary, report and normalized matrix as plain text.
pub fn write_evaluation(
    path: impl AsRef<Path>,
    matrix: &ConfusionMatrix,
    class_names: &[String],
) -> io::Result<()> {
    let path = path.as_ref();
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "{}", Summary::new(matrix))?;
    writeln!(file)?;
    writeln!(file, "{}", ClassificationReport::new(matrix, class_names))?;
    writeln!(file)?;
    writeln!(file, "Confusion matrix (fraction of all samples):")?;

    for (actual, row) in matrix.normalized().iter().enumerate() {
        write!(file, "{:>12}", class_name(class_names, actual))?;
        for value in row {
            write!(file, " {:>6.2}", value)?;
        }
        writeln!(file)?;
    }

    file.flush()?;
    log::info!("Evaluation written to {}", path.display());
    Ok(())
}
