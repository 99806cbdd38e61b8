use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use candle_core::{Device, Result, Tensor};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rayon::prelude::*;

/// Labelled feature rows, stored row-major in one flat buffer.
///
/// CSV layout: a header line, then `label,f0,f1,...` per row. Images are
/// expected to be flattened to pixel intensities beforehand.
#[derive(Clone, Debug)]
pub struct Samples {
    features: Vec<f32>,
    labels: Vec<u32>,
    num_features: usize,
}

impl Samples {
    pub fn new(features: Vec<f32>, labels: Vec<u32>, num_features: usize) -> io::Result<Self> {
        if num_features == 0 || features.len() != labels.len() * num_features {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} feature values do not fit {} rows of {} features",
                    features.len(),
                    labels.len(),
                    num_features
                ),
            ));
        }

        Ok(Self {
            features,
            labels,
            num_features,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let samples = Self::read(BufReader::new(file))?;
        log::info!("Loaded {} samples from {}", samples.len(), path.display());
        Ok(samples)
    }

    pub fn read<R: BufRead>(mut reader: R) -> io::Result<Self> {
        // Skip header line
        let mut header_line = String::new();
        let _ = reader.read_line(&mut header_line)?;

        let lines: Vec<String> = reader
            .lines()
            .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
            .collect::<io::Result<_>>()?;

        let rows: Vec<(u32, Vec<f32>)> = lines
            .par_iter()
            .enumerate()
            .map(|(i, line)| parse_row(line).map_err(|e| invalid(format!("row {}: {}", i + 1, e))))
            .collect::<io::Result<_>>()?;

        let num_features = rows.first().map(|(_, f)| f.len()).unwrap_or(0);
        if rows.is_empty() {
            return Err(invalid("no samples found".to_string()));
        }

        let mut features = Vec::with_capacity(rows.len() * num_features);
        let mut labels = Vec::with_capacity(rows.len());
        for (i, (label, row)) in rows.into_iter().enumerate() {
            if row.len() != num_features {
                return Err(invalid(format!(
                    "row {}: expected {} features, found {}",
                    i + 1,
                    num_features,
                    row.len()
                )));
            }
            labels.push(label);
            features.extend(row);
        }

        Self::new(features, labels, num_features)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Highest label + 1.
    pub fn num_classes(&self) -> usize {
        self.labels.iter().max().map_or(0, |&l| l as usize + 1)
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.num_features;
        &self.features[start..start + self.num_features]
    }

    #[inline]
    pub fn label(&self, index: usize) -> u32 {
        self.labels[index]
    }

    pub fn label_counts(&self) -> AHashMap<u32, usize> {
        let mut counts = AHashMap::new();
        for &label in &self.labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    pub fn log_statistics(&self, class_names: &[String]) {
        log::info!("Total samples: {}", self.len());
        log::info!("Features per sample: {}", self.num_features);

        let counts = self.label_counts();
        let mut classes: Vec<_> = counts.into_iter().collect();
        classes.sort_unstable();

        for (label, count) in classes {
            let name = class_names
                .get(label as usize)
                .map(String::as_str)
                .unwrap_or("?");
            log::info!(
                "Class {} ({}): {} samples ({:.2}%)",
                label,
                name,
                count,
                count as f64 / self.len() as f64 * 100.0
            );
        }
    }

    /// Gathers the rows at `indices` into `(x, y)` tensors of shape `(n, features)` and `(n,)`.
    pub fn batch(&self, indices: &[usize], device: &Device) -> Result<(Tensor, Tensor)> {
        let n = indices.len();
        let mut features = Vec::with_capacity(n * self.num_features);
        let mut labels = Vec::with_capacity(n);

        for &i in indices {
            features.extend_from_slice(self.row(i));
            labels.push(self.labels[i]);
        }

        let x = Tensor::from_vec(features, (n, self.num_features), device)?;
        let y = Tensor::from_vec(labels, (n,), device)?;
        Ok((x, y))
    }

    pub fn batches<'a>(
        &'a self,
        indices: &'a [usize],
        batch_size: usize,
        device: &'a Device,
    ) -> impl Iterator<Item = Result<(Tensor, Tensor)>> + 'a {
        indices
            .chunks(batch_size.max(1))
            .map(move |chunk| self.batch(chunk, device))
    }
}

/// Row indices for the three subsets.
#[derive(Clone, Debug, Default)]
pub struct Split {
    pub train: Vec<usize>,
    pub val: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..len` with `seed` and carves off the test, then the validation share.
pub fn split_indices(len: usize, val_ratio: f64, test_ratio: f64, seed: u64) -> Split {
    let test_len = (len as f64 * test_ratio.clamp(0.0, 1.0)) as usize;
    let val_len = ((len - test_len) as f64 * val_ratio.clamp(0.0, 1.0)) as usize;

    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(test_len + val_len);
    let val = indices.split_off(test_len);
    let test = indices;

    log::info!(
        "Split: {} train, {} validation, {} test",
        train.len(),
        val.len(),
        test.len()
    );

    Split { train, val, test }
}

fn parse_row(line: &str) -> std::result::Result<(u32, Vec<f32>), String> {
    let mut parts = line.split(',');

    let label_str = parts.next().ok_or("missing label field")?;
    let label: u32 = label_str
        .trim()
        .parse()
        .map_err(|_| format!("label '{}' is not a class index", label_str.trim()))?;

    let features = parts
        .map(|v| {
            v.trim()
                .parse::<f32>()
                .map_err(|_| format!("'{}' is not a valid float", v.trim()))
        })
        .collect::<std::result::Result<Vec<f32>, String>>()?;

    if features.is_empty() {
        return Err("no feature values".to_string());
    }

    Ok((label, features))
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const CSV: &str = "label,f0,f1,f2\n0,0.0,0.5,1.0\n2,1.0,1.0,1.0\n\n1,0.25,0.25,0.0\n";

    #[test]
    fn test_read_csv() {
        let samples = Samples::read(CSV.as_bytes()).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples.num_features(), 3);
        assert_eq!(samples.num_classes(), 3);
        assert_eq!(samples.row(1), &[1.0, 1.0, 1.0]);
        assert_eq!(samples.label(2), 1);
    }

    #[test]
    fn test_read_rejects_bad_rows() {
        let ragged = "label,a,b\n0,1,2\n1,3\n";
        let err = Samples::read(ragged.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));

        let bad_label = "label,a\nx,1\n";
        assert!(Samples::read(bad_label.as_bytes()).is_err());

        let bad_value = "label,a\n0,abc\n";
        assert!(Samples::read(bad_value.as_bytes()).is_err());

        assert!(Samples::read("label,a\n".as_bytes()).is_err());
    }

    #[test]
    fn test_label_counts() {
        let samples = Samples::new(vec![0.0; 8], vec![1, 1, 0, 3], 2).unwrap();
        let counts = samples.label_counts();
        assert_eq!(counts[&1], 2);
        assert_eq!(counts[&3], 1);
        assert_eq!(counts.get(&2), None);
    }

    #[test]
    fn test_new_checks_shape() {
        assert!(Samples::new(vec![0.0; 5], vec![0, 1], 2).is_err());
        assert!(Samples::new(vec![], vec![], 0).is_err());
    }

    #[test]
    fn test_split_is_disjoint_and_reproducible() {
        let split = split_indices(100, 0.2, 0.1, 7);
        assert_eq!(split.test.len(), 10);
        assert_eq!(split.val.len(), 18);
        assert_eq!(split.train.len(), 72);

        let all: HashSet<usize> = split
            .train
            .iter()
            .chain(&split.val)
            .chain(&split.test)
            .copied()
            .collect();
        assert_eq!(all.len(), 100);

        let again = split_indices(100, 0.2, 0.1, 7);
        assert_eq!(split.train, again.train);
        assert_eq!(split.val, again.val);
    }

    #[test]
    fn test_batches() {
        let samples = Samples::read(CSV.as_bytes()).unwrap();
        let indices = vec![2, 0, 1];
        let batches: Vec<_> = samples
            .batches(&indices, 2, &Device::Cpu)
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(batches.len(), 2);
        let (x, y) = &batches[0];
        assert_eq!(x.dims(), &[2, 3]);
        assert_eq!(y.to_vec1::<u32>().unwrap(), vec![1, 0]);
        assert_eq!(
            x.to_vec2::<f32>().unwrap(),
            vec![vec![0.25, 0.25, 0.0], vec![0.0, 0.5, 1.0]]
        );
        assert_eq!(batches[1].0.dims(), &[1, 3]);
    }
}
