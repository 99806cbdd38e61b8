use std::io::{self, Write};

/// Square matrix of `counts[actual][predicted]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfusionMatrix {
    num_classes: usize,
    counts: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            counts: vec![0; num_classes * num_classes],
        }
    }

    pub fn from_pairs(num_classes: usize, pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut matrix = Self::new(num_classes);
        matrix.extend(pairs);
        matrix
    }

    /// Panics if either class is out of range.
    #[inline]
    pub fn record(&mut self, actual: usize, predicted: usize) {
        assert!(
            actual < self.num_classes && predicted < self.num_classes,
            "class out of range: actual {}, predicted {}, classes {}",
            actual,
            predicted,
            self.num_classes
        );
        self.counts[actual * self.num_classes + predicted] += 1;
    }

    #[inline]
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    #[inline]
    pub fn count(&self, actual: usize, predicted: usize) -> u64 {
        self.counts[actual * self.num_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn correct(&self) -> u64 {
        (0..self.num_classes).map(|c| self.count(c, c)).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    /// Samples whose actual class is `class`.
    pub fn support(&self, class: usize) -> u64 {
        (0..self.num_classes).map(|p| self.count(class, p)).sum()
    }

    /// Samples predicted as `class`.
    pub fn predicted(&self, class: usize) -> u64 {
        (0..self.num_classes).map(|a| self.count(a, class)).sum()
    }

    pub fn precision(&self, class: usize) -> f64 {
        ratio(self.count(class, class), self.predicted(class))
    }

    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.count(class, class), self.support(class))
    }

    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Unweighted mean of per-class (precision, recall, f1).
    pub fn macro_average(&self) -> (f64, f64, f64) {
        if self.num_classes == 0 {
            return (0.0, 0.0, 0.0);
        }

        let n = self.num_classes as f64;
        let (p, r, f) = (0..self.num_classes).fold((0.0, 0.0, 0.0), |(p, r, f), c| {
            (p + self.precision(c), r + self.recall(c), f + self.f1(c))
        });
        (p / n, r / n, f / n)
    }

    /// Cells as fractions of the grand total, rounded to two decimals.
    pub fn normalized(&self) -> Vec<Vec<f64>> {
        let total = self.total();
        (0..self.num_classes)
            .map(|a| {
                (0..self.num_classes)
                    .map(|p| (ratio(self.count(a, p), total) * 100.0).round() / 100.0)
                    .collect()
            })
            .collect()
    }

    /// Writes raw counts with a header row of predicted classes.
    pub fn write_csv<W: Write>(&self, writer: &mut W, class_names: &[String]) -> io::Result<()> {
        let name = |c: usize| {
            class_names
                .get(c)
                .cloned()
                .unwrap_or_else(|| c.to_string())
        };

        write!(writer, "actual\\predicted")?;
        for p in 0..self.num_classes {
            write!(writer, ",{}", name(p))?;
        }
        writeln!(writer)?;

        for a in 0..self.num_classes {
            write!(writer, "{}", name(a))?;
            for p in 0..self.num_classes {
                write!(writer, ",{}", self.count(a, p))?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

impl Extend<(usize, usize)> for ConfusionMatrix {
    fn extend<I: IntoIterator<Item = (usize, usize)>>(&mut self, iter: I) {
        for (actual, predicted) in iter {
            self.record(actual, predicted);
        }
    }
}

#[inline]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfusionMatrix {
        // actual 0: 3 right, 1 predicted as 1
        // actual 1: 2 right, 2 predicted as 2
        // actual 2: 2 right
        ConfusionMatrix::from_pairs(
            3,
            [
                (0, 0),
                (0, 0),
                (0, 0),
                (0, 1),
                (1, 1),
                (1, 1),
                (1, 2),
                (1, 2),
                (2, 2),
                (2, 2),
            ],
        )
    }

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_counts_and_accuracy() {
        let m = sample();
        assert_eq!(m.total(), 10);
        assert_eq!(m.correct(), 7);
        approx(m.accuracy(), 0.7);
        assert_eq!(m.support(1), 4);
        assert_eq!(m.predicted(2), 4);
        assert_eq!(m.count(1, 2), 2);
    }

    #[test]
    fn test_per_class_scores() {
        let m = sample();
        approx(m.precision(0), 1.0);
        approx(m.recall(0), 0.75);
        approx(m.precision(1), 2.0 / 3.0);
        approx(m.recall(1), 0.5);
        approx(m.precision(2), 0.5);
        approx(m.recall(2), 1.0);
        approx(m.f1(2), 2.0 / 3.0);

        let (p, r, _) = m.macro_average();
        approx(p, (1.0 + 2.0 / 3.0 + 0.5) / 3.0);
        approx(r, (0.75 + 0.5 + 1.0) / 3.0);
    }

    #[test]
    fn test_empty_classes_score_zero() {
        let m = ConfusionMatrix::from_pairs(3, [(0, 0), (0, 0)]);
        assert_eq!(m.precision(1), 0.0);
        assert_eq!(m.recall(2), 0.0);
        assert_eq!(m.f1(1), 0.0);
        assert_eq!(ConfusionMatrix::new(0).macro_average(), (0.0, 0.0, 0.0));
        assert_eq!(ConfusionMatrix::new(2).accuracy(), 0.0);
    }

    #[test]
    fn test_normalized_rounds_to_two_decimals() {
        let m = ConfusionMatrix::from_pairs(2, [(0, 0), (0, 0), (1, 0)]);
        assert_eq!(m.normalized(), vec![vec![0.67, 0.0], vec![0.33, 0.0]]);
    }

    #[test]
    #[should_panic(expected = "class out of range")]
    fn test_record_out_of_range() {
        ConfusionMatrix::new(2).record(2, 0);
    }

    #[test]
    fn test_write_csv() {
        let m = ConfusionMatrix::from_pairs(2, [(0, 0), (1, 0), (1, 1)]);
        let mut out = Vec::new();
        m.write_csv(&mut out, &["cat".to_string()]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "actual\\predicted,cat,1\ncat,1,0\n1,1,1\n"
        );
    }
}
