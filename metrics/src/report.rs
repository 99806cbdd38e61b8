use std::fmt;

use crate::confusion::ConfusionMatrix;

/// Per-class precision / recall / F1 table with accuracy and macro averages.
pub struct ClassificationReport<'a> {
    matrix: &'a ConfusionMatrix,
    class_names: &'a [String],
}

impl<'a> ClassificationReport<'a> {
    pub fn new(matrix: &'a ConfusionMatrix, class_names: &'a [String]) -> Self {
        Self {
            matrix,
            class_names,
        }
    }

    fn class_name(&self, class: usize) -> String {
        self.class_names
            .get(class)
            .cloned()
            .unwrap_or_else(|| class.to_string())
    }

    fn name_width(&self) -> usize {
        (0..self.matrix.num_classes())
            .map(|c| self.class_name(c).chars().count())
            .chain(std::iter::once("macro avg".len()))
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for ClassificationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.matrix;
        let w = self.name_width();

        writeln!(
            f,
            "{:>w$}  {:>9}  {:>9}  {:>9}  {:>9}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            w = w
        )?;
        writeln!(f)?;

        for class in 0..m.num_classes() {
            writeln!(
                f,
                "{:>w$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                self.class_name(class),
                m.precision(class),
                m.recall(class),
                m.f1(class),
                m.support(class),
                w = w
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>w$}  {:>9}  {:>9}  {:>9.2}  {:>9}",
            "accuracy",
            "",
            "",
            m.accuracy(),
            m.total(),
            w = w
        )?;

        let (precision, recall, f1) = m.macro_average();
        writeln!(
            f,
            "{:>w$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
            "macro avg",
            precision,
            recall,
            f1,
            m.total(),
            w = w
        )?;

        Ok(())
    }
}

/// Short test-set summary, in percent.
pub struct Summary<'a> {
    matrix: &'a ConfusionMatrix,
}

impl<'a> Summary<'a> {
    pub fn new(matrix: &'a ConfusionMatrix) -> Self {
        Self { matrix }
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.matrix;
        let (precision, recall, f1) = m.macro_average();

        writeln!(f, "Summary for {} test samples", m.total())?;
        writeln!(f, "Correct: {}", m.correct())?;
        writeln!(f, "Accuracy: {:.2}%", m.accuracy() * 100.0)?;
        writeln!(f, "Precision: {:.2}%", precision * 100.0)?;
        writeln!(f, "Recall: {:.2}%", recall * 100.0)?;
        write!(f, "F1-score: {:.2}%", f1 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_has_row_per_class() {
        let m = ConfusionMatrix::from_pairs(3, [(0, 0), (1, 1), (2, 1)]);
        let names = vec!["shirt".to_string(), "trouser".to_string()];
        let text = ClassificationReport::new(&m, &names).to_string();

        let rows: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        // header, three classes, accuracy, macro avg
        assert_eq!(rows.len(), 6);
        assert!(rows[1].trim_start().starts_with("shirt"));
        assert!(rows[2].trim_start().starts_with("trouser"));
        assert!(rows[3].trim_start().starts_with('2'));
        assert!(rows[4].contains("0.67"));
        assert!(rows[5].trim_start().starts_with("macro avg"));
    }

    #[test]
    fn test_summary_in_percent() {
        let m = ConfusionMatrix::from_pairs(2, [(0, 0), (1, 1), (1, 1), (1, 0)]);
        let text = Summary::new(&m).to_string();
        assert!(text.contains("Summary for 4 test samples"));
        assert!(text.contains("Correct: 3"));
        assert!(text.contains("Accuracy: 75.00%"));
    }
}
