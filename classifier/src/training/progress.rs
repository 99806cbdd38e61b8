use indicatif::{ProgressBar, ProgressStyle};

pub struct TrainingProgressBar {
    bar: ProgressBar,
}

impl TrainingProgressBar {
    pub fn new(num_batches: usize, visible: bool) -> Result<Self, Box<dyn std::error::Error>> {
        if !visible {
            return Ok(Self {
                bar: ProgressBar::hidden(),
            });
        }

        let bar = ProgressBar::new(num_batches as u64);
        bar.set_style(ProgressStyle::default_bar().template(
            "{spinner:.cyan} {pos}/{len} [{wide_bar:.cyan/blue}] {eta_precise} | {msg}",
        )?);
        Ok(Self { bar })
    }

    pub fn update(&self, loss: f64, accuracy: f64) {
        self.bar
            .set_message(format!("loss: {:.5}, acc: {:.4}", loss, accuracy));
        self.bar.inc(1);
    }

    pub fn finish(&self, loss: f64, accuracy: f64) {
        self.bar
            .set_message(format!("loss: {:.5}, acc: {:.4}", loss, accuracy));
        self.bar.finish_and_clear();
    }
}
