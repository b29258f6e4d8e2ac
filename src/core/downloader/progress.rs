use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

/// Terminal progress for one transfer.
///
/// A known, non-zero size gets a byte bar; an unknown or zero size gets a
/// bouncing spinner instead of a percentage.
pub struct TransferProgress {
    bar: ProgressBar,
    total: Option<u64>,
}

impl TransferProgress {
    pub fn new(file_name: &str, total: Option<u64>, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
                total,
            };
        }

        let bar = match total.filter(|t| *t > 0) {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{msg} [{bar:30}] {bytes}/{total_bytes} {percent}% ({eta})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▉ "),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{msg} {spinner} {bytes} (unknown size)")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        bar.set_message(file_name.to_string());

        Self { bar, total }
    }

    pub fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn abandon(&self) {
        self.bar.abandon();
        let done = self.bar.position();
        match fraction(done, self.total) {
            Some(f) => warn!("Transfer stopped at {:.1}% ({} bytes)", f * 100.0, done),
            None => warn!("Transfer stopped after {} bytes", done),
        }
    }
}

/// Completed fraction of a transfer, `None` when it cannot be computed.
pub fn fraction(done: u64, total: Option<u64>) -> Option<f64> {
    match total {
        Some(total) if total > 0 => Some((done as f64 / total as f64).min(1.0)),
        _ => None,
    }
}
