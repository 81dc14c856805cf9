use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct DownloadStats {
    pub bytes: u64,
    pub elapsed_secs: f64,
}

impl DownloadStats {
    pub fn speed_mb(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.bytes as f64 / self.elapsed_secs / (1024.0 * 1024.0)
        } else {
            0.0
        }
    }
}

/// Byte-level progress for a single download. Draws nothing unless stderr is a terminal.
pub struct DownloadProgress {
    pub bar: ProgressBar,
    start_time: Instant,
}

impl DownloadProgress {
    pub fn new(label: &str, total_bytes: Option<u64>) -> Self {
        let bar = if !std::io::stderr().is_terminal() {
            ProgressBar::hidden()
        } else if let Some(total) = total_bytes {
            let style = ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})\n{msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-");
            ProgressBar::new(total).with_style(style)
        } else {
            let style = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {bytes} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
            ProgressBar::new_spinner().with_style(style)
        };
        bar.set_message(label.to_string());

        Self {
            bar,
            start_time: Instant::now(),
        }
    }

    pub fn finish(self) -> DownloadStats {
        let stats = DownloadStats {
            bytes: self.bar.position(),
            elapsed_secs: self.start_time.elapsed().as_secs_f64(),
        };
        self.bar.finish_and_clear();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_zero_without_elapsed_time() {
        let stats = DownloadStats {
            bytes: 1024,
            elapsed_secs: 0.0,
        };
        assert_eq!(stats.speed_mb(), 0.0);
    }

    #[test]
    fn finish_reports_position() {
        let progress = DownloadProgress::new("test", Some(10));
        progress.bar.inc(7);
        let stats = progress.finish();
        assert_eq!(stats.bytes, 7);
    }
}
