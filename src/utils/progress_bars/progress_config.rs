// src/utils/progress_bars/progress_config.rs

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::env;

/// Configuration for progress tracking during batch resolution
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Whether to show progress bars at all
    pub enabled: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ProgressConfig {
    /// Create progress configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("PROGRESS_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        }
    }

    /// Create a MultiProgress instance if progress is enabled, None otherwise
    pub fn create_multi_progress(&self) -> Option<MultiProgress> {
        if self.enabled {
            Some(MultiProgress::new())
        } else {
            None
        }
    }
}

/// Adds a chunk-level progress bar to `multi_progress`.
pub fn chunk_progress_bar(multi_progress: &MultiProgress, total_chunks: usize) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new(total_chunks as u64));
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  {spinner:.blue} [{elapsed_precise}] {bar:30.green/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    pb.set_message("Resolving chunks...");
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_progress_config_from_env() {
        env::set_var("PROGRESS_ENABLED", "false");

        let config = ProgressConfig::from_env();
        assert!(!config.enabled);
        assert!(config.create_multi_progress().is_none());

        // Cleanup
        env::remove_var("PROGRESS_ENABLED");
    }

    #[test]
    fn test_chunk_progress_bar_length() {
        let mp = MultiProgress::new();
        let pb = chunk_progress_bar(&mp, 4);
        assert_eq!(pb.length(), Some(4));
    }
}
