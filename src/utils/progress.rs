use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{msg} [{elapsed_precise}] {wide_bar} {pos}/{len} ({per_sec})";

/// Progress bar for domain lookups, hidden when disabled or when there is no work.
pub fn lookup_progress(total: usize, enabled: bool) -> ProgressBar {
    if !enabled || total == 0 {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message("Resolving domains");
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress_is_hidden() {
        assert!(lookup_progress(10, false).is_hidden());
        assert!(lookup_progress(0, true).is_hidden());
    }
}
