use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

static PROGRESS_HIDDEN: AtomicBool = AtomicBool::new(false);

/// Suppress progress bars for the rest of the process (quiet mode).
pub fn set_progress_hidden(hidden: bool) {
    PROGRESS_HIDDEN.store(hidden, Ordering::Relaxed);
}

/// Progress bar for a bulk insert of `len` records, drawn on stderr.
pub fn insert_progress(len: u64) -> ProgressBar {
    if PROGRESS_HIDDEN.load(Ordering::Relaxed) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  {bar:30.cyan/dark_gray} {pos}/{len} exploits {elapsed_precise}")
    {
        bar.set_style(style.progress_chars("█▓░"));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_tracks_position() {
        set_progress_hidden(true);
        let bar = insert_progress(3);
        bar.inc(2);
        assert_eq!(bar.position(), 2);
        assert!(bar.is_hidden());
        set_progress_hidden(false);
    }
}
