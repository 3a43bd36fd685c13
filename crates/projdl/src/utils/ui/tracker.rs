use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};
use projdl_fetch::Progress;

pub trait Tracker {
    type Ctx: Clone;
    fn new(ctx: Self::Ctx) -> Self;
    fn finish(&self, msg: Option<String>);
}

const PB_STYLE: &str =
    "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: LazyLock<Option<ProgressStyle>> = LazyLock::new(|| {
    ProgressStyle::with_template(PB_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK).progress_chars(PB_CHARS))
});

/// Byte progress of one transfer.
#[derive(Clone)]
pub struct ProgressTracker {
    pub pb: ProgressBar,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTrackerConfig {
    pub len: Option<u64>,
}

impl Tracker for ProgressTracker {
    type Ctx = ProgressTrackerConfig;

    fn new(ctx: Self::Ctx) -> Self {
        let pb = match ctx.len {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::no_length(),
        };
        if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.set_style(style.clone());
        }
        ProgressTracker { pb }
    }

    fn finish(&self, msg: Option<String>) {
        match msg {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish_and_clear(),
        }
    }
}

impl ProgressTracker {
    /// Mirror a transfer snapshot onto the bar.
    pub fn update(&self, progress: &Progress) {
        if let Some(total) = progress.total_bytes {
            if self.pb.length() != Some(total) {
                self.pb.set_length(total);
            }
        }
        self.pb.set_position(progress.bytes_downloaded);
        if progress.is_retrying() {
            self.pb.set_message(format!("retry {}", progress.retry_count));
        }
    }
}
