use crate::ui::Console;
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use repeatskmer::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    phase: String,
    failed_regions: u64,
}

/// Renders core progress events as an `indicatif` spinner per phase that
/// turns into a bar once the phase announces its task size.
#[derive(Clone)]
pub struct CliProgressHandler {
    console: Console,
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            state: Arc::new(Mutex::new(BarState::default())),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let handler = self.clone();
        Box::new(move |progress: Progress| handler.handle(progress))
    }

    fn handle(&self, progress: Progress) {
        let Ok(mut state) = self.state.lock() else {
            warn!("Progress state mutex was poisoned. Cannot update progress.");
            return;
        };

        match progress {
            Progress::PhaseStart { name } => {
                if let Some(bar) = state.active_bar.take() {
                    bar.finish_and_clear();
                }
                let pb = self.console.multi().add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                pb.set_message(name.to_string());
                state.active_bar = Some(pb);
                state.phase = name.to_string();
                state.failed_regions = 0;
            }
            Progress::PhaseFinish => {
                if let Some(bar) = state.active_bar.take() {
                    bar.finish_and_clear();
                }
                let summary = match state.failed_regions {
                    0 => format!("✓ {}", state.phase),
                    n => format!("✓ {} ({} region(s) failed)", state.phase, n),
                };
                self.console.println(summary);
                state.phase.clear();
            }
            Progress::TaskStart { total_steps } => {
                if let Some(bar) = state.active_bar.as_ref() {
                    bar.disable_steady_tick();
                    bar.set_style(Self::bar_style());
                    bar.set_length(total_steps);
                    bar.set_position(0);
                }
            }
            Progress::TaskIncrement => {
                if let Some(bar) = state.active_bar.as_ref() {
                    bar.inc(1);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = state.active_bar.as_ref() {
                    if let Some(len) = bar.length() {
                        bar.set_position(len);
                    }
                    bar.finish();
                }
            }
            Progress::RegionFailed { region_id } => {
                state.failed_regions += 1;
                if let Some(bar) = state.active_bar.as_ref() {
                    bar.set_message(format!(
                        "{} ({} failed, last: {})",
                        state.phase, state.failed_regions, region_id
                    ));
                }
            }
            Progress::Message(msg) => {
                self.console.println(format!("  {}", msg));
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<30} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("━╸ ")
    }
}
