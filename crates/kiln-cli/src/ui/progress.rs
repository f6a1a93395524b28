//! Build progress shown while the orchestrator runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use kiln_bundler::{BuildPhase, ModuleId, ProgressReporter};
use owo_colors::OwoColorize;

use super::colors_enabled;

/// Spinner driven by the orchestrator's phase and module callbacks.
///
/// Hidden when stderr is not a terminal or when running in CI; the
/// callbacks are then cheap no-ops on the hidden bar.
pub struct BuildProgress {
    pb: ProgressBar,
}

impl BuildProgress {
    pub fn new(visible: bool) -> Self {
        let pb = if visible {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["◐", "◓", "◑", "◒", "●"]),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        Self { pb }
    }

    pub fn message(&self) -> String {
        self.pb.message()
    }

    /// Stop the spinner with a check mark.
    pub fn finish(&self, message: &str) {
        if colors_enabled() {
            self.pb.finish_with_message(format!("{} {}", "✓".green(), message));
        } else {
            self.pb.finish_with_message(format!("✓ {}", message));
        }
    }

    /// Stop the spinner with a cross.
    pub fn fail(&self, message: &str) {
        if colors_enabled() {
            self.pb.abandon_with_message(format!("{} {}", "✗".red(), message));
        } else {
            self.pb.abandon_with_message(format!("✗ {}", message));
        }
    }
}

impl ProgressReporter for BuildProgress {
    fn phase_started(&self, phase: BuildPhase) {
        match phase {
            BuildPhase::Idle | BuildPhase::Done | BuildPhase::Failed => {}
            BuildPhase::Discovering => self.pb.set_message("Discovering modules..."),
            BuildPhase::Transforming => self.pb.set_message("Transforming modules..."),
            BuildPhase::Splitting => self.pb.set_message("Splitting chunks..."),
            BuildPhase::PostProcessing => self.pb.set_message("Running plugins..."),
        }
    }

    fn module_transformed(&self, id: &ModuleId, done: usize, total: usize) {
        self.pb
            .set_message(format!("Transforming [{}/{}] {}", done, total, id));
    }
}
