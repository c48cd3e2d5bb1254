use crate::orchestrator::{AutomationEvent, RunStatus, RunSummary};
use crate::ui::icons::{CHECK, CROSS, DOCUMENT, INFO, PAUSE, RUNNING, SPARKLE};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal UI for an automation run, rendered via `indicatif` progress bars.
///
/// Two bars are stacked vertically:
/// - Phase bar: how many phases are completed
/// - Work bar: spinner with the document or sprint currently being generated
pub struct AutomationUI {
    multi: MultiProgress,
    phase_bar: ProgressBar,
    work_bar: ProgressBar,
    verbose: bool,
}

impl AutomationUI {
    /// Create the UI. `completed` phases are already counted on the phase bar.
    pub fn new(total_phases: u64, completed: u64, verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let phase_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░");

        let phase_bar = multi.add(ProgressBar::new(total_phases));
        phase_bar.set_style(phase_style);
        phase_bar.set_prefix("Phases");
        phase_bar.set_position(completed);

        let work_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let work_bar = multi.add(ProgressBar::new_spinner());
        work_bar.set_style(work_style);
        work_bar.set_prefix("  Work");

        Self {
            multi,
            phase_bar,
            work_bar,
            verbose,
        }
    }

    /// Print a line above the bars. Without a terminal the bars are hidden and
    /// lines go straight to stdout.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.is_hidden() {
            println!("{}", msg.as_ref());
        } else if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Render one orchestrator event.
    pub fn handle(&self, event: &AutomationEvent) {
        match event {
            AutomationEvent::PhaseStarted { phase_id, phase_name } => {
                self.phase_bar
                    .set_message(format!("{}: {}", style(phase_id).yellow(), phase_name));
                self.work_bar
                    .set_message(format!("Generating {}", style(phase_name).cyan()));
                self.work_bar.enable_steady_tick(Duration::from_millis(100));
                self.print_line(format!("{}{}", RUNNING, style(phase_name).bold()));
            }
            AutomationEvent::SprintCompleted {
                sprint_name,
                completed,
                total,
                ..
            } => {
                self.work_bar.set_message(format!(
                    "{} {}/{} done",
                    style(sprint_name).cyan(),
                    completed,
                    total
                ));
                self.print_line(format!(
                    "    {}{} {}",
                    DOCUMENT,
                    sprint_name,
                    style(format!("({}/{})", completed, total)).dim()
                ));
            }
            AutomationEvent::PhaseCompleted { phase_name, .. } => {
                self.phase_bar.inc(1);
                self.work_bar.set_message("");
                self.print_line(format!("{}{} completed", CHECK, style(phase_name).green()));
            }
            AutomationEvent::PhaseFailed {
                phase_name, error, ..
            } => {
                self.work_bar.set_message("");
                self.print_line(format!(
                    "{}{} skipped: {}",
                    CROSS,
                    style(phase_name).red().bold(),
                    style(error).red()
                ));
            }
            AutomationEvent::Message { text } => {
                if self.verbose {
                    self.print_line(format!("    {}{}", INFO, style(text).dim()));
                } else {
                    self.work_bar.set_message(text.clone());
                }
            }
            AutomationEvent::RunFinished { .. } => {
                self.work_bar.finish_and_clear();
            }
        }
    }

    /// Close the bars and print the final summary line.
    pub fn finish(&self, summary: &RunSummary) {
        self.work_bar.finish_and_clear();
        self.phase_bar.finish();

        let secs = summary.elapsed.as_secs();
        let elapsed = if secs >= 60 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}s", secs)
        };

        let line = match summary.status {
            RunStatus::Complete => format!("{}{}", SPARKLE, style(summary).green().bold()),
            RunStatus::Paused => format!("{}{}", PAUSE, style(summary).yellow().bold()),
            RunStatus::Error => format!("{}{}", CROSS, style(summary).red().bold()),
        };
        self.print_line(format!("{} {}", line, style(format!("({})", elapsed)).dim()));

        for failed in &summary.failed {
            self.print_line(format!(
                "    {} {}: {}",
                style("-").dim(),
                style(&failed.name).red(),
                failed.error
            ));
        }
    }
}
