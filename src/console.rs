use std::sync::OnceLock;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

static RUN_START: OnceLock<Instant> = OnceLock::new();

fn status_style(verb: &str, color: owo_colors::AnsiColors) -> String {
    format!("{:>12}", verb.color(color).bold())
}

pub fn status(verb: &str, message: impl std::fmt::Display) {
    eprintln!("{} {}", status_style(verb, owo_colors::AnsiColors::Green), message);
}

pub fn status_cyan(verb: &str, message: impl std::fmt::Display) {
    eprintln!("{} {}", status_style(verb, owo_colors::AnsiColors::Cyan), message);
}

pub fn warn(message: impl std::fmt::Display) {
    eprintln!("{} {}", status_style("Warning", owo_colors::AnsiColors::Yellow), message);
}

pub fn start() {
    RUN_START.get_or_init(Instant::now);
}

pub fn finished(summary: impl std::fmt::Display) {
    let elapsed = RUN_START
        .get()
        .map(|start| start.elapsed())
        .unwrap_or_default();

    eprintln!(
        "{} {} in {:.2}s",
        status_style("Finished", owo_colors::AnsiColors::Green),
        summary,
        elapsed.as_secs_f64()
    );
}

pub fn create_progress_bar(total: u64, verb: &str, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let template = format!("{{prefix:>12}} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} {message}");
    let style = ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━─");
    pb.set_style(style);
    pb.set_prefix(verb.green().bold().to_string());
    pb
}

pub fn progress_finish(pb: &ProgressBar) {
    pb.finish_and_clear();
}
