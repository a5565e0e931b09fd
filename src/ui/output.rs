use crate::ui::{stderr_theme, stdout_theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(stdout_theme().title.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(stdout_theme().ok.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(stderr_theme().failure.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(stderr_theme().notice.clone()));
}

pub fn info(label: &str, value: &str) {
    let theme = stdout_theme();
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme.accent.clone()),
        label.style(theme.label.clone()),
        value
    );
}

pub fn section(icon: &str, title: &str) {
    println!();
    println!("{} {}", icon, title.style(stdout_theme().title.clone()));
}
