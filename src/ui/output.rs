use crate::report::Diagnostic;
use crate::resolver::OriginKind;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::SEARCH, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

/// `icon label: path:line`, the line omitted when unknown
pub fn location(label: &str, path: &str, line: Option<u32>) {
    let target = match line {
        Some(line) => format!("{}:{}", path, line),
        None => path.to_string(),
    };
    println!(
        "{} {}: {}",
        Icons::PIN,
        label.style(theme().dim.clone()),
        target.style(theme().location.clone())
    );
}

/// Origin name in its origin's color
pub fn origin(kind: OriginKind) -> String {
    kind.as_str().style(theme().origin(kind)).to_string()
}

pub fn diagnostic(diagnostic: &Diagnostic) {
    match diagnostic {
        Diagnostic::ModuleSkipped { .. } | Diagnostic::CollectionFailed { .. } => {
            eprintln!("  {}", diagnostic.to_string().style(theme().muted.clone()));
        }
        _ => warn(&diagnostic.to_string()),
    }
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}
