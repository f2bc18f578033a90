use crate::resolver::OriginKind;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles for report output
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub muted: Style,
    /// `file:line` targets, meant to be copied into an editor
    pub location: Style,
    pub addon: Style,
    pub native: Style,
    pub unresolvable: Style,
}

impl Theme {
    /// Colored only when stdout is a terminal and colors are not disabled
    /// (`NO_COLOR`, `CLICOLOR=0`)
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() || !console::colors_enabled() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            muted: Style::new().bright_black(),
            location: Style::new().blue().underline(),
            addon: Style::new().green(),
            native: Style::new().cyan(),
            unresolvable: Style::new().red(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            muted: Style::new(),
            location: Style::new(),
            addon: Style::new(),
            native: Style::new(),
            unresolvable: Style::new(),
        }
    }

    pub fn origin(&self, kind: OriginKind) -> Style {
        match kind {
            OriginKind::AddonDefined => self.addon,
            OriginKind::NativeBuiltin => self.native,
            OriginKind::Unresolvable => self.unresolvable,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_adds_no_escapes() {
        let theme = Theme::plain();
        let text = "addon".style(theme.origin(OriginKind::AddonDefined)).to_string();
        assert_eq!(text, "addon");
    }

    #[test]
    fn test_origin_styles_differ_when_colored() {
        let theme = Theme::colored();
        let addon = "x".style(theme.origin(OriginKind::AddonDefined)).to_string();
        let native = "x".style(theme.origin(OriginKind::NativeBuiltin)).to_string();
        assert_ne!(addon, native);
        assert!(addon.contains("\u{1b}["));
    }
}
