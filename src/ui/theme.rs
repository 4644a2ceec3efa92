use console::Term;
use owo_colors::Style;
use std::sync::OnceLock;

static STDOUT_THEME: OnceLock<Theme> = OnceLock::new();
static STDERR_THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for status lines; data output is never styled
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub dim: Style,
}

impl Theme {
    /// Colored only for a terminal, and only when `NO_COLOR`/`CLICOLOR` allow it
    pub fn for_term(term: &Term) -> Self {
        if term.is_term() && console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            dim: Style::new().dimmed(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            header: none,
            success: none,
            error: none,
            dim: none,
        }
    }
}

/// Theme for lines written to stdout
pub fn theme() -> &'static Theme {
    STDOUT_THEME.get_or_init(|| Theme::for_term(&Term::stdout()))
}

/// Theme for lines written to stderr, which may be a terminal when stdout is piped
pub fn err_theme() -> &'static Theme {
    STDERR_THEME.get_or_init(|| Theme::for_term(&Term::stderr()))
}
