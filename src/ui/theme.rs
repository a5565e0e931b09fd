use console::Term;
use owo_colors::Style;
use std::sync::OnceLock;

static STDOUT: OnceLock<Theme> = OnceLock::new();
static STDERR: OnceLock<Theme> = OnceLock::new();

/// Styles for CLI lines. Each output stream gets its own theme, coloured
/// only when that stream is a terminal.
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub label: Style,
    pub ok: Style,
    pub failure: Style,
    pub notice: Style,
    pub accent: Style,
}

impl Theme {
    pub fn for_term(term: &Term) -> Self {
        if term.is_term() { Self::colored() } else { Self::plain() }
    }

    fn colored() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dimmed(),
            ok: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            notice: Style::new().yellow(),
            accent: Style::new().magenta(),
        }
    }

    fn plain() -> Self {
        Self {
            title: Style::new(),
            label: Style::new(),
            ok: Style::new(),
            failure: Style::new(),
            notice: Style::new(),
            accent: Style::new(),
        }
    }
}

/// Theme for lines printed to stdout
pub fn stdout_theme() -> &'static Theme {
    STDOUT.get_or_init(|| Theme::for_term(&Term::stdout()))
}

/// Theme for lines printed to stderr
pub fn stderr_theme() -> &'static Theme {
    STDERR.get_or_init(|| Theme::for_term(&Term::stderr()))
}
