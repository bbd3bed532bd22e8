use colored::{ColoredString, Colorize};

/// Presentation settings resolved once per process and passed to every
/// command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub color: bool,
}

impl OutputConfig {
    /// Color is on unless `--no-color` is passed or `NO_COLOR` is set to a
    /// non-empty value.
    #[must_use]
    pub fn from_flags(no_color_flag: bool, no_color_env: Option<&str>) -> Self {
        let env_disables = no_color_env.is_some_and(|value| !value.is_empty());
        Self {
            color: !(no_color_flag || env_disables),
        }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    pub fn info(self, text: &str) -> String {
        self.paint(text, |t| t.cyan())
    }

    pub fn warning(self, text: &str) -> String {
        self.paint(text, |t| t.yellow())
    }

    pub fn error(self, text: &str) -> String {
        self.paint(text, |t| t.red().bold())
    }

    pub fn current(self, text: &str) -> String {
        self.paint(text, |t| t.magenta().bold())
    }
}
