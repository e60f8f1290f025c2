use std::env;

use owo_colors::OwoColorize;

/// ANSI styling gate. Disabled by `--no-color`, the `NO_COLOR` environment
/// variable, or a stream that is not a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn new(color: bool, is_tty: bool) -> Self {
        let env_no_color = env::var_os("NO_COLOR").is_some();
        Self { enabled: color && !env_no_color && is_tty }
    }

    pub fn failure(&self, text: &str) -> String {
        if self.enabled { text.red().to_string() } else { text.to_string() }
    }

    pub fn skip(&self, text: &str) -> String {
        if self.enabled { text.yellow().to_string() } else { text.to_string() }
    }

    pub fn location(&self, text: &str) -> String {
        if self.enabled { text.cyan().to_string() } else { text.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_style_passes_text_through() {
        let style = Style { enabled: false };
        assert_eq!(style.failure("F"), "F");
        assert_eq!(style.skip("S"), "S");
        assert_eq!(style.location("a_test.rs:1"), "a_test.rs:1");
    }

    #[test]
    fn enabled_style_paints() {
        let style = Style { enabled: true };
        assert_eq!(style.failure("F"), "\u{1b}[31mF\u{1b}[39m");
        assert_eq!(style.skip("S"), "\u{1b}[33mS\u{1b}[39m");
    }

    #[test]
    fn no_color_flag_disables() {
        let style = Style::new(false, true);
        assert_eq!(style.failure("F"), "F");
    }
}
