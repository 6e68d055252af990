//! Terminal rendering of the surface

use super::Surface;
use crate::Result;
use std::io::Write;
use unicode_width::UnicodeWidthChar;

/// Clear screen and move the cursor home
const CLEAR: &str = "\x1b[2J\x1b[H";

const HELP: &str =
    "Enter speak/pause/resume  Ctrl-S save  Alt+v voice  Alt+=/- speed  Alt+s type speed  Ctrl-C quit";

/// Cut `text` to at most `width` terminal columns
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Lines describing the surface, each fitted to `width` columns
pub fn render_lines(surface: &Surface, backend: &str, width: usize) -> Vec<String> {
    let voice = match surface.voice_select.selected() {
        Some(option) => format!("{} ({})", option.label, option.value),
        None => "none".to_string(),
    };

    let mut lines = vec![
        format!("speechpad {} [{}]", crate::VERSION, backend),
        format!("Text: {}", surface.text.value()),
        format!(
            "[ {} ]  Voice: {}  Speed: {}",
            surface.button,
            voice,
            surface.speed.label()
        ),
    ];
    if surface.loading.is_visible() {
        lines.push("Loading...".to_string());
    }
    if let Some(status) = surface.status.as_ref() {
        lines.push(status.clone());
    }
    lines.push(HELP.to_string());

    lines
        .iter()
        .map(|line| truncate_to_width(line, width))
        .collect()
}

/// Redraw the whole surface
///
/// Uses "\r\n" line endings since the terminal is in raw mode.
pub fn draw<W: Write>(out: &mut W, surface: &Surface, backend: &str, width: usize) -> Result<()> {
    let lines = render_lines(surface, backend, width);
    write!(out, "{}{}", CLEAR, lines.join("\r\n"))?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::Voice;
    use crate::ui::ButtonLabel;

    #[test]
    fn test_truncate_wide_chars() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("世界", 3), "世");
        assert_eq!(truncate_to_width("ok", 10), "ok");
    }

    #[test]
    fn test_render_lines_show_widgets() {
        let mut surface = Surface::default();
        surface.text.set("Hello");
        surface.button = ButtonLabel::Pause;
        surface
            .voice_select
            .set_options(&[Voice::new("1", "Samantha", "en-US")]);
        surface.loading.show();

        let lines = render_lines(&surface, "fake", 200);
        assert!(lines.iter().any(|l| l == "Text: Hello"));
        assert!(lines
            .iter()
            .any(|l| l == "[ Pause ]  Voice: Samantha (en-US)  Speed: 1x"));
        assert!(lines.iter().any(|l| l == "Loading..."));
    }

    #[test]
    fn test_loading_hidden() {
        let surface = Surface::default();
        let lines = render_lines(&surface, "fake", 200);
        assert!(!lines.iter().any(|l| l == "Loading..."));
        assert!(lines.iter().any(|l| l.contains("Voice: none")));
    }
}
