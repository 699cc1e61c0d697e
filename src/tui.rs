//! TUI utilities and shared types for the dexreader terminal interface.
//!
//! Colors, the dark/light theme switch and the formatting helpers that turn
//! manga, chapters and reading positions into styled ratatui lines.
//!
//! # Features
//!
//! This module is only available when the `tui` feature is enabled.
//!
//! # Examples
//!
//! ```rust
//! use dexreader::tui::{Theme, ThemeMode, format_manga_title};
//! use dexreader::types::Manga;
//!
//! let manga = Manga {
//!     id: "123".to_string(),
//!     title: "One Piece".to_string(),
//!     cover_url: None,
//!     description: None,
//!     authors: vec!["Oda Eiichiro".to_string()],
//!     tags: vec!["Action".to_string()],
//!     status: Some("ongoing".to_string()),
//! };
//!
//! let theme = Theme::for_mode(ThemeMode::Dark);
//! let line = format_manga_title(&manga, &theme);
//! assert_eq!(line.spans[0].content, "One Piece");
//! ```

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use serde::{Deserialize, Serialize};

use crate::{
    reader::ChapterReader,
    types::{Chapter, ImageQuality, Manga},
};

/// Which palette the interface draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "Dark",
            ThemeMode::Light => "Light",
        }
    }
}

/// Color palette of the interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub mode: ThemeMode,
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub background: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            primary: Color::Rgb(75, 85, 255),
            accent: Color::Rgb(255, 152, 0),
            success: Color::Rgb(76, 175, 80),
            warning: Color::Rgb(255, 193, 7),
            error: Color::Rgb(244, 67, 54),
            info: Color::Rgb(33, 150, 243),
            background: Color::Reset,
            text_primary: Color::Rgb(255, 255, 255),
            text_secondary: Color::Rgb(189, 189, 189),
            text_muted: Color::Rgb(117, 117, 117),
            border: Color::Rgb(66, 66, 66),
            border_focus: Color::Rgb(75, 85, 255),
        }
    }

    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            primary: Color::Rgb(40, 53, 147),
            accent: Color::Rgb(230, 81, 0),
            success: Color::Rgb(46, 125, 50),
            warning: Color::Rgb(191, 144, 0),
            error: Color::Rgb(198, 40, 40),
            info: Color::Rgb(21, 101, 192),
            background: Color::Rgb(250, 250, 250),
            text_primary: Color::Rgb(33, 33, 33),
            text_secondary: Color::Rgb(66, 66, 66),
            text_muted: Color::Rgb(140, 140, 140),
            border: Color::Rgb(189, 189, 189),
            border_focus: Color::Rgb(40, 53, 147),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Base style of a screen: primary text on the theme background.
    pub fn base(&self) -> Style {
        Style::default().fg(self.text_primary).bg(self.background)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .bg(self.primary)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Severity of a status bar message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusKind {
    pub fn color(self, theme: &Theme) -> Color {
        match self {
            StatusKind::Info => theme.info,
            StatusKind::Success => theme.success,
            StatusKind::Warning => theme.warning,
            StatusKind::Error => theme.error,
        }
    }
}

/// Title line of a manga list entry, followed by its authors when known.
pub fn format_manga_title(manga: &Manga, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        manga.title.clone(),
        Style::default()
            .fg(theme.text_primary)
            .add_modifier(Modifier::BOLD),
    )];

    if !manga.authors.is_empty() {
        spans.push(Span::raw(" by "));
        spans.push(Span::styled(
            manga.authors.join(", "),
            Style::default().fg(theme.accent),
        ));
    }

    Line::from(spans)
}

/// Chapter list entry: `Chapter {n}: {title}`, then the volume and page count.
pub fn format_chapter_title(chapter: &Chapter, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        chapter.display_title(),
        Style::default().fg(theme.text_primary),
    )];

    if let Some(volume) = chapter.volume.as_deref().filter(|v| !v.is_empty()) {
        spans.push(Span::styled(
            format!("  Vol. {}", volume),
            Style::default().fg(theme.text_secondary),
        ));
    }
    if chapter.page_count > 0 {
        spans.push(Span::styled(
            format!("  ({} pages)", chapter.page_count),
            Style::default().fg(theme.text_muted),
        ));
    }

    Line::from(spans)
}

/// Tags as one comma-separated line, or a muted "None".
pub fn format_tags(tags: &[String], theme: &Theme) -> Line<'static> {
    if tags.is_empty() {
        Line::from(Span::styled("None", Style::default().fg(theme.text_muted)))
    } else {
        Line::from(Span::styled(
            tags.join(", "),
            Style::default().fg(theme.text_secondary),
        ))
    }
}

/// Wraps a description at word boundaries to lines of at most `width` chars.
pub fn format_description(description: Option<&str>, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let Some(desc) = description.filter(|d| !d.trim().is_empty()) else {
        return vec![Line::from(Span::styled(
            "No description available",
            Style::default().fg(theme.text_muted),
        ))];
    };

    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in desc.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = current.chars().count() + word.chars().count() + 1;
            if !current.is_empty() && needed > width {
                lines.push(Line::from(std::mem::take(&mut current)));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(Line::from(current));
        }
    }

    lines
}

/// `Page 3/20` for the open chapter, or `No chapter open`.
pub fn format_position(reader: &ChapterReader) -> String {
    match reader.position() {
        Some((page, total)) => format!("Page {}/{}", page, total),
        None => "No chapter open".to_string(),
    }
}

pub fn quality_label(quality: ImageQuality) -> &'static str {
    match quality {
        ImageQuality::Data => "Full quality",
        ImageQuality::DataSaver => "Data saver",
    }
}

/// A `Prefix: message` line in the color of `kind`.
pub fn status_line(kind: StatusKind, message: &str, theme: &Theme) -> Line<'static> {
    let prefix = match kind {
        StatusKind::Info => "Info",
        StatusKind::Success => "Success",
        StatusKind::Warning => "Warning",
        StatusKind::Error => "Error",
    };
    let color = kind.color(theme);

    Line::from(vec![
        Span::styled(
            format!("{}:", prefix),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(message.to_string(), Style::default().fg(color)),
    ])
}

/// Truncates text to `width` characters, ending in `...` when cut.
///
/// ```rust
/// use dexreader::tui::truncate_text;
///
/// assert_eq!(truncate_text("This is a very long text", 10), "This is...");
/// ```
pub fn truncate_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else if width > 3 {
        let kept: String = text.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        text.chars().take(width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(Theme::for_mode(ThemeMode::Light).mode, ThemeMode::Light);
        assert_ne!(Theme::dark().background, Theme::light().background);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Hello World", 5), "He...");
        assert_eq!(truncate_text("Hi", 10), "Hi");
        assert_eq!(truncate_text("Test", 3), "Tes");
        assert_eq!(truncate_text("進撃の巨人です", 5), "進撃...");
    }

    #[test]
    fn test_format_description_wraps() {
        let theme = Theme::dark();
        let lines = format_description(Some("one two three four"), 9, &theme);
        let rendered: Vec<String> = lines.iter().map(text).collect();
        assert_eq!(rendered, vec!["one two", "three", "four"]);

        let empty = format_description(None, 20, &theme);
        assert_eq!(text(&empty[0]), "No description available");
    }

    #[test]
    fn test_format_chapter_title() {
        let chapter = Chapter {
            id: "c1".to_string(),
            manga_id: None,
            number: Some("12".to_string()),
            volume: Some("2".to_string()),
            title: None,
            page_count: 18,
            translated_language: None,
            publish_at: None,
        };
        assert_eq!(
            text(&format_chapter_title(&chapter, &Theme::dark())),
            "Chapter 12: No Title  Vol. 2  (18 pages)"
        );
    }

    #[test]
    fn test_format_position_without_chapter() {
        let reader = ChapterReader::new(Vec::new(), ImageQuality::Data);
        assert_eq!(format_position(&reader), "No chapter open");
    }
}
