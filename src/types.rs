//! Core data types for manga, chapters and resolved pages.
//!
//! - [`Manga`] - A series as returned by the manga endpoints
//! - [`Chapter`] - A single chapter entry from the chapter list
//! - [`PageList`] - The ordered page image URLs of one chapter
//! - [`ChapterQuery`] - Which chapters a details view lists
//! - [`ImageQuality`] - Full quality or data-saver page images
//!
//! These mirror what the MangaDex API returns; the only derived values are
//! the picked display title and the cover URL.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A manga series.
///
/// # Examples
///
/// ```rust
/// use dexreader::types::Manga;
///
/// let manga = Manga {
///     id: "a1c7c817-4e59-43b7-9365-09675a149a6f".to_string(),
///     title: "One Piece".to_string(),
///     cover_url: None,
///     description: Some("A story about pirates".to_string()),
///     authors: vec!["Oda Eiichiro".to_string()],
///     tags: vec!["Action".to_string()],
///     status: Some("ongoing".to_string()),
/// };
/// assert!(manga.cover_url.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    /// MangaDex UUID
    pub id: String,

    /// Display title
    pub title: String,

    /// Cover thumbnail URL, present when the record carried a cover relation
    pub cover_url: Option<String>,

    /// English description
    pub description: Option<String>,

    /// Authors and artists, when the relation was expanded
    #[serde(default)]
    pub authors: Vec<String>,

    /// Tag names
    #[serde(default)]
    pub tags: Vec<String>,

    /// Publication status (`ongoing`, `completed`, ...)
    pub status: Option<String>,
}

/// A chapter entry.
///
/// The chapter number is kept as the API string because MangaDex uses
/// values like `"12.5"` and occasionally none at all for oneshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// MangaDex UUID
    pub id: String,

    /// Owning manga, when the relation was present
    pub manga_id: Option<String>,

    /// Chapter number as published
    pub number: Option<String>,

    /// Volume as published
    pub volume: Option<String>,

    /// Chapter title
    pub title: Option<String>,

    /// Number of pages reported by the API
    pub page_count: usize,

    /// Translation language code
    pub translated_language: Option<String>,

    /// Publication timestamp as sent by the API
    pub publish_at: Option<String>,
}

impl Chapter {
    /// Numeric chapter value, if the number parses.
    ///
    /// ```rust
    /// # use dexreader::types::Chapter;
    /// # let mut chapter = Chapter {
    /// #     id: "c".into(), manga_id: None, number: Some("5.5".into()), volume: None,
    /// #     title: None, page_count: 0, translated_language: None, publish_at: None,
    /// # };
    /// assert_eq!(chapter.number_value(), Some(5.5));
    /// chapter.number = None;
    /// assert_eq!(chapter.number_value(), None);
    /// ```
    pub fn number_value(&self) -> Option<f64> {
        self.number.as_deref().and_then(|n| n.trim().parse().ok())
    }

    /// Line shown in chapter lists: `Chapter 12: Title`.
    pub fn display_title(&self) -> String {
        let number = self.number.as_deref().unwrap_or("?");
        let title = self
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("No Title");
        format!("Chapter {}: {}", number, title)
    }
}

/// Which image set of a chapter to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    /// Original page images (`/data/`)
    #[default]
    Data,
    /// Compressed page images (`/data-saver/`)
    DataSaver,
}

impl ImageQuality {
    /// Path segment of this quality on the image server.
    pub fn path_segment(self) -> &'static str {
        match self {
            ImageQuality::Data => "data",
            ImageQuality::DataSaver => "data-saver",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ImageQuality::Data => ImageQuality::DataSaver,
            ImageQuality::DataSaver => ImageQuality::Data,
        }
    }
}

/// Ordered page image URLs of one chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageList {
    pub chapter_id: String,

    /// Image set the URLs point into; may differ from the requested one
    /// when the server only had data-saver images
    pub quality: ImageQuality,

    pub urls: Vec<String>,
}

impl PageList {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Parameters of a chapter list.
///
/// ```rust
/// use dexreader::types::ChapterQueryBuilder;
///
/// let query = ChapterQueryBuilder::default()
///     .manga_id("a1c7c817")
///     .build()
///     .unwrap();
/// assert_eq!(query.translated_languages, vec!["en".to_string()]);
/// assert!(query.ascending);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into))]
pub struct ChapterQuery {
    pub manga_id: String,
    #[builder(default = "vec![\"en\".to_string()]")]
    pub translated_languages: Vec<String>,
    /// Order by chapter number ascending (`true`) or descending
    #[builder(default = "true")]
    pub ascending: bool,
}

impl ChapterQuery {
    /// English chapters of a manga, in reading order.
    pub fn for_manga(manga_id: impl Into<String>) -> Self {
        Self {
            manga_id: manga_id.into(),
            translated_languages: vec!["en".to_string()],
            ascending: true,
        }
    }
}

impl From<&str> for ChapterQuery {
    fn from(manga_id: &str) -> Self {
        ChapterQuery::for_manga(manga_id)
    }
}

impl From<String> for ChapterQuery {
    fn from(manga_id: String) -> Self {
        ChapterQuery::for_manga(manga_id)
    }
}
