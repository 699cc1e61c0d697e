//! Chapter page resolution and reading position.
//!
//! A chapter id is turned into page image URLs in two steps: the at-home
//! endpoint names an image server, the chapter hash and the page files, and
//! [`resolve_page_urls`] joins them into
//! `{baseUrl}/{data|data-saver}/{hash}/{file}`.
//!
//! [`ChapterReader`] keeps a chapter array and a position in it, resolving
//! pages as it steps from chapter to chapter.
//!
//! # Examples
//!
//! ```rust
//! use dexreader::reader::resolve_page_urls;
//! use dexreader::types::ImageQuality;
//!
//! let files = vec!["1-a.png".to_string(), "2-b.png".to_string()];
//! let urls = resolve_page_urls("https://cdn.example.org/", "abc123", &files, ImageQuality::Data).unwrap();
//!
//! assert_eq!(urls, vec![
//!     "https://cdn.example.org/data/abc123/1-a.png",
//!     "https://cdn.example.org/data/abc123/2-b.png",
//! ]);
//! ```

use crate::{
    api::{AtHomeResponse, MangaApi},
    error::{Error, Result},
    types::{Chapter, ImageQuality, PageList},
};

/// Joins an image server, chapter hash and page files into page URLs.
///
/// Page order is preserved. A trailing slash on `base_url` is ignored.
///
/// # Errors
///
/// * [`Error::Parse`] - If `base_url` or `hash` is empty
pub fn resolve_page_urls(
    base_url: &str,
    hash: &str,
    files: &[String],
    quality: ImageQuality,
) -> Result<Vec<String>> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(Error::parse("Base URL is empty"));
    }
    if hash.trim().is_empty() {
        return Err(Error::parse("Chapter hash is empty"));
    }

    Ok(files
        .iter()
        .map(|file| format!("{}/{}/{}/{}", base, quality.path_segment(), hash, file))
        .collect())
}

impl PageList {
    /// Resolves an at-home answer into a page list.
    ///
    /// When the requested image set is empty the other one is used, and the
    /// returned [`PageList::quality`] says which set the URLs point into.
    ///
    /// # Errors
    ///
    /// * [`Error::Parse`] - If the answer has no base URL or hash
    /// * [`Error::NotFound`] - If neither image set has pages
    pub fn from_at_home(
        chapter_id: &str,
        response: &AtHomeResponse,
        quality: ImageQuality,
    ) -> Result<Self> {
        let chapter = &response.chapter;
        let files_for = |q: ImageQuality| match q {
            ImageQuality::Data => &chapter.data,
            ImageQuality::DataSaver => &chapter.data_saver,
        };

        let quality = if files_for(quality).is_empty() {
            quality.toggled()
        } else {
            quality
        };

        let files = files_for(quality);
        if files.is_empty() {
            return Err(Error::not_found(format!(
                "No pages found for chapter {}",
                chapter_id
            )));
        }

        Ok(Self {
            chapter_id: chapter_id.to_string(),
            quality,
            urls: resolve_page_urls(&response.base_url, &chapter.hash, files, quality)?,
        })
    }
}

/// Position in a chapter array and in the pages of the open chapter.
///
/// # Examples
///
/// ```rust,no_run
/// use dexreader::prelude::*;
///
/// # async fn example(chapters: Vec<Chapter>) -> dexreader::Result<()> {
/// let api = MangaDexClient::new()?;
/// let mut reader = ChapterReader::new(chapters, ImageQuality::Data);
///
/// reader.open(&api, 0).await?;
/// while reader.next_page() {}
/// if !reader.next_chapter(&api).await? {
///     println!("last chapter reached");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChapterReader {
    chapters: Vec<Chapter>,
    quality: ImageQuality,
    index: Option<usize>,
    pages: Option<PageList>,
    page: usize,
}

impl ChapterReader {
    /// Creates a reader over `chapters` with no chapter open.
    pub fn new(chapters: Vec<Chapter>, quality: ImageQuality) -> Self {
        Self {
            chapters,
            quality,
            index: None,
            pages: None,
            page: 0,
        }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Replaces the chapter array, keeping the open chapter when it is still
    /// present (as when a paginated list grew).
    pub fn set_chapters(&mut self, chapters: Vec<Chapter>) {
        let current_id = self.current_chapter().map(|c| c.id.clone());
        self.chapters = chapters;
        self.index = current_id.and_then(|id| self.chapters.iter().position(|c| c.id == id));
        if self.index.is_none() {
            self.pages = None;
            self.page = 0;
        }
    }

    pub fn quality(&self) -> ImageQuality {
        self.quality
    }

    /// Changes the image set used by the next [`open()`](ChapterReader::open).
    pub fn set_quality(&mut self, quality: ImageQuality) {
        self.quality = quality;
    }

    /// Index of the open chapter.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.index.and_then(|i| self.chapters.get(i))
    }

    /// Page URLs of the open chapter; empty when nothing is open.
    pub fn pages(&self) -> &[String] {
        self.pages.as_ref().map(|p| p.urls.as_slice()).unwrap_or(&[])
    }

    pub fn page_list(&self) -> Option<&PageList> {
        self.pages.as_ref()
    }

    /// Zero-based page index within the open chapter.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn current_page_url(&self) -> Option<&str> {
        self.pages().get(self.page).map(String::as_str)
    }

    /// `(page, page_count)` with a one-based page, or `None` when nothing is
    /// open.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.pages.as_ref().map(|p| (self.page + 1, p.len()))
    }

    pub fn has_next_chapter(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.chapters.len())
    }

    pub fn has_previous_chapter(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    /// Opens the chapter at `index` and resolves its pages.
    ///
    /// The page position is reset to the first page. On failure the
    /// previously open chapter stays open.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`] - If `index` is out of range
    /// * All errors from [`MangaApi::chapter_pages`]
    pub async fn open<A>(&mut self, api: &A, index: usize) -> Result<&PageList>
    where
        A: MangaApi + ?Sized,
    {
        let chapter = self.chapters.get(index).ok_or_else(|| {
            Error::not_found(format!(
                "Chapter at index {} of {}",
                index,
                self.chapters.len()
            ))
        })?;

        let pages = api.chapter_pages(&chapter.id, self.quality).await?;
        tracing::debug!(
            chapter = %chapter.id,
            index,
            pages = pages.len(),
            "opened chapter"
        );

        self.index = Some(index);
        self.page = 0;
        Ok(self.pages.insert(pages))
    }

    /// Opens the following chapter; `Ok(false)` at the last one.
    pub async fn next_chapter<A>(&mut self, api: &A) -> Result<bool>
    where
        A: MangaApi + ?Sized,
    {
        let next = match self.index {
            Some(i) if i + 1 < self.chapters.len() => i + 1,
            Some(_) => return Ok(false),
            None if !self.chapters.is_empty() => 0,
            None => return Ok(false),
        };
        self.open(api, next).await?;
        Ok(true)
    }

    /// Opens the preceding chapter; `Ok(false)` at the first one.
    pub async fn previous_chapter<A>(&mut self, api: &A) -> Result<bool>
    where
        A: MangaApi + ?Sized,
    {
        match self.index {
            Some(i) if i > 0 => {
                self.open(api, i - 1).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Moves to the next page of the open chapter; `false` at the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.pages().len() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous page; `false` at the first page.
    pub fn previous_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to a page of the open chapter; `false` if out of range.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < self.pages().len() {
            self.page = page;
            true
        } else {
            false
        }
    }
}
