//! MangaDex API access.
//!
//! [`MangaApi`] is the seam between the screens and the network: the
//! pagination accumulator, the chapter reader and the home feed are written
//! against the trait, and [`MangaDexClient`] is the implementation that
//! talks to `api.mangadex.org`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dexreader::prelude::*;
//!
//! # async fn example() -> dexreader::Result<()> {
//! let client = MangaDexClient::new()?;
//!
//! let popular = client.popular_manga().await?;
//! let results = client.search_manga("frieren").await?;
//!
//! if let Some(manga) = results.first() {
//!     let first_page = client
//!         .chapter_page(&ChapterQuery::for_manga(&manga.id), 0, 100)
//!         .await?;
//!     if let Some(chapter) = first_page.items.first() {
//!         let pages = client.chapter_pages(&chapter.id, ImageQuality::Data).await?;
//!         println!("{} pages", pages.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};

use crate::{
    error::Result,
    pagination::PageSlice,
    types::{Chapter, ChapterQuery, ImageQuality, Manga, PageList},
};

pub mod client;
pub mod models;
pub mod urls;

pub use client::MangaDexClient;
pub use models::AtHomeResponse;
pub use urls::Endpoints;

/// Operations the client needs from the manga API.
///
/// # Required Methods
///
/// * [`popular_manga()`](MangaApi::popular_manga) - Highest rated manga
/// * [`recently_updated()`](MangaApi::recently_updated) - Manga with chapters updated since a time
/// * [`search_manga()`](MangaApi::search_manga) - Title search
/// * [`manga()`](MangaApi::manga) - A single manga
/// * [`chapter_page()`](MangaApi::chapter_page) - One page of a chapter list
/// * [`at_home_server()`](MangaApi::at_home_server) - Image server of a chapter
///
/// [`recently_updated_today()`](MangaApi::recently_updated_today) and
/// [`chapter_pages()`](MangaApi::chapter_pages) have default implementations
/// built on the required methods.
#[async_trait]
pub trait MangaApi: Send + Sync {
    /// Returns the highest rated manga, cover relations expanded.
    async fn popular_manga(&self) -> Result<Vec<Manga>>;

    /// Returns the manga whose chapters were updated since `since` (UTC),
    /// most recently updated first, each manga once.
    async fn recently_updated(&self, since: NaiveDateTime) -> Result<Vec<Manga>>;

    /// Searches manga by title. A blank query yields an empty list.
    async fn search_manga(&self, query: &str) -> Result<Vec<Manga>>;

    /// Fetches a single manga.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`](crate::Error::NotFound) - If the id is unknown
    async fn manga(&self, manga_id: &str) -> Result<Manga>;

    /// Fetches `limit` chapters of a chapter list starting at `offset`.
    async fn chapter_page(
        &self,
        query: &ChapterQuery,
        offset: usize,
        limit: usize,
    ) -> Result<PageSlice<Chapter>>;

    /// Looks up the image server, hash and page files of a chapter.
    async fn at_home_server(&self, chapter_id: &str) -> Result<AtHomeResponse>;

    /// Manga updated since the start of the current UTC day.
    async fn recently_updated_today(&self) -> Result<Vec<Manga>> {
        self.recently_updated(start_of_utc_day(Utc::now())).await
    }

    /// Resolves a chapter id into its ordered page image URLs.
    ///
    /// # Errors
    ///
    /// * All errors from [`at_home_server()`](MangaApi::at_home_server)
    /// * [`Error::Parse`](crate::Error::Parse) - If the server sent no hash or base URL
    /// * [`Error::NotFound`](crate::Error::NotFound) - If the chapter has no pages
    async fn chapter_pages(&self, chapter_id: &str, quality: ImageQuality) -> Result<PageList> {
        let response = self.at_home_server(chapter_id).await?;
        PageList::from_at_home(chapter_id, &response, quality)
    }
}

/// Midnight UTC of the day `now` falls on.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use dexreader::api::start_of_utc_day;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 9, 17, 42, 5).unwrap();
/// assert_eq!(start_of_utc_day(now).to_string(), "2024-03-09 00:00:00");
/// ```
pub fn start_of_utc_day(now: DateTime<Utc>) -> NaiveDateTime {
    now.date_naive().and_time(NaiveTime::default())
}
