//! # dexreader - MangaDex reading client library
//!
//! dexreader is an async client for the public MangaDex API. It covers what a
//! reading app needs: the popular and recently updated lists of the home
//! screen, title search, paginated chapter lists, and resolution of a chapter
//! into page image URLs, plus the reading position that steps through them.
//!
//! ## Features
//!
//! - **Typed API Access**: the [`MangaApi`](api::MangaApi) trait and its
//!   MangaDex implementation
//! - **Load-More Lists**: a [`Paginator`](pagination::Paginator) that pages,
//!   accumulates and de-duplicates
//! - **Page Resolution**: at-home lookups turned into ordered page URLs, full
//!   quality or data saver
//! - **Reading Position**: a [`ChapterReader`](reader::ChapterReader) stepping
//!   across pages and chapters
//! - **Terminal Front-End**: an optional ratatui reader behind the `tui`
//!   feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dexreader::prelude::*;
//! use dexreader::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = MangaDexClient::new()?;
//!
//!     let feed = HomeFeed::load(&client).await;
//!     println!("{} popular, {} updated today", feed.popular.len(), feed.updated.len());
//!
//!     let results = client.search_manga("dungeon meshi").await?;
//!     let Some(manga) = results.first() else {
//!         return Ok(());
//!     };
//!
//!     let mut chapters = Paginator::new(client.config().chapter_page_size);
//!     let query = client.chapter_query(&manga.id);
//!     chapters.load_chapters(&client, &query).await?;
//!
//!     let mut reader = ChapterReader::new(chapters.into_items(), ImageQuality::Data);
//!     reader.open(&client, 0).await?;
//!     if let Some(url) = reader.current_page_url() {
//!         println!("first page: {}", url);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`api`]: the `MangaApi` trait, the MangaDex client, wire models and URLs
//! - [`pagination`]: page counter, accumulated list and end-of-data tracking
//! - [`reader`]: page URL resolution and the chapter reader
//! - [`feed`]: the home screen lists
//! - [`types`]: manga, chapters and page lists
//! - [`config`]: client configuration
//! - [`net`]: HTTP plumbing
//! - [`error`]: error handling

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod net;
pub mod pagination;
pub mod reader;
pub mod types;

#[cfg(feature = "tui")]
pub mod tui;

/// Prelude module for convenient imports.
///
/// ```rust
/// use dexreader::prelude::*;
///
/// let reader = ChapterReader::new(Vec::new(), ImageQuality::DataSaver);
/// assert!(reader.current_chapter().is_none());
/// ```
pub mod prelude {
    pub use crate::{
        api::{MangaApi, MangaDexClient},
        config::ClientConfig,
        feed::HomeFeed,
        pagination::{Identified, LoadRequest, PageSlice, Paginator},
        reader::ChapterReader,
        types::{Chapter, ChapterQuery, ImageQuality, Manga, PageList},
    };
}

// Re-export main types at crate root for direct access
pub use api::{MangaApi, MangaDexClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use types::{Chapter, ChapterQuery, ImageQuality, Manga, PageList};
