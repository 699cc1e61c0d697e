//! Common test utilities and constants
//!
//! Shared functionality used across all test modules: an in-memory
//! [`MangaApi`] and builders for manga, chapters and at-home answers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use dexreader::api::MangaApi;
use dexreader::api::models::{AtHomeChapter, AtHomeResponse};
use dexreader::pagination::PageSlice;
use dexreader::types::{Chapter, ChapterQuery, Manga};
use dexreader::{Error, Result};

#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(30);
#[allow(dead_code)]
pub const TEST_MANGA_TITLE: &str = "The Summer You Were There";
#[allow(dead_code)]
pub const IMAGE_SERVER: &str = "https://uploads.example.org";

#[allow(dead_code)]
pub fn manga(id: &str, title: &str) -> Manga {
    Manga {
        id: id.to_string(),
        title: title.to_string(),
        cover_url: None,
        description: None,
        authors: Vec::new(),
        tags: Vec::new(),
        status: None,
    }
}

#[allow(dead_code)]
pub fn chapter(id: &str, number: usize, manga_id: &str) -> Chapter {
    Chapter {
        id: id.to_string(),
        manga_id: Some(manga_id.to_string()),
        number: Some(number.to_string()),
        volume: None,
        title: None,
        page_count: 0,
        translated_language: Some("en".to_string()),
        publish_at: None,
    }
}

/// `count` chapters `c1..=c{count}` of manga `m1`.
#[allow(dead_code)]
pub fn chapters(count: usize) -> Vec<Chapter> {
    (1..=count).map(|n| chapter(&format!("c{}", n), n, "m1")).collect()
}

#[allow(dead_code)]
pub fn at_home(hash: &str, data: &[&str], data_saver: &[&str]) -> AtHomeResponse {
    AtHomeResponse {
        base_url: IMAGE_SERVER.to_string(),
        chapter: AtHomeChapter {
            hash: hash.to_string(),
            data: data.iter().map(|s| s.to_string()).collect(),
            data_saver: data_saver.iter().map(|s| s.to_string()).collect(),
        },
    }
}

/// In-memory API with scripted answers and a log of the calls it received.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeApi {
    pub popular: Vec<Manga>,
    pub updated: Vec<Manga>,
    pub catalogue: Vec<Manga>,
    pub chapters: Vec<Chapter>,
    pub report_total: bool,
    pub pages: HashMap<String, AtHomeResponse>,

    pub fail_popular: bool,
    pub fail_updated: bool,
    pub fail_next_chapter_page: AtomicBool,

    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chapters(chapters: Vec<Chapter>) -> Self {
        let pages = chapters
            .iter()
            .map(|c| {
                let files = [format!("{}-1.png", c.id), format!("{}-2.png", c.id)];
                let files: Vec<&str> = files.iter().map(String::as_str).collect();
                (c.id.clone(), at_home(&format!("hash-{}", c.id), &files, &[]))
            })
            .collect();

        Self {
            chapters,
            pages,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MangaApi for FakeApi {
    async fn popular_manga(&self) -> Result<Vec<Manga>> {
        self.record("popular".to_string());
        if self.fail_popular {
            return Err(Error::api(500, "popular unavailable"));
        }
        Ok(self.popular.clone())
    }

    async fn recently_updated(&self, since: NaiveDateTime) -> Result<Vec<Manga>> {
        self.record(format!("updated {}", since));
        if self.fail_updated {
            return Err(Error::rate_limit(Some(5)));
        }
        Ok(self.updated.clone())
    }

    async fn search_manga(&self, query: &str) -> Result<Vec<Manga>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.record(format!("search {}", query));
        let needle = query.to_lowercase();
        Ok(self
            .catalogue
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn manga(&self, manga_id: &str) -> Result<Manga> {
        self.record(format!("manga {}", manga_id));
        self.catalogue
            .iter()
            .find(|m| m.id == manga_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("manga {}", manga_id)))
    }

    async fn chapter_page(
        &self,
        query: &ChapterQuery,
        offset: usize,
        limit: usize,
    ) -> Result<PageSlice<Chapter>> {
        self.record(format!("chapters {} {} {}", query.manga_id, offset, limit));
        if self.fail_next_chapter_page.swap(false, Ordering::SeqCst) {
            return Err(Error::api(503, "try again"));
        }

        let items: Vec<Chapter> = self
            .chapters
            .iter()
            .filter(|c| c.manga_id.as_deref() == Some(query.manga_id.as_str()))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        if self.report_total {
            let total = self
                .chapters
                .iter()
                .filter(|c| c.manga_id.as_deref() == Some(query.manga_id.as_str()))
                .count();
            Ok(PageSlice::with_total(items, total))
        } else {
            Ok(PageSlice::new(items))
        }
    }

    async fn at_home_server(&self, chapter_id: &str) -> Result<AtHomeResponse> {
        self.record(format!("at-home {}", chapter_id));
        self.pages
            .get(chapter_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("chapter {}", chapter_id)))
    }
}
