//! Request URL construction for every endpoint the client calls.

use chrono::NaiveDateTime;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::ChapterQuery;

/// Format of `updatedAtSince`: no zone, no fractional seconds.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Builds endpoint URLs from a [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct Endpoints {
    api_base: Url,
    uploads_base: String,
    popular_limit: usize,
    search_limit: usize,
    updated_limit: usize,
    cover_size: Option<u32>,
}

impl Endpoints {
    /// # Errors
    ///
    /// * [`Error::Config`] - If `api_base` is not a usable base URL
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| Error::config(format!("invalid api_base '{}': {}", config.api_base, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(Error::config(format!(
                "api_base '{}' cannot be a base URL",
                config.api_base
            )));
        }

        Ok(Self {
            api_base,
            uploads_base: config.uploads_base.trim_end_matches('/').to_string(),
            popular_limit: config.popular_limit,
            search_limit: config.search_limit,
            updated_limit: config.updated_limit,
            cover_size: config.cover_size,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Highest rated manga: `/manga?limit=51&includes[]=cover_art&order[rating]=desc`.
    pub fn popular(&self) -> Url {
        let mut url = self.endpoint(&["manga"]);
        url.query_pairs_mut()
            .append_pair("limit", &self.popular_limit.to_string())
            .append_pair("includes[]", "cover_art")
            .append_pair("order[rating]", "desc");
        url
    }

    /// Chapters updated since `since`, newest first.
    pub fn recent_chapters(&self, since: NaiveDateTime) -> Url {
        let mut url = self.endpoint(&["chapter"]);
        url.query_pairs_mut()
            .append_pair("limit", &self.updated_limit.to_string())
            .append_pair("order[updatedAt]", "desc")
            .append_pair("updatedAtSince", &since.format(DATE_FORMAT).to_string());
        url
    }

    /// A batch of manga by id, with cover relations expanded.
    pub fn manga_by_ids(&self, ids: &[String]) -> Url {
        let mut url = self.endpoint(&["manga"]);
        {
            let mut query = url.query_pairs_mut();
            for id in ids {
                query.append_pair("ids[]", id);
            }
            query
                .append_pair("limit", &ids.len().to_string())
                .append_pair("includes[]", "cover_art");
        }
        url
    }

    /// Title search.
    pub fn search(&self, title: &str) -> Url {
        let mut url = self.endpoint(&["manga"]);
        url.query_pairs_mut()
            .append_pair("title", title)
            .append_pair("limit", &self.search_limit.to_string())
            .append_pair("includes[]", "cover_art");
        url
    }

    /// One page of a manga's chapter list.
    pub fn chapters(&self, query: &ChapterQuery, offset: usize, limit: usize) -> Url {
        let mut url = self.endpoint(&["chapter"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("manga", &query.manga_id)
                .append_pair("limit", &limit.to_string())
                .append_pair("offset", &offset.to_string());
            for lang in &query.translated_languages {
                pairs.append_pair("translatedLanguage[]", lang);
            }
            pairs.append_pair(
                "order[chapter]",
                if query.ascending { "asc" } else { "desc" },
            );
        }
        url
    }

    /// Image server lookup for a chapter.
    pub fn at_home(&self, chapter_id: &str) -> Url {
        self.endpoint(&["at-home", "server", chapter_id])
    }

    /// A single manga with cover, author and artist relations expanded.
    pub fn manga(&self, manga_id: &str) -> Url {
        let mut url = self.endpoint(&["manga", manga_id]);
        url.query_pairs_mut()
            .append_pair("includes[]", "cover_art")
            .append_pair("includes[]", "author")
            .append_pair("includes[]", "artist");
        url
    }

    /// Cover image URL for a manga and cover file name.
    ///
    /// With a cover size of 512 this is
    /// `https://uploads.mangadex.org/covers/{manga_id}/{file}.512.jpg`.
    pub fn cover_url(&self, manga_id: &str, file_name: &str) -> String {
        match self.cover_size {
            Some(size) => format!(
                "{}/covers/{}/{}.{}.jpg",
                self.uploads_base, manga_id, file_name, size
            ),
            None => format!("{}/covers/{}/{}", self.uploads_base, manga_id, file_name),
        }
    }
}
