use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashSet;

use super::{
    MangaApi,
    models::{
        AtHomeResponse, ChapterData, CollectionResponse, EntityResponse, LocalizedString,
        MangaData, Relationship,
    },
    urls::Endpoints,
};
use crate::{
    config::ClientConfig,
    error::Result,
    net::HttpClient,
    pagination::PageSlice,
    types::{Chapter, ChapterQuery, Manga},
};

/// Title shown when a record carries no usable title.
pub const NO_TITLE: &str = "No Title Available";

/// Client for the MangaDex REST API.
///
/// Issues plain GET requests against the endpoints of a [`ClientConfig`] and
/// maps the responses onto [`Manga`] and [`Chapter`]. Failures are returned
/// as typed errors; nothing is cached or retried.
///
/// # Examples
///
/// ```rust,no_run
/// use dexreader::api::{MangaApi, MangaDexClient};
///
/// # async fn example() -> dexreader::Result<()> {
/// let client = MangaDexClient::new()?;
/// let updated = client.recently_updated_today().await?;
/// for manga in &updated {
///     println!("{} ({:?})", manga.title, manga.cover_url);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MangaDexClient {
    client: HttpClient,
    endpoints: Endpoints,
    config: ClientConfig,
}

impl MangaDexClient {
    /// Creates a client for the public API with default settings.
    pub fn new() -> Result<Self> {
        let config = ClientConfig::default();
        Ok(Self {
            client: HttpClient::new(),
            endpoints: Endpoints::new(&config)?,
            config,
        })
    }

    /// Creates a client from a custom configuration.
    ///
    /// # Errors
    ///
    /// * [`Error::Config`](crate::Error::Config) - If the configuration is invalid
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: HttpClient::with_config(&config)?,
            endpoints: Endpoints::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// A [`ChapterQuery`] for `manga_id` using the configured languages.
    pub fn chapter_query(&self, manga_id: impl Into<String>) -> ChapterQuery {
        ChapterQuery {
            manga_id: manga_id.into(),
            translated_languages: self.config.translated_languages.clone(),
            ascending: true,
        }
    }

    /// Picks the display title from a title map and its alternatives.
    ///
    /// English wins, first from the main map and then from the alternative
    /// titles; after that `en-us`, the romanized and the original Japanese
    /// titles, then the non-blank entry with the smallest language code.
    pub fn pick_title(title: &LocalizedString, alt_titles: &[LocalizedString]) -> String {
        fn non_blank(s: &str) -> bool {
            !s.trim().is_empty()
        }

        if let Some(en) = title.get("en").filter(|t| non_blank(t)) {
            return en.trim().to_string();
        }
        if let Some(en) = alt_titles
            .iter()
            .filter_map(|alt| alt.get("en"))
            .find(|t| non_blank(t))
        {
            return en.trim().to_string();
        }
        for lang in ["en-us", "ja-ro", "ja"] {
            if let Some(t) = title.get(lang).filter(|t| non_blank(t)) {
                return t.trim().to_string();
            }
        }

        title
            .iter()
            .filter(|(_, t)| non_blank(t))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, t)| t.trim().to_string())
            .unwrap_or_else(|| NO_TITLE.to_string())
    }

    /// File name of the first cover relation, if the relation was expanded.
    pub fn cover_file_name(relationships: &[Relationship]) -> Option<&str> {
        relationships
            .iter()
            .find(|rel| rel.rel_type == "cover_art")
            .and_then(|rel| rel.attributes.as_ref())
            .and_then(|attr| attr.file_name.as_deref())
    }

    /// Maps a manga record onto [`Manga`].
    pub fn map_manga(&self, data: MangaData) -> Manga {
        let title = Self::pick_title(&data.attributes.title, &data.attributes.alt_titles);

        let description = data
            .attributes
            .description
            .get("en")
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let authors: Vec<String> = data
            .relationships
            .iter()
            .filter(|rel| rel.rel_type == "author" || rel.rel_type == "artist")
            .filter_map(|rel| rel.attributes.as_ref().and_then(|a| a.name.clone()))
            .fold(Vec::new(), |mut acc, name| {
                if !acc.contains(&name) {
                    acc.push(name);
                }
                acc
            });

        let tags = data
            .attributes
            .tags
            .iter()
            .filter_map(|tag| {
                tag.attributes
                    .name
                    .get("en")
                    .or_else(|| tag.attributes.name.values().next())
                    .cloned()
            })
            .collect();

        let cover_url = Self::cover_file_name(&data.relationships)
            .map(|file| self.endpoints.cover_url(&data.id, file));

        Manga {
            id: data.id,
            title,
            cover_url,
            description,
            authors,
            tags,
            status: data.attributes.status,
        }
    }

    /// Maps a chapter record onto [`Chapter`].
    pub fn map_chapter(data: ChapterData) -> Chapter {
        let manga_id = data
            .relationships
            .iter()
            .find(|rel| rel.rel_type == "manga")
            .map(|rel| rel.id.clone());

        Chapter {
            id: data.id,
            manga_id,
            number: data.attributes.chapter,
            volume: data.attributes.volume,
            title: data.attributes.title,
            page_count: data.attributes.pages,
            translated_language: data.attributes.translated_language,
            publish_at: data.attributes.publish_at,
        }
    }

    /// Maps a chapter envelope onto a [`PageSlice`], keeping the total only
    /// when the server sent one.
    pub fn chapter_slice(response: CollectionResponse<ChapterData>) -> PageSlice<Chapter> {
        PageSlice {
            total: response.total,
            items: response.data.into_iter().map(Self::map_chapter).collect(),
        }
    }

    /// Manga ids referenced by a chapter list, first occurrence order.
    pub fn unique_manga_ids(chapters: &[ChapterData]) -> Vec<String> {
        let mut seen = HashSet::new();
        chapters
            .iter()
            .filter_map(|ch| ch.relationships.iter().find(|rel| rel.rel_type == "manga"))
            .filter(|rel| seen.insert(rel.id.clone()))
            .map(|rel| rel.id.clone())
            .collect()
    }

    async fn fetch_manga_list(&self, url: &url::Url) -> Result<Vec<Manga>> {
        let response: CollectionResponse<MangaData> = self.client.get_json(url).await?;
        Ok(response
            .data
            .into_iter()
            .map(|data| self.map_manga(data))
            .collect())
    }
}

#[async_trait]
impl MangaApi for MangaDexClient {
    async fn popular_manga(&self) -> Result<Vec<Manga>> {
        self.fetch_manga_list(&self.endpoints.popular()).await
    }

    async fn recently_updated(&self, since: NaiveDateTime) -> Result<Vec<Manga>> {
        let url = self.endpoints.recent_chapters(since);
        let chapters: CollectionResponse<ChapterData> = self.client.get_json(&url).await?;

        let ids = Self::unique_manga_ids(&chapters.data);
        if ids.is_empty() {
            tracing::debug!(since = %since, "no chapters updated");
            return Ok(Vec::new());
        }

        let mut manga = self
            .fetch_manga_list(&self.endpoints.manga_by_ids(&ids))
            .await?;

        // The batch endpoint ignores the id order
        manga.sort_by_key(|m| ids.iter().position(|id| *id == m.id).unwrap_or(usize::MAX));
        Ok(manga)
    }

    async fn search_manga(&self, query: &str) -> Result<Vec<Manga>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_manga_list(&self.endpoints.search(query)).await
    }

    async fn manga(&self, manga_id: &str) -> Result<Manga> {
        let url = self.endpoints.manga(manga_id);
        let response: EntityResponse<MangaData> = self.client.get_json(&url).await?;
        Ok(self.map_manga(response.data))
    }

    async fn chapter_page(
        &self,
        query: &ChapterQuery,
        offset: usize,
        limit: usize,
    ) -> Result<PageSlice<Chapter>> {
        let url = self.endpoints.chapters(query, offset, limit);
        let response: CollectionResponse<ChapterData> = self.client.get_json(&url).await?;
        Ok(Self::chapter_slice(response))
    }

    async fn at_home_server(&self, chapter_id: &str) -> Result<AtHomeResponse> {
        self.client.get_json(&self.endpoints.at_home(chapter_id)).await
    }
}
