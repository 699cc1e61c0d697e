//! Wire models of the MangaDex REST API.
//!
//! Only the fields the client reads are declared; serde ignores the rest.

use serde::Deserialize;
use std::collections::HashMap;

/// A localized string map (`{"en": "...", "ja-ro": "..."}`).
pub type LocalizedString = HashMap<String, String>;

/// Collection envelope (`/manga`, `/chapter`).
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionResponse<T> {
    pub data: Vec<T>,
    pub total: Option<usize>,
}

/// Single entity envelope (`/manga/{id}`).
#[derive(Debug, Clone, Deserialize)]
pub struct EntityResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MangaData {
    pub id: String,
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaAttributes {
    #[serde(default)]
    pub title: LocalizedString,
    #[serde(default)]
    pub alt_titles: Vec<LocalizedString>,
    #[serde(default)]
    pub description: LocalizedString,
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub attributes: TagAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagAttributes {
    #[serde(default)]
    pub name: LocalizedString,
}

/// A relationship entry. `attributes` is only present when the relation was
/// expanded with `includes[]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub attributes: Option<RelationshipAttributes>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAttributes {
    pub name: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterData {
    pub id: String,
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    pub title: Option<String>,
    pub chapter: Option<String>,
    pub volume: Option<String>,
    #[serde(default)]
    pub pages: usize,
    pub translated_language: Option<String>,
    pub publish_at: Option<String>,
}

/// Answer of `/at-home/server/{chapterId}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeResponse {
    pub base_url: String,
    pub chapter: AtHomeChapter,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeChapter {
    pub hash: String,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub data_saver: Vec<String>,
}
