//! Home screen lists.

use crate::{api::MangaApi, types::Manga};

/// Popular and recently updated manga, loaded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeFeed {
    pub popular: Vec<Manga>,
    pub updated: Vec<Manga>,
}

impl HomeFeed {
    /// Fetches both lists concurrently.
    ///
    /// A list whose request fails is logged and left empty, so the other
    /// list still shows; this never fails as a whole.
    pub async fn load<A>(api: &A) -> Self
    where
        A: MangaApi + ?Sized,
    {
        let (popular, updated) = futures::join!(api.popular_manga(), api.recently_updated_today());

        let popular = popular.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load popular manga");
            Vec::new()
        });
        let updated = updated.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load recently updated manga");
            Vec::new()
        });

        tracing::debug!(popular = popular.len(), updated = updated.len(), "home feed loaded");
        Self { popular, updated }
    }

    pub fn is_empty(&self) -> bool {
        self.popular.is_empty() && self.updated.is_empty()
    }
}
