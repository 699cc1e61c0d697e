//! Integration tests for dexreader
//!
//! End-to-end tests against the live MangaDex API. Network failures and
//! timeouts are reported and tolerated so the suite still passes offline.

use dexreader::prelude::*;
use tokio::time::timeout;

mod common;
use common::{TEST_MANGA_TITLE, TEST_TIMEOUT};

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_live_home_feed() {
        let client = MangaDexClient::new().unwrap();

        match timeout(TEST_TIMEOUT, HomeFeed::load(&client)).await {
            Ok(feed) => {
                println!(
                    "Home feed: {} popular, {} updated",
                    feed.popular.len(),
                    feed.updated.len()
                );
                assert!(feed.popular.len() <= client.config().popular_limit);
                for manga in &feed.popular {
                    assert!(!manga.id.is_empty());
                    assert!(!manga.title.is_empty());
                    if let Some(cover) = &manga.cover_url {
                        assert!(cover.starts_with("https://uploads.mangadex.org/covers/"));
                        assert!(cover.ends_with(".512.jpg"));
                    }
                }
            }
            Err(_) => println!("Home feed timeout"),
        }
    }

    #[tokio::test]
    async fn test_live_search() {
        let client = MangaDexClient::new().unwrap();

        match timeout(TEST_TIMEOUT, client.search_manga(TEST_MANGA_TITLE)).await {
            Ok(Ok(results)) => {
                println!("Search '{}': {} results", TEST_MANGA_TITLE, results.len());
                assert!(results.len() <= client.config().search_limit);
            }
            Ok(Err(e)) => println!("Search failed: {}", e),
            Err(_) => println!("Search timeout"),
        }
    }

    #[tokio::test]
    async fn test_full_workflow() {
        let client = MangaDexClient::new().unwrap();

        println!("Testing complete workflow: search -> chapters -> pages");

        // Step 1: Search
        let manga = match timeout(TEST_TIMEOUT, client.search_manga(TEST_MANGA_TITLE)).await {
            Ok(Ok(results)) => match results.into_iter().next() {
                Some(manga) => manga,
                None => {
                    println!("No search results, skipping workflow");
                    return;
                }
            },
            Ok(Err(e)) => {
                println!("Search failed: {}", e);
                return;
            }
            Err(_) => {
                println!("Search timeout");
                return;
            }
        };
        println!("Found: {} ({})", manga.title, manga.id);

        // Step 2: First page of chapters
        let query = client.chapter_query(&manga.id);
        let mut chapters = Paginator::new(client.config().chapter_page_size);
        match timeout(TEST_TIMEOUT, chapters.load_chapters(&client, &query)).await {
            Ok(Ok(added)) => println!("Loaded {} chapters", added),
            Ok(Err(e)) => {
                println!("Chapter list failed: {}", e);
                return;
            }
            Err(_) => {
                println!("Chapter list timeout");
                return;
            }
        }
        if chapters.is_empty() {
            println!("No English chapters, skipping page resolution");
            return;
        }
        assert!(chapters.len() <= client.config().chapter_page_size);

        // Step 3: Resolve pages of the first chapter
        let mut reader = ChapterReader::new(chapters.into_items(), ImageQuality::DataSaver);
        match timeout(TEST_TIMEOUT, reader.open(&client, 0)).await {
            Ok(Ok(pages)) => {
                println!("Chapter has {} pages", pages.len());
                assert!(!pages.is_empty());
                assert!(pages.urls.iter().all(|u| u.starts_with("http")));
            }
            Ok(Err(e)) => println!("Page resolution failed: {}", e),
            Err(_) => println!("Page resolution timeout"),
        }
    }

    #[tokio::test]
    async fn test_unknown_manga_is_not_found() {
        let client = MangaDexClient::new().unwrap();

        match timeout(
            TEST_TIMEOUT,
            client.manga("00000000-0000-0000-0000-000000000000"),
        )
        .await
        {
            Ok(Ok(manga)) => panic!("Unexpected manga: {}", manga.title),
            Ok(Err(dexreader::Error::NotFound(msg))) => println!("Not found as expected: {}", msg),
            Ok(Err(e)) => println!("Lookup failed differently (offline?): {}", e),
            Err(_) => println!("Lookup timeout"),
        }
    }
}
