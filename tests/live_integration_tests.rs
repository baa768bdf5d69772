//! Tests that talk to the real services. Ignored by default - run with
//! `cargo test -- --ignored` and a Data API key in `YTFETCH_API_KEY`.
use ytfetch::{ApiKey, Config, VideoID, YoutubeID, YtFetch};

fn api_key_from_env() -> ApiKey {
    ApiKey::new(std::env::var("YTFETCH_API_KEY").expect("set YTFETCH_API_KEY to run live tests"))
}

#[tokio::test]
#[ignore = "requires network and a Data API key"]
async fn live_video_lookup_returns_metadata() {
    let yt = YtFetch::new(Config::new(api_key_from_env())).unwrap();
    let items = yt
        .items_info(&[VideoID::from_raw("dQw4w9WgXcQ")])
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert!(!items[0].title.is_empty());
    assert!(!items[0].duration.is_empty());
}

#[tokio::test]
#[ignore = "requires network and a Data API key"]
async fn live_search_returns_results() {
    let yt = YtFetch::new(Config::new(api_key_from_env())).unwrap();
    let items = yt.search_items("rust programming language").await.unwrap();
    assert!(!items.is_empty());
}

#[tokio::test]
#[ignore = "requires network"]
async fn live_short_url_expands_to_watch_url() {
    // The redirect probe doesn't authenticate, so any key will do here.
    let yt = YtFetch::new(Config::new(ApiKey::new("unused"))).unwrap();
    let expanded = yt
        .expand_url("https://youtu.be/dQw4w9WgXcQ")
        .await
        .unwrap();
    assert!(expanded.contains("watch?v=dQw4w9WgXcQ"));
}
