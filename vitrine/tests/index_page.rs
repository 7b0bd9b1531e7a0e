use std::num::NonZeroUsize;
use std::sync::Arc;

use serde_json::Value;
use serde_json::json;
use vitrine::config::Config;
use vitrine::contrib::articles::ListingView;
use vitrine::core::RefreshSignal;
use vitrine::core::RemoteClient;
use vitrine::core::models::Article;
use vitrine::core::models::SiteSettings;
use vitrine::core::remote::MemoryClient;
use vitrine::core::remote::Operation;
use vitrine::core::remote::Row;
use vitrine::page::Hero;
use vitrine::page::IndexPage;

fn row(value: Value) -> Row {
    match value {
        Value::Object(row) => row,
        _ => panic!("not an object"),
    }
}

fn seeded() -> Arc<MemoryClient> {
    let client = MemoryClient::new();
    client.insert(
        SiteSettings::TABLE,
        row(json!({
            "site_name": "Acme",
            "primary_color": "#111",
            "hero_title": "Welcome to Acme",
            "hero_subtitle": "We make things",
        })),
    );
    for (slug, created_at, published) in [
        ("first", "2024-01-01T09:00:00Z", true),
        ("second", "2024-02-01T09:00:00Z", true),
        ("draft", "2024-03-01T09:00:00Z", false),
        ("third", "2024-04-01T09:00:00Z", true),
    ] {
        client.insert(
            Article::TABLE,
            row(json!({
                "id": "6f1c2a9e-3b7d-4c1e-9a51-2d8e7f0b4c63",
                "title": slug,
                "slug": slug,
                "excerpt": "",
                "published": published,
                "featured": false,
                "created_at": created_at,
                "category": null,
                "author": null,
            })),
        );
    }
    Arc::new(client)
}

fn slugs(view: ListingView<'_>) -> Vec<String> {
    match view {
        ListingView::Populated(articles) => {
            articles.iter().map(|article| article.slug.clone()).collect()
        }
        _ => Vec::new(),
    }
}

#[tokio::test]
async fn loads_hero_and_newest_published_articles() {
    let client = seeded();
    let config = Config {
        home_article_limit: NonZeroUsize::new(2),
        ..Config::default()
    };
    let mut page = IndexPage::open(client.clone(), &RefreshSignal::new(), &config);
    assert_eq!(page.hero(), None);
    assert_eq!(page.articles(), ListingView::Loading);

    page.load().await;

    assert_eq!(
        page.hero(),
        Some(Hero {
            title: "Welcome to Acme".to_string(),
            subtitle: "We make things".to_string(),
            image_url: None,
        })
    );
    assert_eq!(slugs(page.articles()), ["third", "second"]);

    page.close().await;
    assert_eq!(client.live_channels(), 0);
}

#[tokio::test]
async fn change_updates_hero_without_refetch() {
    let client = seeded();
    let mut page = IndexPage::open(client.clone(), &RefreshSignal::new(), &Config::default());
    page.load().await;
    let selects = client.select_count();

    client
        .upsert(
            SiteSettings::TABLE,
            row(json!({
                "site_name": "Acme Updated",
                "primary_color": "#111",
                "hero_title": "Hello again",
            })),
        )
        .await
        .unwrap();
    page.settings()
        .watch()
        .wait_for(|state| state.settings.as_ref().is_some_and(|s| s.site_name == "Acme Updated"))
        .await
        .unwrap();

    let hero = page.hero().unwrap();
    assert_eq!(hero.title, "Hello again");
    // Absent fields fall back to their defaults
    assert_eq!(hero.subtitle, "");
    assert_eq!(client.select_count(), selects);

    page.close().await;
}

#[tokio::test]
async fn failing_backend_still_finishes_loading() {
    let client = seeded();
    client.fail_next(Operation::Select);
    client.fail_next(Operation::Select);

    let mut page = IndexPage::open(client.clone(), &RefreshSignal::new(), &Config::default());
    page.load().await;

    assert!(!page.settings().is_loading());
    assert_eq!(page.hero(), None);
    assert_eq!(page.articles(), ListingView::Empty);

    page.close().await;
}

#[tokio::test]
async fn reopening_keeps_a_single_subscription() {
    let client = seeded();
    let signal = RefreshSignal::new();

    for _ in 0..3 {
        let mut page = IndexPage::open(client.clone(), &signal, &Config::default());
        page.load().await;
        assert_eq!(client.live_channels(), 1);
        assert_eq!(signal.listeners(), 1);

        page.close().await;
        assert_eq!(client.live_channels(), 0);
        assert_eq!(signal.listeners(), 0);
    }
}
