use serde_json::Value;
use serde_json::json;
use vitrine::core::models::Article;
use vitrine::core::models::SiteSettings;
use vitrine::core::remote::MemoryClient;

/// Fills a fresh backend with the blog's settings and a few articles
pub fn seed(client: &MemoryClient) {
    insert(
        client,
        SiteSettings::TABLE,
        json!({
            "id": "3f9a7c14-2b6e-4d8a-9e15-7c0b2a4f6d31",
            "site_name": "Ferrous Notes",
            "site_description": "Writing about systems programming",
            "hero_title": "Ferrous Notes",
            "hero_subtitle": "Long reads on systems programming",
            "primary_color": "#b7410e",
        }),
    );

    let systems = json!({"name": "Systems", "slug": "systems"});
    let tooling = json!({"name": "Tooling", "slug": "tooling"});
    for (slug, title, category, created_at, published, featured) in [
        ("ownership", "Ownership in practice", &systems, "2024-05-02T08:00:00Z", true, true),
        ("cargo-features", "Cargo features done right", &tooling, "2024-06-11T08:00:00Z", true, false),
        ("async-drop", "Waiting for async drop", &systems, "2024-07-20T08:00:00Z", false, false),
        ("tracing", "Structured logs with tracing", &tooling, "2024-08-05T08:00:00Z", true, false),
    ] {
        insert(
            client,
            Article::TABLE,
            json!({
                "id": uuid_for(slug),
                "title": title,
                "slug": slug,
                "excerpt": format!("{title}, filed under {}", category["name"].as_str().unwrap_or_default()),
                "published": published,
                "featured": featured,
                "created_at": created_at,
                "reading_time": 7,
                "category": category,
                "author": {"full_name": "Ferris"},
            }),
        );
    }
}

fn insert(client: &MemoryClient, table: &str, value: Value) {
    if let Value::Object(row) = value {
        client.insert(table, row);
    }
}

/// A stable uuid so reruns print the same ids
fn uuid_for(slug: &str) -> String {
    let hash = slug
        .bytes()
        .fold(0u64, |hash, byte| hash.wrapping_mul(31).wrapping_add(u64::from(byte)));
    format!("00000000-0000-4000-8000-{:012x}", hash & 0xffff_ffff_ffff)
}
