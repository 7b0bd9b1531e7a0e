use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::info;
use tracing::warn;
use vitrine::Vitrine;
use vitrine::contrib::articles::ArticleFilter;
use vitrine::contrib::articles::ArticleListing;
use vitrine::contrib::articles::ListingView;
use vitrine::contrib::settings::SettingsEdit;
use vitrine::contrib::settings::SettingsForm;
use vitrine::core::remote::MemoryClient;

mod seed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let vitrine = Vitrine::from_env()?;

    let client = Arc::new(MemoryClient::new());
    seed::seed(&client);
    let site = vitrine.connect(client.clone());

    let page = site.index().await;
    if let Some(hero) = page.hero() {
        info!(title = hero.title.as_str(), subtitle = hero.subtitle.as_str(), "Hero");
    }
    log_articles("Index", page.articles());

    let mut featured = ArticleListing::new(
        client.clone(),
        ArticleFilter::default().featured().limit(NonZeroUsize::MIN),
    );
    featured.fetch().await;
    log_articles("Featured", featured.view());
    featured
        .set_filter(ArticleFilter::default().in_category("tooling"))
        .await;
    log_articles("Tooling", featured.view());

    // The admin panel edits a draft and saves it as a whole
    let admin = site.admin().await;
    let mut form = SettingsForm::new(&admin, site.signal().clone());
    form.edit(SettingsEdit::HeroTitle("Ferrous Notes, now live".to_string()));
    form.edit(SettingsEdit::parse("hero_subtitle", "Edited from the admin panel".into())?);
    let notification = form.save().await;
    info!(
        title = notification.title,
        description = notification.description,
        "Admin notification"
    );

    let mut upstream = page.settings().watch();
    let changed = upstream
        .wait_for(|state| {
            state
                .settings
                .as_ref()
                .is_some_and(|settings| settings.hero_title == "Ferrous Notes, now live")
        })
        .await;
    if changed.is_err() {
        warn!("Index page stopped before receiving the new settings");
    }
    drop(changed);
    if let Some(hero) = page.hero() {
        info!(title = hero.title.as_str(), subtitle = hero.subtitle.as_str(), "Hero after save");
    }

    drop(form);
    admin.deactivate().await;
    page.close().await;
    Ok(())
}

fn log_articles(listing: &str, view: ListingView<'_>) {
    match view {
        ListingView::Loading => info!(listing, "Still loading"),
        ListingView::Empty => info!(listing, "No articles"),
        ListingView::Populated(articles) => {
            for article in articles {
                info!(
                    listing,
                    slug = article.slug.as_str(),
                    created_at = %article.created_at,
                    "Article"
                );
            }
        }
    }
}
