use std::sync::Arc;

use serde_json::json;
use vitrine::config::Config;
use vitrine::contrib::settings::NotificationVariant;
use vitrine::contrib::settings::SettingsEdit;
use vitrine::contrib::settings::SettingsForm;
use vitrine::contrib::settings::SettingsSync;
use vitrine::core::RefreshSignal;
use vitrine::core::models::SiteSettings;
use vitrine::core::remote::MemoryClient;
use vitrine::core::remote::Operation;
use vitrine::page::IndexPage;

fn seeded() -> Arc<MemoryClient> {
    let client = MemoryClient::new();
    let serde_json::Value::Object(settings) = json!({
        "id": "a4d6c1f2-5e83-4b9a-8c27-1f0e3d5b7a96",
        "site_name": "Acme",
        "hero_title": "Welcome",
        "primary_color": "#111",
    }) else {
        unreachable!()
    };
    client.insert(SiteSettings::TABLE, settings);
    client.create_table("articles");
    Arc::new(client)
}

#[tokio::test]
async fn saved_settings_reach_open_pages() {
    let client = seeded();
    let signal = RefreshSignal::new();
    let config = Config::default();

    let mut page = IndexPage::open(client.clone(), &signal, &config);
    page.load().await;

    let admin = SettingsSync::activate(client.clone(), &signal, &config.sync_options());
    admin.loaded().await;
    let mut form = SettingsForm::new(&admin, signal.clone());
    form.edit(SettingsEdit::HeroTitle("Fresh".to_string()));
    form.edit(SettingsEdit::HeroImageUrl(Some("https://acme.test/hero.png".to_string())));

    let notification = form.save().await;
    assert_eq!(notification.variant, NotificationVariant::Default);
    assert_eq!(notification.title, "Success");

    page.settings()
        .watch()
        .wait_for(|state| state.settings.as_ref().is_some_and(|s| s.hero_title == "Fresh"))
        .await
        .unwrap();
    let hero = page.hero().unwrap();
    assert_eq!(hero.image_url.as_deref(), Some("https://acme.test/hero.png"));

    // Every other field was submitted unchanged
    let stored = admin
        .watch()
        .wait_for(|state| state.settings.as_ref().is_some_and(|s| s.hero_title == "Fresh"))
        .await
        .unwrap()
        .settings
        .clone()
        .unwrap();
    assert_eq!(stored.site_name, "Acme");
    assert_eq!(stored.primary_color, "#111");

    drop(form);
    admin.deactivate().await;
    page.close().await;
    assert_eq!(client.live_channels(), 0);
    assert_eq!(signal.listeners(), 0);
}

#[tokio::test]
async fn saving_raises_the_shared_signal() {
    let client = seeded();
    let signal = RefreshSignal::new();
    let admin = SettingsSync::activate(client.clone(), &signal, &Config::default().sync_options());
    admin.loaded().await;
    let mut listener = signal.listen();

    let mut form = SettingsForm::new(&admin, signal.clone());
    form.edit(SettingsEdit::SiteName("Acme Corp".to_string()));
    form.save().await;
    assert_eq!(listener.recv().await, Some(()));

    drop(form);
    admin.deactivate().await;
}

#[tokio::test]
async fn failed_save_reports_error_and_keeps_state() {
    let client = seeded();
    let signal = RefreshSignal::new();
    let admin = SettingsSync::activate(client.clone(), &signal, &Config::default().sync_options());
    admin.loaded().await;

    let mut form = SettingsForm::new(&admin, signal.clone());
    form.edit(SettingsEdit::SiteName("Acme Corp".to_string()));
    client.fail_next(Operation::Upsert);

    let notification = form.save().await;
    assert_eq!(notification.variant, NotificationVariant::Destructive);
    assert_eq!(notification.description, "Failed to update site settings");
    assert_eq!(form.draft().unwrap().site_name, "Acme Corp");
    assert_eq!(admin.current().unwrap().site_name, "Acme");

    drop(form);
    admin.deactivate().await;
}
