// In crates/app-config/src/types.rs

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the state store connection.
    pub store: StoreSettings,
    /// Settings for the alert notification channel.
    pub notify: NotifySettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StoreSettings {
    /// The connection URL for the PostgreSQL state store.
    pub url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NotifySettings {
    /// The HTTP endpoint of the alert topic.
    pub topic_url: String,
}
