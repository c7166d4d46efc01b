/*!
System settings for a blogsmith site.

[`SettingsService`] reads and writes the [`SystemConfig`] held in a
[`SettingsStore`] under the `system` key, caching derived values in a
[`SettingsCache`]. [`BackgroundScene`] turns the resolved background settings
into the layers a page draws.
*/

pub mod auth;
pub mod background;
pub mod cache;
pub mod error;
pub mod schema;
pub mod service;
pub mod store;

pub use auth::{Principal, Role, require_admin};
pub use background::{BackgroundScene, Layer, SceneStyle};
pub use cache::SettingsCache;
pub use error::{SettingsError, SettingsResult};
pub use schema::{Background, BackgroundConfig, EmailConfig, SystemConfig};
pub use service::SettingsService;
pub use store::{JsonFileStore, MemoryStore, SYSTEM_CONFIG_KEY, SettingsStore};
