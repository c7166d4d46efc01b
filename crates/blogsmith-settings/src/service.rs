//! Settings service with caching, validation and permission checks

use std::sync::Arc;

use crate::auth::{Principal, require_admin};
use crate::cache::SettingsCache;
use crate::error::SettingsResult;
use crate::schema::{Background, SystemConfig};
use crate::store::{SYSTEM_CONFIG_KEY, SettingsStore};

const SYSTEM_KEY: &[&str] = &["system"];
const EMAIL_CONFIGURED_KEY: &[&str] = &["isEmailConfigured"];

pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
    cache: SettingsCache,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>, cache_capacity: usize) -> Self {
        Self {
            store,
            cache: SettingsCache::new(cache_capacity),
        }
    }

    pub fn cache(&self) -> &SettingsCache {
        &self.cache
    }

    /// The stored system settings, `None` before the first save
    pub fn system_config(&self, principal: &Principal) -> SettingsResult<Option<SystemConfig>> {
        require_admin(principal, "reading system settings")?;
        self.cache.get(SYSTEM_KEY, || self.load())
    }

    /// Background settings for rendering; anyone may read them
    pub fn background_config(&self) -> SettingsResult<Background> {
        let config: Option<SystemConfig> = self.cache.get(SYSTEM_KEY, || self.load())?;
        Ok(config
            .and_then(|c| c.background)
            .map(|b| b.resolve())
            .unwrap_or_default())
    }

    pub fn is_email_configured(&self) -> SettingsResult<bool> {
        self.cache.get(EMAIL_CONFIGURED_KEY, || {
            Ok(self
                .load()?
                .is_some_and(|config| config.is_email_configured()))
        })
    }

    pub fn update_system_config(
        &self,
        principal: &Principal,
        config: &SystemConfig,
    ) -> SettingsResult<()> {
        require_admin(principal, "updating system settings")?;
        config.validate()?;

        self.store
            .upsert(SYSTEM_CONFIG_KEY, serde_json::to_value(config)?)?;
        self.cache.delete(&[SYSTEM_KEY, EMAIL_CONFIGURED_KEY]);
        log::info!("System settings updated by {}", principal.name);
        Ok(())
    }

    fn load(&self) -> SettingsResult<Option<SystemConfig>> {
        let Some(value) = self.store.get(SYSTEM_CONFIG_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                log::warn!("Ignoring unreadable system settings: {e}");
                Ok(None)
            }
        }
    }
}
