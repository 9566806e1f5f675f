// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Versioned pricing configuration.
//!
//! The fare engine takes a config snapshot as a plain argument. This store
//! owns the current snapshot, persists admin edits, and swaps the snapshot
//! atomically so an in-flight quote always prices against one version.

use crate::db::MemoryDb;
use crate::error::{AppError, Result};
use crate::models::PricingConfig;
use chrono::Utc;
use std::sync::{Arc, RwLock};

pub struct PricingConfigStore {
    db: MemoryDb,
    current: RwLock<Arc<PricingConfig>>,
}

impl PricingConfigStore {
    /// Load the persisted record, seeding the default table if there is none.
    pub fn load(db: MemoryDb) -> Result<Self> {
        let config = match db.get_pricing_config()? {
            Some(config) => config,
            None => {
                let config = PricingConfig::default();
                db.set_pricing_config(&config)?;
                tracing::info!(version = config.version, "Seeded default pricing config");
                config
            }
        };

        Ok(Self {
            db,
            current: RwLock::new(Arc::new(config)),
        })
    }

    /// Snapshot of the active config.
    pub fn current(&self) -> Result<Arc<PricingConfig>> {
        let guard = self
            .current
            .read()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("pricing config lock poisoned")))?;
        Ok(Arc::clone(&guard))
    }

    /// Validate and install a new config. Returns the stored version.
    ///
    /// The incoming `version` and `updated_at` are ignored; the store
    /// assigns them.
    pub fn replace(&self, mut config: PricingConfig) -> Result<Arc<PricingConfig>> {
        config.validate().map_err(AppError::Validation)?;

        let mut guard = self
            .current
            .write()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("pricing config lock poisoned")))?;

        config.version = guard.version + 1;
        config.updated_at = Utc::now();
        self.db.set_pricing_config(&config)?;

        let config = Arc::new(config);
        *guard = Arc::clone(&config);

        tracing::info!(
            version = config.version,
            currency = %config.currency,
            "Pricing config replaced"
        );
        Ok(config)
    }
}
