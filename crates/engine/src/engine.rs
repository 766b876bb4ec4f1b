//! Conversion dispatcher – the single entry point front ends call.

use crate::catalog::{Catalog, Category, CategorySummary, Strategy, UnitDefinition};
use crate::config::EngineConfig;
use crate::convert::{
    convert_baking, convert_linear, convert_rate, convert_temperature, parse_value, BakingUnit,
    RawValue, TemperatureScale,
};
use crate::error::{ConversionError, EngineError};
use crate::platform::{OfflineTransport, ReqwestTransport, SystemClock};
use crate::rates::{RateCache, RateKind, RateSource, RateTable};
use crate::traits::RateTransport;
use crate::types::ConversionRequest;
use std::sync::Arc;

/// Owns the catalog and the rate cache. Share it behind an `Arc`; every
/// method takes `&self`.
pub struct ConversionEngine {
    catalog: Arc<Catalog>,
    rates: RateCache,
    strict_rate_codes: bool,
}

impl ConversionEngine {
    pub fn new(catalog: Catalog, rates: RateCache) -> Self {
        Self {
            catalog: Arc::new(catalog),
            rates,
            strict_rate_codes: true,
        }
    }

    pub fn with_strict_rate_codes(mut self, strict: bool) -> Self {
        self.strict_rate_codes = strict;
        self
    }

    /// Builtin catalog (optionally restricted), system clock, and either the
    /// real HTTP transport or one that always fails when `offline`.
    pub fn from_config(cfg: &EngineConfig, offline: bool) -> Result<Self, EngineError> {
        let catalog = if cfg.categories.is_empty() {
            Catalog::builtin()
        } else {
            Catalog::builtin().restricted(&cfg.categories)?
        };

        let transport: Box<dyn RateTransport> = if offline {
            Box::new(OfflineTransport)
        } else {
            Box::new(ReqwestTransport::new(&cfg.user_agent)?)
        };
        let rates = RateCache::new(transport, Box::new(SystemClock), cfg.rate_settings());

        tracing::debug!(
            categories = catalog.len(),
            offline,
            strict_rate_codes = cfg.strict_rate_codes,
            "conversion engine ready"
        );
        Ok(Self::new(catalog, rates).with_strict_rate_codes(cfg.strict_rate_codes))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        self.catalog.categories()
    }

    pub fn units(&self, category: &str) -> Result<&[UnitDefinition], ConversionError> {
        self.catalog.units(category)
    }

    pub fn find_category(&self, from: &str, to: &str) -> Option<&Category> {
        self.catalog.find_category(from, to)
    }

    /// A usable rate table; never fails.
    pub async fn rates(&self, kind: RateKind) -> Arc<RateTable> {
        self.rates.get(kind).await
    }

    pub fn rate_snapshot(&self, kind: RateKind) -> Option<Arc<RateTable>> {
        self.rates.snapshot(kind)
    }

    pub async fn convert_request(&self, req: &ConversionRequest) -> Result<f64, ConversionError> {
        self.convert(req.value.clone(), &req.from, &req.to, &req.category)
            .await
    }

    /// Convert `value` from one unit to another within `category`.
    ///
    /// Only rate-backed categories suspend; they may fetch but never fail
    /// because of the network.
    pub async fn convert(
        &self,
        value: impl Into<RawValue>,
        from: &str,
        to: &str,
        category: &str,
    ) -> Result<f64, ConversionError> {
        let value = parse_value(&value.into())?;
        let cat = self
            .catalog
            .category(category)
            .ok_or_else(|| ConversionError::UnknownCategory(category.to_string()))?;

        let result = match cat.strategy {
            Strategy::Rate(kind) => self.convert_with_rates(value, cat, kind, from, to).await?,
            Strategy::Affine => {
                let from_scale = temperature_unit(cat, from)?;
                let to_scale = temperature_unit(cat, to)?;
                convert_temperature(value, from_scale, to_scale)
            }
            Strategy::Baking => {
                let from_unit = baking_unit(cat, from)?;
                let to_unit = baking_unit(cat, to)?;
                convert_baking(value, from_unit, to_unit)
            }
            Strategy::Linear => {
                let from_factor = linear_unit(cat, from)?.factor;
                let to_factor = linear_unit(cat, to)?.factor;
                convert_linear(value, from_factor, to_factor)
            }
        };

        tracing::trace!(category, from, to, value, result, "converted");
        Ok(result)
    }

    async fn convert_with_rates(
        &self,
        value: f64,
        cat: &Category,
        kind: RateKind,
        from: &str,
        to: &str,
    ) -> Result<f64, ConversionError> {
        linear_unit(cat, from)?;
        linear_unit(cat, to)?;

        let table = self.rates.get(kind).await;
        let from_rate = self.rate_for(&table, cat, from)?;
        let to_rate = self.rate_for(&table, cat, to)?;
        Ok(convert_rate(value, from_rate, to_rate))
    }

    fn rate_for(&self, table: &RateTable, cat: &Category, code: &str) -> Result<f64, ConversionError> {
        // Strictness only judges live tables; the snapshot is a partial
        // list and must not turn an outage into a lookup error.
        match table.rate(code) {
            Some(rate) => Ok(rate),
            None if self.strict_rate_codes && table.source == RateSource::Live => {
                Err(ConversionError::unknown_unit(&cat.key, code))
            }
            None => {
                tracing::warn!(code, source = ?table.source, "no rate for code, using 1");
                Ok(1.0)
            }
        }
    }
}

fn linear_unit<'a>(cat: &'a Category, key: &str) -> Result<&'a UnitDefinition, ConversionError> {
    cat.unit(key)
        .ok_or_else(|| ConversionError::unknown_unit(&cat.key, key))
}

fn temperature_unit(cat: &Category, key: &str) -> Result<TemperatureScale, ConversionError> {
    cat.unit(key)
        .and_then(|_| TemperatureScale::from_key(key))
        .ok_or_else(|| ConversionError::unknown_unit(&cat.key, key))
}

fn baking_unit(cat: &Category, key: &str) -> Result<BakingUnit, ConversionError> {
    cat.unit(key)
        .and_then(|_| BakingUnit::from_key(key))
        .ok_or_else(|| ConversionError::unknown_unit(&cat.key, key))
}
