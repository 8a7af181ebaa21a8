//! FX rate table service
//!
//! Maintains the local rate table used for conversions and saves selected
//! provider quotes into it.

use crate::audit::EntityType;
use crate::error::{FinnestError, FinnestResult};
use crate::fx::{build_table, convert, FxTable};
use crate::models::{CurrencyCode, FxRate, ProviderQuote};
use crate::storage::Storage;

/// Service for the local rate table
pub struct FxService<'a> {
    storage: &'a Storage,
}

impl<'a> FxService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Set the rate for a directed pair, replacing any previous value
    pub fn set_rate(&self, base: &str, quote: &str, rate: f64) -> FinnestResult<FxRate> {
        let fx = FxRate::new(CurrencyCode::parse(base)?, CurrencyCode::parse(quote)?, rate)?;

        let previous = self.storage.fx_rates.upsert(fx.clone())?;
        self.storage.fx_rates.save()?;

        match previous {
            Some(before) => self.storage.log_update(
                EntityType::FxRate,
                fx.pair_label(),
                None,
                &before,
                &fx,
            )?,
            None => self
                .storage
                .log_create(EntityType::FxRate, fx.pair_label(), None, &fx)?,
        }

        Ok(fx)
    }

    /// Remove a directed pair
    pub fn remove_rate(&self, base: &str, quote: &str) -> FinnestResult<FxRate> {
        let base = CurrencyCode::parse(base)?;
        let quote = CurrencyCode::parse(quote)?;

        let removed = self
            .storage
            .fx_rates
            .delete(&base, &quote)?
            .ok_or_else(|| FinnestError::rate_not_found(format!("{}->{}", base, quote)))?;
        self.storage.fx_rates.save()?;
        self.storage
            .log_delete(EntityType::FxRate, removed.pair_label(), None, &removed)?;

        Ok(removed)
    }

    pub fn list_rates(&self) -> FinnestResult<Vec<FxRate>> {
        self.storage.fx_rates.get_all()
    }

    /// Snapshot of the table for conversions
    pub fn table(&self) -> FinnestResult<FxTable> {
        Ok(build_table(&self.storage.fx_rates.get_all()?))
    }

    /// Convert using the local table; `None` when the pair is unknown
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> FinnestResult<Option<f64>> {
        let from = CurrencyCode::parse(from)?;
        let to = CurrencyCode::parse(to)?;
        Ok(convert(amount, from.as_str(), to.as_str(), &self.table()?))
    }

    /// Store the first available quote of a ranked comparison
    ///
    /// Returns `None` when no provider produced a rate.
    pub fn save_first_available(
        &self,
        base: &str,
        quote: &str,
        ranked: &[ProviderQuote],
    ) -> FinnestResult<Option<(FxRate, String)>> {
        let Some((rate, provider)) = ranked
            .iter()
            .find_map(|q| q.rate.map(|r| (r, q.provider.clone())))
        else {
            return Ok(None);
        };

        let fx = self.set_rate(base, quote, rate)?;
        Ok(Some((fx, provider)))
    }
}
