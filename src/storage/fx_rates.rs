//! FX rate repository for JSON storage
//!
//! One rate per directed pair; writing a pair again replaces it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{FinnestError, FinnestResult};
use crate::models::{CurrencyCode, FxRate};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct FxRateData {
    rates: Vec<FxRate>,
}

type PairKey = (CurrencyCode, CurrencyCode);

/// Repository for the local rate table
pub struct FxRateRepository {
    path: PathBuf,
    data: RwLock<HashMap<PairKey, FxRate>>,
}

impl FxRateRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load rates from disk
    ///
    /// Rows that fail validation (non-positive, non-finite, same-currency) are
    /// skipped rather than failing the whole load.
    pub fn load(&self) -> FinnestResult<()> {
        let file_data: FxRateData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for rate in file_data.rates {
            if let Err(e) = rate.validate() {
                tracing::warn!(pair = %rate.pair_label(), error = %e, "skipping invalid stored rate");
                continue;
            }
            data.insert((rate.base.clone(), rate.quote.clone()), rate);
        }

        Ok(())
    }

    /// Save rates to disk
    pub fn save(&self) -> FinnestResult<()> {
        let rates = self.get_all()?;
        write_json_atomic(&self.path, &FxRateData { rates })
    }

    /// Get the stored rate for a directed pair
    pub fn get(&self, base: &CurrencyCode, quote: &CurrencyCode) -> FinnestResult<Option<FxRate>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&(base.clone(), quote.clone())).cloned())
    }

    /// All rates ordered by base then quote
    pub fn get_all(&self) -> FinnestResult<Vec<FxRate>> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut rates: Vec<FxRate> = data.values().cloned().collect();
        rates.sort_by(|a, b| {
            a.base
                .as_str()
                .cmp(b.base.as_str())
                .then(a.quote.as_str().cmp(b.quote.as_str()))
        });
        Ok(rates)
    }

    /// Insert or replace a rate, returning the previous value for the pair
    pub fn upsert(&self, rate: FxRate) -> FinnestResult<Option<FxRate>> {
        rate.validate()?;

        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.insert((rate.base.clone(), rate.quote.clone()), rate))
    }

    /// Remove a directed pair
    pub fn delete(&self, base: &CurrencyCode, quote: &CurrencyCode) -> FinnestResult<Option<FxRate>> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&(base.clone(), quote.clone())))
    }

    pub fn count(&self) -> FinnestResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| FinnestError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
