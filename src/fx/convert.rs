//! Conversion against the locally held rate table
//!
//! The table is a plain directed mapping. A pair is converted directly, or
//! through its inverse; nothing is ever chained through a third currency.

use std::collections::HashMap;

use crate::models::FxRate;

/// `(BASE, QUOTE) -> rate`, codes uppercased
pub type FxTable = HashMap<(String, String), f64>;

/// Build a table from stored rates, dropping non-finite values
pub fn build_table<'a>(rates: impl IntoIterator<Item = &'a FxRate>) -> FxTable {
    rates
        .into_iter()
        .filter(|r| r.rate.is_finite())
        .map(|r| {
            (
                (r.base.as_str().to_string(), r.quote.as_str().to_string()),
                r.rate,
            )
        })
        .collect()
}

/// Convert `amount` from one currency into another
///
/// Returns `None` when neither the pair nor its inverse is known. Callers
/// must treat `None` as "conversion unavailable", never as zero.
pub fn convert(amount: f64, from: &str, to: &str, table: &FxTable) -> Option<f64> {
    let from = from.trim().to_ascii_uppercase();
    let to = to.trim().to_ascii_uppercase();

    if from == to {
        return Some(amount);
    }

    if let Some(rate) = table
        .get(&(from.clone(), to.clone()))
        .copied()
        .filter(|r| r.is_finite())
    {
        return Some(amount * rate);
    }

    table
        .get(&(to, from))
        .copied()
        .filter(|r| r.is_finite() && *r != 0.0)
        .map(|inverse| amount / inverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CurrencyCode;

    fn table(entries: &[(&str, &str, f64)]) -> FxTable {
        entries
            .iter()
            .map(|(b, q, r)| ((b.to_string(), q.to_string()), *r))
            .collect()
    }

    #[test]
    fn test_identity_for_any_table() {
        assert_eq!(convert(42.5, "AUD", "AUD", &FxTable::new()), Some(42.5));
        let t = table(&[("AUD", "AUD", 3.0)]);
        assert_eq!(convert(42.5, "AUD", "aud", &t), Some(42.5));
    }

    #[test]
    fn test_direct_pair() {
        let t = table(&[("USD", "AUD", 1.5)]);
        assert_eq!(convert(100.0, "USD", "AUD", &t), Some(150.0));
    }

    #[test]
    fn test_inverse_derivation() {
        let t = table(&[("USD", "AUD", 1.5)]);
        let out = convert(100.0, "AUD", "USD", &t).unwrap();
        assert!((out - 100.0 / 1.5).abs() < 1e-9);
        assert!((out - 66.67).abs() < 0.01);
    }

    #[test]
    fn test_unavailable_pair_is_none_not_zero() {
        assert_eq!(convert(100.0, "AUD", "JPY", &FxTable::new()), None);
    }

    #[test]
    fn test_zero_inverse_is_unavailable() {
        let t = table(&[("USD", "AUD", 0.0)]);
        assert_eq!(convert(100.0, "AUD", "USD", &t), None);
    }

    #[test]
    fn test_no_multi_hop() {
        let t = table(&[("AUD", "USD", 0.66), ("USD", "JPY", 150.0)]);
        assert_eq!(convert(100.0, "AUD", "JPY", &t), None);
    }

    #[test]
    fn test_build_table_from_rates() {
        let rate = FxRate::new(
            CurrencyCode::parse("usd").unwrap(),
            CurrencyCode::parse("aud").unwrap(),
            1.5,
        )
        .unwrap();
        let t = build_table([&rate]);
        assert_eq!(t.get(&("USD".to_string(), "AUD".to_string())), Some(&1.5));
    }
}
