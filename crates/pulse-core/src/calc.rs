//! Pure derived calculations over prices and candles.
//!
//! Note the asymmetry kept from the widget: profit against a zero reference
//! has no answer, while a percentage change from a zero start is reported as
//! zero.

use chrono::{DateTime, Utc};

use crate::types::{Candle, Currency, TimeRange};

/// Profit of `current` against a `reference` cost, in percent.
///
/// `None` when `reference` is exactly zero.
pub fn profit_percentage(reference: f64, current: f64) -> Option<f64> {
    if reference == 0.0 {
        return None;
    }
    Some((current - reference) / reference * 100.0)
}

/// Percentage change from `start` to `current`; `0.0` when `start` is exactly zero.
pub fn percentage_change(start: f64, current: f64) -> f64 {
    if start == 0.0 {
        return 0.0;
    }
    (current - start) / start * 100.0
}

/// Mean mid-price of the candles inside `range`'s trailing window ending at `now`.
///
/// `None` when no candle falls inside the window.
pub fn mid_price_average(candles: &[Candle], range: TimeRange, now: DateTime<Utc>) -> Option<f64> {
    let cutoff = range.window_start(now);
    let (sum, count) = candles
        .iter()
        .filter(|c| cutoff.is_none_or(|start| c.timestamp >= start))
        .fold((0.0, 0usize), |(sum, n), c| (sum + c.mid(), n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Highest candle open in the series (the widget's "Top" figure).
pub fn period_top(candles: &[Candle]) -> Option<f64> {
    candles.iter().map(|c| c.open).reduce(f64::max)
}

/// Change from the first candle's open to `last_price`, in percent.
///
/// `None` without candles or without a positive last price.
pub fn window_change(candles: &[Candle], last_price: f64) -> Option<f64> {
    let first = candles.first()?;
    (last_price > 0.0).then(|| percentage_change(first.open, last_price))
}

/// Fiat value of `amount` BTC at `price`.
#[inline]
pub fn holdings_value(amount: f64, price: f64) -> f64 {
    amount * price
}

/// BTC bought by `fiat` at `price`; `None` unless the price is positive.
pub fn fiat_to_btc(fiat: f64, price: f64) -> Option<f64> {
    (price > 0.0).then(|| fiat / price)
}

/// Convert USD to EUR at `rate` (EUR per USD).
#[inline]
pub fn usd_to_eur(amount: f64, rate: f64) -> f64 {
    amount * rate
}

/// Convert EUR to USD at `rate` (EUR per USD); `None` for a zero rate.
pub fn eur_to_usd(amount: f64, rate: f64) -> Option<f64> {
    (rate != 0.0).then(|| amount / rate)
}

/// BTC price in the currency opposite to `currency`, derived from `price` and
/// the EUR-per-USD `rate`.
pub fn cross_price(price: f64, currency: Currency, rate: f64) -> Option<f64> {
    if price <= 0.0 {
        return None;
    }
    match currency {
        Currency::Usd => Some(usd_to_eur(price, rate)),
        Currency::Eur => eur_to_usd(price, rate),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn candle(ts: i64, open: f64, high: f64, low: f64) -> Candle {
        Candle { timestamp: ts, open, high, low, close: open }
    }

    #[test]
    fn profit() {
        assert_eq!(profit_percentage(100.0, 150.0), Some(50.0));
        assert_eq!(profit_percentage(0.0, 150.0), None);
        assert_eq!(profit_percentage(100.0, 50.0), Some(-50.0));
    }

    #[test]
    fn pct_change() {
        assert_eq!(percentage_change(100.0, 120.0), 20.0);
        assert_eq!(percentage_change(0.0, 120.0), 0.0);
    }

    #[test]
    fn mid_average_within_window() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let ts = now.timestamp();
        let candles = [candle(ts - 7200, 9.0, 10.0, 8.0), candle(ts - 3600, 11.0, 12.0, 10.0)];
        assert_eq!(mid_price_average(&candles, TimeRange::H12, now), Some(10.0));
    }

    #[test]
    fn mid_average_excludes_old_candles() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let ts = now.timestamp();
        let candles = [candle(ts - 13 * 3600, 0.0, 100.0, 100.0), candle(ts - 60, 0.0, 12.0, 10.0)];
        assert_eq!(mid_price_average(&candles, TimeRange::H12, now), Some(11.0));
        assert_eq!(mid_price_average(&candles, TimeRange::All, now), Some(55.5));
        assert_eq!(mid_price_average(&candles[..1], TimeRange::H12, now), None);
        assert_eq!(mid_price_average(&[], TimeRange::All, now), None);
    }

    #[test]
    fn ytd_window_starts_jan_first() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let last_year = Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap().timestamp();
        let this_year = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap().timestamp();
        let candles = [candle(last_year, 0.0, 2.0, 2.0), candle(this_year, 0.0, 4.0, 4.0)];
        assert_eq!(mid_price_average(&candles, TimeRange::Ytd, now), Some(4.0));
    }

    #[test]
    fn top_and_window_change() {
        let candles = [candle(1, 100.0, 0.0, 0.0), candle(2, 130.0, 0.0, 0.0), candle(3, 120.0, 0.0, 0.0)];
        assert_eq!(period_top(&candles), Some(130.0));
        assert_eq!(period_top(&[]), None);
        assert_eq!(window_change(&candles, 110.0), Some(10.0));
        assert_eq!(window_change(&candles, 0.0), None);
        assert_eq!(window_change(&[], 110.0), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(holdings_value(0.5, 60_000.0), 30_000.0);
        assert_eq!(fiat_to_btc(30_000.0, 60_000.0), Some(0.5));
        assert_eq!(fiat_to_btc(1.0, 0.0), None);
        assert_eq!(usd_to_eur(100.0, 0.9), 90.0);
        assert_eq!(eur_to_usd(90.0, 0.9), Some(100.0));
        assert_eq!(eur_to_usd(90.0, 0.0), None);
        assert_eq!(cross_price(100.0, Currency::Usd, 0.5), Some(50.0));
        assert_eq!(cross_price(50.0, Currency::Eur, 0.5), Some(100.0));
        assert_eq!(cross_price(0.0, Currency::Eur, 0.5), None);
    }
}
