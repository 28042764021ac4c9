//! Terminal and JSON rendering of a risk assessment.

use std::fmt::Write;

use alloy::primitives::Address;
use serde::Serialize;

use riskboard_api::{MarketQuote, PriceTrend, SentimentReading};
use riskboard_core::{LiquidationEstimate, LiquidationPrice, RiskReport};

/// Everything the dashboard shows, as emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct DashboardOutput<'a> {
    pub report: &'a RiskReport,
    pub quotes: &'a [MarketQuote],
    pub sentiment: Option<&'a SentimentReading>,
}

/// `0x1234...abcd` form of an address.
pub fn shorten_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Health factor with two decimals. Debt-free accounts report an unbounded
/// health factor and are shown as `∞`.
pub fn format_health_factor(report: &RiskReport) -> String {
    if !report.account.has_debt() {
        return "∞".to_string();
    }
    format!("{:.2}", report.account.health_factor())
}

/// Single-asset estimate with three decimals, `–` when unavailable.
pub fn format_single_asset(price: &LiquidationPrice) -> String {
    match price {
        LiquidationPrice::Estimated(p) => format!("{:.3}", p),
        LiquidationPrice::AtCurrentPrice => "current".to_string(),
        LiquidationPrice::Unavailable => "–".to_string(),
    }
}

/// Market-wide estimate; an account already at the boundary shows `current`.
pub fn format_market_wide(price: &LiquidationPrice) -> String {
    format_single_asset(price)
}

/// Whole-dollar price with thousands separators (e.g., `$67,123`).
pub fn format_usd(value: f64) -> String {
    let rounded = value.round().abs() as u128;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 && rounded > 0 { "-" } else { "" };
    format!("{}${}", sign, grouped)
}

/// Signed 24h change with two decimals (e.g., `+1.25%`).
pub fn format_change(pct: f64) -> String {
    let sign = if pct > 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, pct)
}

fn trend_marker(trend: PriceTrend) -> &'static str {
    match trend {
        PriceTrend::Up => "▲",
        PriceTrend::Down => "▼",
        PriceTrend::Flat => "■",
    }
}

fn write_estimates(
    out: &mut String,
    title: &str,
    estimates: &[LiquidationEstimate],
    format: fn(&LiquidationPrice) -> String,
) {
    let _ = writeln!(out, "{}", title);
    for estimate in estimates {
        let _ = writeln!(out, "  {:<8} {:>16}", estimate.asset_id, format(&estimate.price));
    }
}

/// Human-readable dashboard.
pub fn render(output: &DashboardOutput<'_>) -> String {
    let report = output.report;
    let mut out = String::new();

    let _ = writeln!(out, "Account        {}", shorten_address(&report.user));
    let _ = writeln!(out, "Collateral     {}", format_usd(report.account.total_collateral_usd()));
    let _ = writeln!(out, "Debt           {}", format_usd(report.account.total_debt_usd()));
    let _ = writeln!(
        out,
        "Health factor  {} ({})",
        format_health_factor(report),
        report.risk.label()
    );
    if report.risk.is_liquidatable() {
        let _ = writeln!(out, "               eligible for liquidation");
    }
    let _ = writeln!(out);

    write_estimates(&mut out, "Liquidation price (single asset)", &report.single_asset, format_single_asset);
    write_estimates(&mut out, "Liquidation price (market-wide)", &report.market_wide, format_market_wide);

    if !output.quotes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Market");
        for quote in output.quotes {
            let price = quote.current_price.map(format_usd).unwrap_or_else(|| "–".to_string());
            let change = quote
                .price_change_percentage_24h
                .map(format_change)
                .unwrap_or_else(|| "–".to_string());
            let _ = writeln!(
                out,
                "  {:<8} {:>12} {:>9} {}",
                quote.symbol.to_uppercase(),
                price,
                change,
                trend_marker(quote.trend())
            );
        }
    }

    if let Some(sentiment) = output.sentiment {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Fear & Greed   {} ({}, gauge {:+.0}°)",
            sentiment.value,
            sentiment.classification,
            sentiment.gauge_angle()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use riskboard_core::{AccountSnapshot, RiskLevel};

    fn report(debt: f64, hf: f64) -> RiskReport {
        RiskReport {
            user: "0x1234567890abcdef1234567890abcdef1234abcd".parse().unwrap(),
            account: AccountSnapshot::new(10_000.0, debt, 0.8, hf).unwrap(),
            risk: RiskLevel::from_health_factor(hf).unwrap(),
            single_asset: vec![
                LiquidationEstimate::new("WETH", LiquidationPrice::Estimated(1750.0)),
                LiquidationEstimate::unavailable("WBTC"),
            ],
            market_wide: vec![
                LiquidationEstimate::new("WETH", LiquidationPrice::AtCurrentPrice),
                LiquidationEstimate::unavailable("WBTC"),
            ],
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_shorten_address() {
        let address: Address = "0x1234567890abcdef1234567890abcdef1234abcd".parse().unwrap();
        let short = shorten_address(&address);
        assert!(short.starts_with("0x1234"));
        assert!(short.to_lowercase().ends_with("abcd"));
        assert_eq!(short.len(), 13);
    }

    #[test]
    fn test_format_prices() {
        assert_eq!(format_single_asset(&LiquidationPrice::Estimated(1750.0)), "1750.000");
        assert_eq!(format_single_asset(&LiquidationPrice::Unavailable), "–");
        assert_eq!(format_market_wide(&LiquidationPrice::AtCurrentPrice), "current");
    }

    #[test]
    fn test_format_usd_and_change() {
        assert_eq!(format_usd(67123.4), "$67,123");
        assert_eq!(format_usd(999.5), "$1,000");
        assert_eq!(format_usd(12.0), "$12");
        assert_eq!(format_usd(1_234_567.0), "$1,234,567");
        assert_eq!(format_change(1.254), "+1.25%");
        assert_eq!(format_change(-0.5), "-0.50%");
        assert_eq!(format_change(0.0), "0.00%");
    }

    #[test]
    fn test_health_factor_display() {
        assert_eq!(format_health_factor(&report(6_000.0, 1.3333)), "1.33");
        assert_eq!(format_health_factor(&report(0.0, 1e59)), "∞");
    }

    #[test]
    fn test_render_flags_liquidatable_account() {
        let report = report(9_000.0, 0.8889);
        let output = DashboardOutput {
            report: &report,
            quotes: &[],
            sentiment: None,
        };
        let text = render(&output);
        assert!(text.contains("0.89 (danger)"));
        assert!(text.contains("eligible for liquidation"));
    }

    #[test]
    fn test_render_dashboard() {
        let report = report(6_000.0, 1.3333);
        let output = DashboardOutput {
            report: &report,
            quotes: &[],
            sentiment: None,
        };
        let text = render(&output);
        assert!(text.contains("1.33 (warning)"));
        assert!(text.contains("1750.000"));
        assert!(text.contains("current"));
        assert!(!text.contains("Fear & Greed"));
        assert!(!text.contains("eligible for liquidation"));

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["report"]["risk"], "warning");
        assert_eq!(json["report"]["single_asset"][0]["price"]["kind"], "estimated");
    }
}
