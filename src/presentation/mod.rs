//! Presentation layer
//!
//! Turns a finished analysis into display-ready values: formatted metric
//! tiles, the health label, chart series and the text panels. Nothing in
//! here can fail; missing data degrades to placeholders.

use serde::Serialize;
use std::fmt;

use crate::analyzer::truncate_chars;
use crate::models::{FinancialAnalysis, FinancialMetrics};
use crate::pipeline::AnalysisReport;

pub mod html;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_SUMMARY: &str = "No summary available.";
pub const NO_RISKS: &str = "No risks identified.";

/// Characters of extracted text shown in the raw-text panel
pub const RAW_TEXT_PREVIEW_CHARS: usize = 20_000;

//
// ================= Formatting =================
//

/// Format a dollar magnitude: `$1.23B`, `$2.50M`, or `$950`.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };

    let abs_v = v.abs();
    let sign = if v < 0.0 { "-" } else { "" };

    if abs_v >= 1_000_000_000.0 {
        format!("{}${:.2}B", sign, abs_v / 1_000_000_000.0)
    } else if abs_v >= 1_000_000.0 {
        format!("{}${:.2}M", sign, abs_v / 1_000_000.0)
    } else {
        format!("{}${}", sign, group_thousands(&format!("{:.0}", abs_v)))
    }
}

/// Per-share figures are shown as plain numbers, always with a decimal part.
pub fn format_eps(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) if v.fract() == 0.0 => format!("{:.1}", v),
        Some(v) => v.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

//
// ================= Health =================
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthLabel {
    #[serde(rename = "Financially Stable")]
    FinanciallyStable,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthLabel::FinanciallyStable => "Financially Stable",
            HealthLabel::NeedsAttention => "Needs Attention",
        };
        write!(f, "{}", s)
    }
}

/// Stable only when all four inputs are known, profit and cash flow are
/// positive, and debt is below assets.
pub fn financial_health(metrics: &FinancialMetrics) -> HealthLabel {
    match (
        metrics.net_income,
        metrics.cash_flow,
        metrics.total_assets,
        metrics.total_debt,
    ) {
        (Some(ni), Some(cf), Some(ta), Some(td)) if ni > 0.0 && cf > 0.0 && td < ta => {
            HealthLabel::FinanciallyStable
        }
        _ => HealthLabel::NeedsAttention,
    }
}

//
// ================= Charts =================
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: &'static str,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: &'static str,
    pub y_axis: &'static str,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn value_of(&self, label: &str) -> Option<f64> {
        self.bars.iter().find(|b| b.label == label).map(|b| b.value)
    }
}

/// Equity vs Debt. Equity never goes below zero.
pub fn capital_structure(metrics: &FinancialMetrics) -> BarChart {
    let total_assets = metrics.total_assets.unwrap_or(0.0);
    let total_debt = metrics.total_debt.unwrap_or(0.0);
    let equity = (total_assets - total_debt).max(0.0);

    BarChart {
        title: "Capital Structure Overview",
        y_axis: "USD",
        bars: vec![
            Bar {
                label: "Equity",
                value: equity,
                color: "#7C5CFF",
            },
            Bar {
                label: "Debt",
                value: total_debt,
                color: "#FF6B6B",
            },
        ],
    }
}

pub fn profitability(metrics: &FinancialMetrics) -> BarChart {
    BarChart {
        title: "Profitability Breakdown",
        y_axis: "USD",
        bars: vec![
            Bar {
                label: "Revenue",
                value: metrics.revenue.unwrap_or(0.0),
                color: "#4CC9F0",
            },
            Bar {
                label: "Operating Income",
                value: metrics.operating_income.unwrap_or(0.0),
                color: "#7209B7",
            },
            Bar {
                label: "Net Income",
                value: metrics.net_income.unwrap_or(0.0),
                color: "#3A0CA3",
            },
        ],
    }
}

//
// ================= View =================
//

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
}

/// Display-ready content of one dashboard page
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub tiles: Vec<MetricTile>,
    pub health: HealthLabel,
    pub capital_structure: BarChart,
    pub profitability: BarChart,
    pub summary: String,
    pub risks: Vec<String>,
    pub raw_text: String,
}

impl DashboardView {
    pub fn new(analysis: &FinancialAnalysis, text: &str) -> Self {
        let m = &analysis.metrics;

        // Tiles show a zero figure as N/A; health and charts use it as-is.
        let shown = |v: Option<f64>| v.filter(|x| *x != 0.0);
        let tile = |label, value| MetricTile { label, value };
        let tiles = vec![
            tile("Revenue", format_currency(shown(m.revenue))),
            tile("Net Income", format_currency(shown(m.net_income))),
            tile("Operating Income", format_currency(shown(m.operating_income))),
            tile("EPS", format_eps(shown(m.eps))),
            tile("Total Assets", format_currency(shown(m.total_assets))),
            tile("Total Liabilities", format_currency(shown(m.total_liabilities))),
            tile("Cash Flow", format_currency(shown(m.cash_flow))),
            tile("Total Debt", format_currency(shown(m.total_debt))),
        ];

        let summary = if analysis.summary.trim().is_empty() {
            NO_SUMMARY.to_string()
        } else {
            analysis.summary.clone()
        };

        Self {
            tiles,
            health: financial_health(m),
            capital_structure: capital_structure(m),
            profitability: profitability(m),
            summary,
            risks: analysis.risks.clone(),
            raw_text: truncate_chars(text, RAW_TEXT_PREVIEW_CHARS).to_string(),
        }
    }

    pub fn from_report(report: &AnalysisReport) -> Self {
        Self::new(&report.analysis, &report.text)
    }

    pub fn tile(&self, label: &str) -> Option<&str> {
        self.tiles
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(ni: Option<f64>, cf: Option<f64>, ta: Option<f64>, td: Option<f64>) -> FinancialMetrics {
        FinancialMetrics {
            net_income: ni,
            cash_flow: cf,
            total_assets: ta,
            total_debt: td,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Some(1_234_567_890.0)), "$1.23B");
        assert_eq!(format_currency(Some(2_500_000.0)), "$2.50M");
        assert_eq!(format_currency(Some(950.0)), "$950");
        assert_eq!(format_currency(Some(-1_200_000.0)), "-$1.20M");
        assert_eq!(format_currency(Some(1_234.0)), "$1,234");
        assert_eq!(format_currency(Some(-45_678.0)), "-$45,678");
        assert_eq!(format_currency(Some(999_999.0)), "$999,999");
        assert_eq!(format_currency(None), "N/A");
        assert_eq!(format_currency(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn test_non_numeric_source_value() {
        let parsed: FinancialMetrics =
            serde_json::from_value(serde_json::json!({ "revenue": "abc" })).unwrap();
        assert_eq!(format_currency(parsed.revenue), "N/A");
    }

    #[test]
    fn test_format_eps() {
        assert_eq!(format_eps(Some(2.5)), "2.5");
        assert_eq!(format_eps(Some(3.0)), "3.0");
        assert_eq!(format_eps(None), "N/A");
    }

    #[test]
    fn test_financial_health() {
        let stable = metrics(Some(100.0), Some(50.0), Some(1000.0), Some(400.0));
        assert_eq!(financial_health(&stable), HealthLabel::FinanciallyStable);

        let missing = metrics(Some(100.0), None, Some(1000.0), Some(400.0));
        assert_eq!(financial_health(&missing), HealthLabel::NeedsAttention);

        let over_leveraged = metrics(Some(100.0), Some(50.0), Some(1000.0), Some(1000.0));
        assert_eq!(financial_health(&over_leveraged), HealthLabel::NeedsAttention);

        let loss = metrics(Some(-1.0), Some(50.0), Some(1000.0), Some(400.0));
        assert_eq!(financial_health(&loss), HealthLabel::NeedsAttention);

        let nan = metrics(Some(f64::NAN), Some(50.0), Some(1000.0), Some(400.0));
        assert_eq!(financial_health(&nan), HealthLabel::NeedsAttention);

        assert_eq!(HealthLabel::FinanciallyStable.to_string(), "Financially Stable");
    }

    #[test]
    fn test_zero_debt_is_stable() {
        let analysis: FinancialAnalysis = serde_json::from_value(serde_json::json!({
            "summary": "Debt free.",
            "risks": [],
            "metrics": {
                "net_income": 100,
                "cash_flow": 50,
                "total_assets": 1000,
                "total_debt": 0
            }
        }))
        .unwrap();

        assert_eq!(financial_health(&analysis.metrics), HealthLabel::FinanciallyStable);

        let view = DashboardView::new(&analysis, "");
        assert_eq!(view.health, HealthLabel::FinanciallyStable);
        assert_eq!(view.tile("Total Debt"), Some(NOT_AVAILABLE));
        assert_eq!(view.tile("Net Income"), Some("$100"));
        assert_eq!(view.capital_structure.value_of("Equity"), Some(1000.0));
        assert_eq!(view.capital_structure.value_of("Debt"), Some(0.0));
    }

    #[test]
    fn test_capital_structure() {
        let chart = capital_structure(&metrics(None, None, Some(1000.0), Some(400.0)));
        assert_eq!(chart.value_of("Equity"), Some(600.0));
        assert_eq!(chart.value_of("Debt"), Some(400.0));

        let chart = capital_structure(&metrics(None, None, Some(1000.0), Some(1200.0)));
        assert_eq!(chart.value_of("Equity"), Some(0.0));
        assert_eq!(chart.value_of("Debt"), Some(1200.0));

        let chart = capital_structure(&FinancialMetrics::default());
        assert_eq!(chart.value_of("Equity"), Some(0.0));
        assert_eq!(chart.value_of("Debt"), Some(0.0));
    }

    #[test]
    fn test_profitability() {
        let m = FinancialMetrics {
            revenue: Some(500.0),
            net_income: Some(50.0),
            ..Default::default()
        };
        let chart = profitability(&m);
        assert_eq!(chart.value_of("Revenue"), Some(500.0));
        assert_eq!(chart.value_of("Operating Income"), Some(0.0));
        assert_eq!(chart.value_of("Net Income"), Some(50.0));
    }

    #[test]
    fn test_view_placeholders() {
        let analysis = FinancialAnalysis {
            summary: String::new(),
            risks: vec![],
            metrics: FinancialMetrics::default(),
        };
        let view = DashboardView::new(&analysis, &"a".repeat(RAW_TEXT_PREVIEW_CHARS + 10));

        assert_eq!(view.summary, NO_SUMMARY);
        assert!(view.risks.is_empty());
        assert_eq!(view.tiles.len(), 8);
        assert!(view.tiles.iter().all(|t| t.value == NOT_AVAILABLE));
        assert_eq!(view.health, HealthLabel::NeedsAttention);
        assert_eq!(view.raw_text.chars().count(), RAW_TEXT_PREVIEW_CHARS);
    }

    #[test]
    fn test_view_resolves_camel_case_metric() {
        let analysis: FinancialAnalysis = serde_json::from_value(serde_json::json!({
            "summary": "ok",
            "risks": [],
            "metrics": { "netIncome": 500 }
        }))
        .unwrap();

        let view = DashboardView::new(&analysis, "");
        assert_eq!(view.tile("Net Income"), Some("$500"));
    }
}
