//! Core data models for the dashboard
//!
//! Both records are resolved into their canonical shape once, while being
//! deserialized from the LLM response. Rendering code only ever sees the
//! canonical snake_case fields.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::FinsightError;

//
// ================= Field Spellings =================
//

const REVENUE: &[&str] = &["revenue", "Revenue"];
const NET_INCOME: &[&str] = &["net_income", "netIncome", "net_income_usd"];
const OPERATING_INCOME: &[&str] = &["operating_income", "operatingIncome"];
const TOTAL_ASSETS: &[&str] = &["total_assets", "totalAssets"];
const TOTAL_LIABILITIES: &[&str] = &["total_liabilities", "totalLiabilities"];
const CASH_FLOW: &[&str] = &["cash_flow", "cashFlow"];
const EPS: &[&str] = &["eps", "EPS"];
const TOTAL_DEBT: &[&str] = &["total_debt", "totalDebt"];

const SUMMARY: &[&str] = &["summary", "executive_summary"];
const RISKS: &[&str] = &["risks", "key_risks"];

//
// ================= Metrics =================
//

/// Financial figures extracted from a report. `None` means the figure was
/// not found in the source text; it is never a stand-in for zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct FinancialMetrics {
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub operating_income: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub cash_flow: Option<f64>,
    pub eps: Option<f64>,
    pub total_debt: Option<f64>,
}

impl From<Map<String, Value>> for FinancialMetrics {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            revenue: resolve_number(&fields, REVENUE),
            net_income: resolve_number(&fields, NET_INCOME),
            operating_income: resolve_number(&fields, OPERATING_INCOME),
            total_assets: resolve_number(&fields, TOTAL_ASSETS),
            total_liabilities: resolve_number(&fields, TOTAL_LIABILITIES),
            cash_flow: resolve_number(&fields, CASH_FLOW),
            eps: resolve_number(&fields, EPS),
            total_debt: resolve_number(&fields, TOTAL_DEBT),
        }
    }
}

/// First spelling holding a number wins; null and non-numeric values fall
/// through. A zero is kept unless a later spelling holds a non-zero number.
fn resolve_number(fields: &Map<String, Value>, spellings: &[&str]) -> Option<f64> {
    let mut values = spellings
        .iter()
        .filter_map(|key| fields.get(*key))
        .filter_map(numeric_value);

    let first = values.next()?;
    if first != 0.0 {
        return Some(first);
    }
    Some(values.find(|v| *v != 0.0).unwrap_or(first))
}

/// Accepts JSON numbers and numeric strings such as `"$1,250,000"`.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' '))
                .collect();
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

//
// ================= Analysis =================
//

/// Structured result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct FinancialAnalysis {
    pub summary: String,
    pub risks: Vec<String>,
    pub metrics: FinancialMetrics,
}

impl TryFrom<Map<String, Value>> for FinancialAnalysis {
    type Error = FinsightError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let summary = resolve_summary(&fields)?;
        let risks = resolve_risks(&fields)?;

        // Some responses flatten the metrics into the analysis object itself.
        let metrics = match fields.get("metrics") {
            Some(Value::Object(inner)) => FinancialMetrics::from(inner.clone()),
            Some(Value::Null) => FinancialMetrics::default(),
            Some(other) => {
                return Err(FinsightError::Schema(format!(
                    "metrics must be an object, got {}",
                    json_type(other)
                )))
            }
            None => FinancialMetrics::from(fields.clone()),
        };

        Ok(Self {
            summary,
            risks,
            metrics,
        })
    }
}

fn resolve_summary(fields: &Map<String, Value>) -> Result<String, FinsightError> {
    for key in SUMMARY {
        match fields.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Ok(s.clone()),
            Some(Value::String(_)) | Some(Value::Null) | None => continue,
            Some(other) => {
                return Err(FinsightError::Schema(format!(
                    "{} must be a string, got {}",
                    key,
                    json_type(other)
                )))
            }
        }
    }
    Ok(String::new())
}

fn resolve_risks(fields: &Map<String, Value>) -> Result<Vec<String>, FinsightError> {
    for key in RISKS {
        match fields.get(*key) {
            Some(Value::Array(items)) if !items.is_empty() => {
                return items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s.clone()),
                        other => Err(FinsightError::Schema(format!(
                            "{} entries must be strings, got {}",
                            key,
                            json_type(other)
                        ))),
                    })
                    .collect();
            }
            Some(Value::Array(_)) | Some(Value::Null) | None => continue,
            Some(other) => {
                return Err(FinsightError::Schema(format!(
                    "{} must be an array, got {}",
                    key,
                    json_type(other)
                )))
            }
        }
    }
    Ok(Vec::new())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FinancialAnalysis {
    /// Parse the raw text content returned by the LLM.
    ///
    /// Tolerates a surrounding markdown code fence.
    pub fn from_llm_json(content: &str) -> crate::Result<Self> {
        let cleaned = content
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        serde_json::from_str(cleaned).map_err(FinsightError::InvalidResponse)
    }

    /// JSON schema the LLM is asked to conform to (strict structured output).
    pub fn json_schema() -> Value {
        let number = json!({ "type": ["number", "null"] });

        json!({
            "type": "object",
            "properties": {
                "summary": { "type": "string" },
                "risks": { "type": "array", "items": { "type": "string" } },
                "metrics": {
                    "type": "object",
                    "properties": {
                        "revenue": number,
                        "net_income": number,
                        "operating_income": number,
                        "total_assets": number,
                        "total_liabilities": number,
                        "cash_flow": number,
                        "eps": number,
                        "total_debt": number,
                    },
                    "required": [
                        "revenue",
                        "net_income",
                        "operating_income",
                        "total_assets",
                        "total_liabilities",
                        "cash_flow",
                        "eps",
                        "total_debt"
                    ],
                    "additionalProperties": false
                }
            },
            "required": ["summary", "risks", "metrics"],
            "additionalProperties": false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_fallback() {
        let metrics: FinancialMetrics =
            serde_json::from_value(json!({ "netIncome": 500 })).unwrap();
        assert_eq!(metrics.net_income, Some(500.0));
        assert_eq!(metrics.revenue, None);
    }

    #[test]
    fn test_spelling_order_and_falsy_values() {
        let metrics: FinancialMetrics = serde_json::from_value(json!({
            "net_income": 0,
            "netIncome": null,
            "net_income_usd": 42.5,
            "total_debt": 10,
            "totalDebt": 99
        }))
        .unwrap();

        assert_eq!(metrics.net_income, Some(42.5));
        assert_eq!(metrics.total_debt, Some(10.0));
    }

    #[test]
    fn test_zero_is_a_reported_value() {
        let metrics: FinancialMetrics = serde_json::from_value(json!({
            "total_debt": 0,
            "cash_flow": "0",
            "eps": 0.0,
            "EPS": null
        }))
        .unwrap();

        assert_eq!(metrics.total_debt, Some(0.0));
        assert_eq!(metrics.cash_flow, Some(0.0));
        assert_eq!(metrics.eps, Some(0.0));
        assert_eq!(metrics.revenue, None);
    }

    #[test]
    fn test_numeric_strings() {
        let metrics: FinancialMetrics = serde_json::from_value(json!({
            "revenue": "$1,250,000",
            "eps": "abc",
            "cash_flow": true
        }))
        .unwrap();

        assert_eq!(metrics.revenue, Some(1_250_000.0));
        assert_eq!(metrics.eps, None);
        assert_eq!(metrics.cash_flow, None);
    }

    #[test]
    fn test_analysis_alternate_names() {
        let analysis: FinancialAnalysis = serde_json::from_value(json!({
            "executive_summary": "Solid year.",
            "key_risks": ["FX exposure"],
            "metrics": { "totalAssets": 1000 }
        }))
        .unwrap();

        assert_eq!(analysis.summary, "Solid year.");
        assert_eq!(analysis.risks, vec!["FX exposure".to_string()]);
        assert_eq!(analysis.metrics.total_assets, Some(1000.0));
    }

    #[test]
    fn test_flattened_metrics() {
        let analysis: FinancialAnalysis = serde_json::from_value(json!({
            "summary": "ok",
            "risks": [],
            "revenue": 10
        }))
        .unwrap();

        assert_eq!(analysis.metrics.revenue, Some(10.0));
        assert!(analysis.risks.is_empty());
    }

    #[test]
    fn test_schema_violations() {
        assert!(FinancialAnalysis::from_llm_json("not json").is_err());
        assert!(FinancialAnalysis::from_llm_json("[1, 2]").is_err());
        assert!(FinancialAnalysis::from_llm_json(r#"{"summary": 3}"#).is_err());
        assert!(FinancialAnalysis::from_llm_json(r#"{"risks": "one"}"#).is_err());
        assert!(FinancialAnalysis::from_llm_json(r#"{"metrics": []}"#).is_err());

        let err = FinancialAnalysis::from_llm_json("oops").unwrap_err();
        assert!(matches!(err, FinsightError::InvalidResponse(_)));

        // The violation is kept as the cause rather than flattened away.
        let err = FinancialAnalysis::from_llm_json(r#"{"summary": 3}"#).unwrap_err();
        let trace = err.trace();
        assert_eq!(trace.len(), 2);
        assert!(trace[1].contains("summary must be a string"));
    }

    #[test]
    fn test_fenced_response() {
        let content = "```json\n{\"summary\": \"ok\", \"risks\": [\"market risk\"], \"metrics\": {}}\n```";
        let analysis = FinancialAnalysis::from_llm_json(content).unwrap();
        assert_eq!(analysis.summary, "ok");
        assert_eq!(analysis.risks, vec!["market risk".to_string()]);
        assert_eq!(analysis.metrics, FinancialMetrics::default());
    }

    #[test]
    fn test_serializes_canonical_names() {
        let metrics = FinancialMetrics {
            net_income: Some(7.0),
            ..Default::default()
        };
        let value = serde_json::to_value(&metrics).unwrap();
        assert_eq!(value["net_income"], json!(7.0));
        assert!(value.get("netIncome").is_none());
    }
}
