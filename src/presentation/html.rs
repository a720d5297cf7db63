//! HTML rendering for the dashboard pages
//!
//! Pages are plain server-rendered HTML; charts are inline SVG.

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{format_currency, BarChart, DashboardView, HealthLabel, NO_RISKS};

const TITLE: &str = "FinSight AI";
const SUBTITLE: &str = "10-K Financial Analysis Dashboard";

pub const UPLOAD_PROMPT: &str = "Upload a 10-K PDF to begin the analysis.";
pub const ERROR_NOTICE: &str = "Error during analysis. See details below.";

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 420.0;
const CHART_MARGIN: f64 = 48.0;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 1rem 2rem; }
header { text-align: center; }
header h4 { color: gray; font-weight: normal; }
.tiles { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.tile { border: 1px solid #e5e5e5; border-radius: 8px; padding: 0.75rem 1rem; }
.tile .label { color: #666; font-size: 0.9rem; }
.tile .value { font-size: 1.6rem; font-weight: 600; }
.notice { border-radius: 8px; padding: 0.75rem 1rem; }
.info { background: #e8f1fb; }
.success { background: #e7f6ec; }
.error { background: #fdecea; }
.health.stable { color: #1a7f37; }
.health.attention { color: #9a6700; }
pre.trace, pre.raw { background: #f6f8fa; padding: 1rem; overflow: auto; max-height: 300px; white-space: pre-wrap; }
"#;

/// Landing page with the upload form
pub fn render_upload_page() -> String {
    let body = format!(
        "{}\n<div class=\"notice info\">{}</div>\n",
        upload_form(),
        encode_text(UPLOAD_PROMPT)
    );
    page(&body)
}

/// Full dashboard for one analyzed document
pub fn render_dashboard(view: &DashboardView) -> String {
    let mut body = String::new();

    body.push_str(&upload_form());
    body.push_str("<div class=\"notice success\">Analysis complete</div>\n<hr>\n");

    body.push_str("<h2>Key Financial Metrics</h2>\n<div class=\"tiles\">\n");
    for tile in &view.tiles {
        body.push_str(&format!(
            "<div class=\"tile\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
            encode_text(tile.label),
            encode_text(&tile.value)
        ));
    }
    body.push_str("</div>\n<hr>\n");

    let health_class = match view.health {
        HealthLabel::FinanciallyStable => "stable",
        HealthLabel::NeedsAttention => "attention",
    };
    body.push_str(&format!(
        "<h2>Financial Health Indicator</h2>\n<h3 class=\"health {}\">{}</h3>\n<hr>\n",
        health_class, view.health
    ));

    body.push_str(&format!(
        "<h2>{}</h2>\n{}\n",
        view.capital_structure.title,
        render_bar_chart(&view.capital_structure)
    ));
    body.push_str(&format!(
        "<h2>{}</h2>\n{}\n<hr>\n",
        view.profitability.title,
        render_bar_chart(&view.profitability)
    ));

    body.push_str(&format!(
        "<h2>Executive Summary</h2>\n<details class=\"summary\"><summary>View Summary</summary>\n<p>{}</p>\n</details>\n",
        encode_text(&view.summary)
    ));

    body.push_str("<h2>Key Risk Factors</h2>\n<details class=\"risks\"><summary>View Risks</summary>\n");
    if view.risks.is_empty() {
        body.push_str(&format!("<p>{}</p>\n", NO_RISKS));
    } else {
        body.push_str("<ul>\n");
        for risk in &view.risks {
            body.push_str(&format!("<li>{}</li>\n", encode_text(risk)));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</details>\n<hr>\n");

    body.push_str(&format!(
        "<details class=\"raw-text\"><summary>Raw extracted text (first 20k chars)</summary>\n<pre class=\"raw\">{}</pre>\n</details>\n",
        encode_text(&view.raw_text)
    ));

    page(&body)
}

/// Error page: generic notice followed by the failure trace
pub fn render_error_page(trace: &[String]) -> String {
    let lines: Vec<String> = trace.iter().map(|l| encode_text(l).into_owned()).collect();
    let body = format!(
        "{}\n<div class=\"notice error\">{}</div>\n<pre class=\"trace\">{}</pre>\n",
        upload_form(),
        ERROR_NOTICE,
        lines.join("\n")
    );
    page(&body)
}

fn upload_form() -> String {
    r#"<form class="upload" action="/analyze" method="post" enctype="multipart/form-data">
<label for="file">Upload 10-K Report (PDF)</label>
<input type="file" id="file" name="file" accept="application/pdf,.pdf" required>
<button type="submit">Analyze</button>
</form>"#
        .to_string()
}

fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<header>
<h1>{title}</h1>
<h4>{subtitle}</h4>
</header>
<hr>
{body}
</body>
</html>
"#,
        title = TITLE,
        subtitle = SUBTITLE,
        style = STYLE,
        body = body
    )
}

/// Vertical bar chart as inline SVG. Negative values hang below the zero line.
pub fn render_bar_chart(chart: &BarChart) -> String {
    let max = chart.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    let min = chart.bars.iter().map(|b| b.value).fold(0.0_f64, f64::min);
    let span = if max - min > 0.0 { max - min } else { 1.0 };

    let plot_height = CHART_HEIGHT - 2.0 * CHART_MARGIN;
    let plot_width = CHART_WIDTH - 2.0 * CHART_MARGIN;
    let zero_y = CHART_MARGIN + plot_height * (max / span);

    let slot = plot_width / chart.bars.len().max(1) as f64;
    let bar_width = slot * 0.6;

    let mut svg = format!(
        "<svg class=\"chart\" role=\"img\" aria-label=\"{}\" viewBox=\"0 0 {} {}\" width=\"100%\" height=\"{}\">\n",
        encode_double_quoted_attribute(chart.title),
        CHART_WIDTH,
        CHART_HEIGHT,
        CHART_HEIGHT
    );
    svg.push_str(&format!(
        "<text x=\"12\" y=\"{:.1}\" transform=\"rotate(-90 12 {:.1})\" font-size=\"12\">{}</text>\n",
        CHART_HEIGHT / 2.0,
        CHART_HEIGHT / 2.0,
        encode_text(chart.y_axis)
    ));
    svg.push_str(&format!(
        "<line x1=\"{m:.1}\" y1=\"{y:.1}\" x2=\"{x2:.1}\" y2=\"{y:.1}\" stroke=\"#999\"/>\n",
        m = CHART_MARGIN,
        y = zero_y,
        x2 = CHART_WIDTH - CHART_MARGIN
    ));

    for (i, bar) in chart.bars.iter().enumerate() {
        let height = plot_height * (bar.value.abs() / span);
        let top = if bar.value >= 0.0 { zero_y - height } else { zero_y };
        let x = CHART_MARGIN + slot * i as f64 + (slot - bar_width) / 2.0;
        let center = x + bar_width / 2.0;

        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"><title>{}: {}</title></rect>\n",
            x,
            top,
            bar_width,
            height,
            bar.color,
            encode_text(bar.label),
            encode_text(&format_currency(Some(bar.value)))
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\">{}</text>\n",
            center,
            CHART_HEIGHT - CHART_MARGIN / 2.0,
            encode_text(bar.label)
        ));
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinancialAnalysis, FinancialMetrics};
    use crate::presentation::{capital_structure, NO_SUMMARY};

    fn risk_items(html: &str) -> Vec<String> {
        let start = html.find("<details class=\"risks\">").expect("risk panel");
        let end = start + html[start..].find("</details>").expect("risk panel end");
        html[start..end]
            .split("<li>")
            .skip(1)
            .map(|s| s.split("</li>").next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_dashboard_renders_tiles_and_risks() {
        let analysis = FinancialAnalysis {
            summary: "ok".to_string(),
            risks: vec!["market risk".to_string()],
            metrics: FinancialMetrics {
                revenue: Some(10_000_000.0),
                net_income: Some(2_000_000.0),
                ..Default::default()
            },
        };
        let html = render_dashboard(&DashboardView::new(&analysis, "Revenue was $10M."));

        assert!(html.contains("<div class=\"label\">Revenue</div><div class=\"value\">$10.00M</div>"));
        assert!(html.contains("<div class=\"label\">Net Income</div><div class=\"value\">$2.00M</div>"));
        assert_eq!(risk_items(&html), vec!["market risk".to_string()]);
        assert!(html.contains("Needs Attention"));
    }

    #[test]
    fn test_placeholders_and_escaping() {
        let analysis = FinancialAnalysis {
            summary: String::new(),
            risks: vec![],
            metrics: FinancialMetrics::default(),
        };
        let html = render_dashboard(&DashboardView::new(&analysis, "<script>alert(1)</script>"));

        assert!(html.contains(NO_SUMMARY));
        assert!(html.contains(NO_RISKS));
        assert!(risk_items(&html).is_empty());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_bar_chart_svg() {
        let chart = capital_structure(&FinancialMetrics {
            total_assets: Some(1000.0),
            total_debt: Some(400.0),
            ..Default::default()
        });
        let svg = render_bar_chart(&chart);

        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("Equity: $600"));
        assert!(svg.contains("Debt: $400"));
    }

    #[test]
    fn test_error_page() {
        let html = render_error_page(&[
            "Extraction error: Failed to load PDF".to_string(),
            "caused by: <bad>".to_string(),
        ]);
        assert!(html.contains(ERROR_NOTICE));
        assert!(html.contains("caused by: &lt;bad&gt;"));
        assert!(!html.contains("Key Financial Metrics"));
    }

    #[test]
    fn test_upload_page() {
        let html = render_upload_page();
        assert!(html.contains(UPLOAD_PROMPT));
        assert!(html.contains("accept=\"application/pdf,.pdf\""));
    }
}
