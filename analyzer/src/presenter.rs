//! Pure rendering of a completed analysis. No state, no side effects;
//! "start new analysis" stays with the workflow.

use common::AnalysisResult;

/// Renders the result as a plain-text report: header, summary row, trading
/// levels (only the prices actually present), narrative, key points in the
/// order the provider gave them.
pub fn render(result: &AnalysisResult) -> String {
    let mut out = String::new();

    out.push_str("Analysis Complete\n");
    out.push_str(&format!("Confidence: {:.0}%\n", result.confidence));
    out.push_str(&format!("Recommendation: {}\n\n", result.recommendation.as_ref()));

    out.push_str(&format!(
        "Timeframe: {} | Risk: {} | Sentiment: {}\n",
        result.timeframe,
        result.risk_level.as_ref(),
        result.sentiment.as_ref()
    ));

    if let Some(levels) = render_levels(result) {
        out.push('\n');
        out.push_str(&levels);
    }

    out.push_str("\nDetailed Analysis\n");
    out.push_str(&result.analysis);
    out.push('\n');

    if !result.key_points.is_empty() {
        out.push_str("\nKey Points:\n");
        for point in &result.key_points {
            out.push_str(&format!("  - {point}\n"));
        }
    }

    out
}

fn render_levels(result: &AnalysisResult) -> Option<String> {
    let lines: Vec<String> = [
        ("Entry Price", result.entry_price),
        ("Stop Loss", result.stop_loss),
        ("Take Profit", result.take_profit),
    ]
    .iter()
    .filter_map(|(label, price)| price.map(|p| format!("  {label}: ${p:.2}\n")))
    .collect();

    if lines.is_empty() {
        return None;
    }
    Some(format!("Trading Levels\n{}", lines.concat()))
}
