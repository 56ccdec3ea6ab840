use common::AnalysisRequest;

/// Literal response schema the model is instructed to fill in. Kept as an
/// annotated JSON skeleton rather than a formal JSON Schema; the annotations
/// double as field-level instructions.
pub fn get_analysis_schema(request: &AnalysisRequest) -> String {
    let timeframe_hint = request
        .timeframe
        .as_deref()
        .map(|tf| format!(r#""{tf}""#))
        .unwrap_or_else(|| r#""string" // Dominant timeframe read off the chart, e.g. "4H""#.to_string());

    format!(
        r#"{{
    "sentiment": "string", // One of: "bullish", "bearish", "neutral"
    "confidence": number, // Confidence percentage, 0-100
    "recommendation": "string", // One of: "BUY", "SELL", "HOLD"
    "entry_price": number, // Optional. Suggested entry, omit if no actionable setup
    "stop_loss": number, // Optional. Protective stop, omit if no actionable setup
    "take_profit": number, // Optional. Profit target, omit if no actionable setup
    "risk_level": "string", // One of: "LOW", "MEDIUM", "HIGH"
    "timeframe": {timeframe_hint},
    "analysis": "string", // Narrative <500 chars, include volume and momentum insights
    "key_points": ["string"] // 3-5 short findings, most important first
}}"#
    )
}
