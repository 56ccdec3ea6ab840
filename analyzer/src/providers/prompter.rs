use chrono::Utc;

use common::AnalysisRequest;

use super::schemas::get_analysis_schema;

/// Builds the instruction block sent alongside the chart image.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    let now_utc = Utc::now();
    let current_datetime = now_utc.format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let timeframe_instruction = match request.timeframe.as_deref() {
        Some(timeframe) => format!("Base the verdict on the {timeframe} timeframe."),
        None => "Infer the dominant timeframe from the chart itself.".to_string(),
    };

    let schema = get_analysis_schema(request);

    format!(
        r#"Analyze the attached trading chart screenshot.

## Context:

current_datetime={current_datetime}

**Instructions:**

- Read trend direction, support/resistance, volume behavior and common
  technical patterns (breakouts, flags, divergences) from the chart image.
- {timeframe_instruction}
- Only suggest entry_price, stop_loss and take_profit when the chart shows an
  actionable setup; omit all three otherwise. Stops must be on the losing
  side of the entry for the suggested direction.
- Score confidence 0-100 from how many independent signals agree.
- Be concise and state the evidence for each key point.
- Output as JSON below, do ensure it's a valid JSON.

**JSON Output:**
```json
{schema}
```
"#
    )
}
