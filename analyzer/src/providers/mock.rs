use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use common::{
    AnalysisRequest, AnalysisResult, Recommendation, RiskLevel, Sentiment, ServiceError,
};

use super::core::AnalysisProvider;

/// What the mock does once its delay elapses.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Succeed(AnalysisResult),
    FailTimeout,
    FailStatus(u16),
}

/// Stand-in for the real analysis engine: waits a fixed delay, then returns
/// a canned outcome. Counts calls so tests can assert the single-in-flight
/// property.
pub struct MockProvider {
    delay: Duration,
    outcome: MockOutcome,
    calls: AtomicUsize,
}

impl Default for MockProvider {
    fn default() -> Self {
        MockProvider::new(Duration::from_millis(50), MockOutcome::Succeed(sample_result()))
    }
}

impl MockProvider {
    pub fn new(delay: Duration, outcome: MockOutcome) -> Self {
        MockProvider {
            delay,
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_with_timeout() -> Self {
        MockProvider::new(Duration::from_millis(10), MockOutcome::FailTimeout)
    }

    /// How many analyze calls actually reached the provider.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("mock provider call, delay {:?}", self.delay);
        tokio::time::sleep(self.delay).await;

        match &self.outcome {
            MockOutcome::Succeed(result) => Ok(result.clone()),
            MockOutcome::FailTimeout => Err(ServiceError::Timeout(self.delay)),
            MockOutcome::FailStatus(status) => Err(ServiceError::Status(*status)),
        }
    }
}

/// The canned bullish verdict the engine mock resolves with.
pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        sentiment: Sentiment::Bullish,
        confidence: 85.0,
        recommendation: Recommendation::Buy,
        entry_price: Some(42350.50),
        stop_loss: Some(41200.00),
        take_profit: Some(44500.00),
        risk_level: RiskLevel::Medium,
        timeframe: "4H".to_string(),
        analysis: "The chart shows a clear uptrend with a breakout above the key $42,000 \
                   resistance. Volume is rising and the technical patterns point to trend \
                   continuation. The 50-period moving average is supporting price, \
                   indicating positive momentum."
            .to_string(),
        key_points: vec![
            "Breakout confirmed above the $42,000 resistance".to_string(),
            "Rising volume supports the move".to_string(),
            "RSI in positive territory but not overbought".to_string(),
            "50 MA acting as dynamic support".to_string(),
            "Bull flag pattern completed".to_string(),
        ],
    }
}
