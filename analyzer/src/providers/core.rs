use async_trait::async_trait;

use common::{AnalysisRequest, AnalysisResult, ServiceError};

/// Boundary to the external analysis engine. The workflow only ever sees
/// this trait, so the production provider and the mock are interchangeable.
/// No retry logic lives here; retry is a user-initiated resubmit.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError>;
}

/// Bounds check on provider output. Price-level ordering is left to the
/// provider; confidence outside 0-100 is unusable for display.
pub(crate) fn check_result(result: AnalysisResult) -> Result<AnalysisResult, ServiceError> {
    if !(0.0..=100.0).contains(&result.confidence) {
        return Err(ServiceError::MalformedResponse(format!(
            "confidence {} outside 0-100",
            result.confidence
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::sample_result;

    #[test]
    fn test_check_result_accepts_sane_confidence() {
        assert!(check_result(sample_result()).is_ok());
    }

    #[test]
    fn test_check_result_rejects_out_of_bounds_confidence() {
        let mut result = sample_result();
        result.confidence = 850.0;
        let err = check_result(result).unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }
}
