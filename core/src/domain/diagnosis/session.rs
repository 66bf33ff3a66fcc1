use std::{
    future::Future,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio_util::sync::CancellationToken;

use crate::domain::{
    common::entities::app_errors::CoreError,
    diagnosis::{
        entities::{Diagnosis, PipelineFailure},
        ports::DiagnosisService,
        value_objects::{DiagnoseImageInput, SearchByTextInput},
    },
};

/// Front for interactive callers where only the latest submission matters.
///
/// Starting a submission cancels the one in flight. A submission that loses
/// to a newer one ends with [`CoreError::Superseded`]; one stopped through
/// [`DiagnosisSession::cancel`] ends with [`CoreError::Cancelled`].
pub struct DiagnosisSession<S> {
    service: S,
    generation: AtomicU64,
    current: Mutex<CancellationToken>,
}

impl<S> DiagnosisSession<S>
where
    S: DiagnosisService,
{
    pub fn new(service: S) -> Self {
        Self {
            service,
            generation: AtomicU64::new(0),
            current: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn diagnose_image(
        &self,
        input: DiagnoseImageInput,
    ) -> Result<Diagnosis, PipelineFailure> {
        let (generation, token) = self.begin();
        self.settle(generation, token, self.service.diagnose_image(input))
            .await
    }

    pub async fn search_by_text(
        &self,
        input: SearchByTextInput,
    ) -> Result<Diagnosis, PipelineFailure> {
        let (generation, token) = self.begin();
        self.settle(generation, token, self.service.search_by_text(input))
            .await
    }

    /// Aborts the submission in flight, if any.
    pub fn cancel(&self) {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if !current.is_cancelled() {
            tracing::info!("cancelling analysis in flight");
            current.cancel();
        }
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        (generation, current.clone())
    }

    async fn settle<F>(
        &self,
        generation: u64,
        token: CancellationToken,
        work: F,
    ) -> Result<Diagnosis, PipelineFailure>
    where
        F: Future<Output = Result<Diagnosis, PipelineFailure>>,
    {
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(PipelineFailure::detached(CoreError::Cancelled)),
            outcome = work => outcome,
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding result of superseded analysis");
            return Err(PipelineFailure::detached(CoreError::Superseded));
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{
        common::entities::app_errors::ErrorKind,
        diagnosis::{entities::RecommendedProduct, ports::MockDiagnosisService},
    };

    fn diagnosis(issue: &str) -> Diagnosis {
        Diagnosis {
            request_id: None,
            is_unknown_subject: false,
            issue_name: issue.to_string(),
            plant_name: "Fern".to_string(),
            confidence: 0.8,
            reasoning: None,
            symptoms: vec![],
            treatment_steps: vec![],
            recovery_estimate: None,
            recommended_products: vec![RecommendedProduct::fallback()],
        }
    }

    fn query(text: &str) -> SearchByTextInput {
        SearchByTextInput {
            query: text.to_string(),
            locale: None,
        }
    }

    fn slow_then_fast_service() -> MockDiagnosisService {
        let mut service = MockDiagnosisService::new();
        service
            .expect_search_by_text()
            .withf(|input| input.query == "slow")
            .returning(|_| {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(diagnosis("Slow Answer"))
                })
            });
        service
            .expect_search_by_text()
            .withf(|input| input.query == "fast")
            .returning(|_| Box::pin(async { Ok(diagnosis("Fast Answer")) }));
        service
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_submission_supersedes_older() {
        let session = DiagnosisSession::new(slow_then_fast_service());

        let (older, newer) = tokio::join!(
            session.search_by_text(query("slow")),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                session.search_by_text(query("fast")).await
            }
        );

        assert_eq!(older.unwrap_err().kind(), ErrorKind::Superseded);
        assert_eq!(newer.unwrap().issue_name, "Fast Answer");
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_cancel() {
        let session = DiagnosisSession::new(slow_then_fast_service());

        let (outcome, _) = tokio::join!(session.search_by_text(query("slow")), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            session.cancel();
        });

        assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_submissions_both_complete() {
        let session = DiagnosisSession::new(slow_then_fast_service());

        let first = session.search_by_text(query("slow")).await.unwrap();
        let second = session.search_by_text(query("fast")).await.unwrap();

        assert_eq!(first.issue_name, "Slow Answer");
        assert_eq!(second.issue_name, "Fast Answer");
    }
}
