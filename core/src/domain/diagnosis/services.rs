use tracing::instrument;

use crate::domain::{
    common::{entities::app_errors::CoreError, generate_uuid_v7, services::Service},
    diagnosis::{
        entities::{
            AnalysisPayload, AnalysisRequest, Diagnosis, PipelineFailure, PipelineRun,
            PipelineStage,
        },
        extractor::extract_json,
        ports::{DiagnosisService, ModelGateway},
        prompts::build_prompt,
        value_objects::{DiagnoseImageInput, SearchByTextInput},
    },
    image::ports::ImageNormalizer,
};

impl<N, G> DiagnosisService for Service<N, G>
where
    N: ImageNormalizer,
    G: ModelGateway,
{
    #[instrument(skip(self, input), fields(mode = "image"))]
    async fn diagnose_image(
        &self,
        input: DiagnoseImageInput,
    ) -> Result<Diagnosis, PipelineFailure> {
        let request_id = generate_uuid_v7();
        let locale = input.locale.unwrap_or(self.config.locale);
        let mut run = PipelineRun::start(request_id);

        self.ensure_credential().map_err(|e| run.fail(e))?;

        run.advance(PipelineStage::Normalizing);
        tracing::info!(
            request_id = %request_id,
            original_bytes = input.image.len(),
            declared_mime = %input.image.mime_type,
            "normalizing image"
        );
        let encoded = self
            .image_normalizer
            .normalize(input.image, self.config.image)
            .await
            .map_err(|e| run.fail(e))?;
        tracing::info!(
            request_id = %request_id,
            width = encoded.width(),
            height = encoded.height(),
            encoded_bytes = encoded.encoded_bytes(),
            "image normalized"
        );

        let request = AnalysisRequest::image(request_id, encoded, locale);
        self.run_analysis(run, request).await
    }

    #[instrument(skip(self, input), fields(mode = "text"))]
    async fn search_by_text(
        &self,
        input: SearchByTextInput,
    ) -> Result<Diagnosis, PipelineFailure> {
        let request_id = generate_uuid_v7();
        let locale = input.locale.unwrap_or(self.config.locale);
        let run = PipelineRun::start(request_id);

        self.ensure_credential().map_err(|e| run.fail(e))?;
        let request = AnalysisRequest::text_query(request_id, &input.query, locale)
            .map_err(|e| run.fail(e))?;

        self.run_analysis(run, request).await
    }
}

impl<N, G> Service<N, G>
where
    N: ImageNormalizer,
    G: ModelGateway,
{
    fn ensure_credential(&self) -> Result<(), CoreError> {
        let llm = &self.config.llm;
        if llm.provider.requires_credential() && llm.credential().is_none() {
            return Err(CoreError::MissingCredential {
                provider: llm.provider.to_string(),
            });
        }
        Ok(())
    }

    /// Prompting through mapping, shared by both analysis modes.
    async fn run_analysis(
        &self,
        mut run: PipelineRun,
        request: AnalysisRequest,
    ) -> Result<Diagnosis, PipelineFailure> {
        run.advance(PipelineStage::Prompting);
        let mode = request.mode();
        let prompt = build_prompt(mode, request.locale, request.query_text());
        let AnalysisRequest { id, payload, .. } = request;

        run.advance(PipelineStage::AwaitingReply);
        let timeout = self.config.llm.request_timeout;
        tracing::info!(
            request_id = %id,
            mode = mode.as_str(),
            provider = %self.config.llm.provider,
            model = %self.config.llm.model,
            prompt_chars = prompt.len(),
            "submitting prompt"
        );
        let call = async {
            match payload {
                AnalysisPayload::Image(image) => {
                    self.model_gateway.submit_vision_prompt(prompt, image).await
                }
                AnalysisPayload::TextQuery(_) => self.model_gateway.submit_text_prompt(prompt).await,
            }
        };
        let reply = tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| CoreError::Timeout(timeout))
            .and_then(|reply| reply)
            .map_err(|e| run.fail(e))?;
        tracing::info!(request_id = %id, reply_len = reply.len(), "model replied");

        run.advance(PipelineStage::Extracting);
        let json_text = extract_json(&reply).map_err(|e| run.fail(e))?;

        run.advance(PipelineStage::Mapping);
        let diagnosis = self.mapper.map(&json_text).map_err(|e| run.fail(e))?;

        run.finish();
        tracing::info!(
            request_id = %id,
            issue = %diagnosis.issue_name,
            plant = %diagnosis.plant_name,
            unknown_subject = diagnosis.is_unknown_subject,
            "diagnosis ready"
        );

        Ok(diagnosis.with_request_id(id))
    }
}
