use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    diagnosis::{
        entities::{Diagnosis, PipelineFailure},
        value_objects::{DiagnoseImageInput, ModelReply, SearchByTextInput},
    },
    image::entities::EncodedImage,
};

/// Outbound port to a hosted model. One call per invocation, no retries.
#[cfg_attr(test, mockall::automock)]
pub trait ModelGateway: Send + Sync {
    fn submit_vision_prompt(
        &self,
        prompt: String,
        image: EncodedImage,
    ) -> impl Future<Output = Result<ModelReply, CoreError>> + Send;

    fn submit_text_prompt(
        &self,
        prompt: String,
    ) -> impl Future<Output = Result<ModelReply, CoreError>> + Send;
}

#[cfg_attr(test, mockall::automock)]
pub trait DiagnosisService: Send + Sync {
    fn diagnose_image(
        &self,
        input: DiagnoseImageInput,
    ) -> impl Future<Output = Result<Diagnosis, PipelineFailure>> + Send;

    fn search_by_text(
        &self,
        input: SearchByTextInput,
    ) -> impl Future<Output = Result<Diagnosis, PipelineFailure>> + Send;
}
