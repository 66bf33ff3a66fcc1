use crate::{
    domain::common::{PlantroConfig, services::Service},
    infrastructure::{image::raster_normalizer::RasterImageNormalizer, llm::ModelGatewayClient},
};

pub type PlantroService = Service<RasterImageNormalizer, ModelGatewayClient>;

/// Wires the production adapters for the configured provider.
pub async fn create_service(config: PlantroConfig) -> Result<PlantroService, anyhow::Error> {
    config.image.validate()?;
    if !(0.0..=1.0).contains(&config.diagnosis.confidence) {
        anyhow::bail!(
            "default confidence must be within [0, 1], got {}",
            config.diagnosis.confidence
        );
    }
    if config.llm.request_timeout.is_zero() {
        anyhow::bail!("request timeout must be greater than zero");
    }

    let model_gateway = ModelGatewayClient::from_config(&config.llm);
    tracing::info!(
        provider = %config.llm.provider,
        model = %config.llm.model,
        base_url = config.llm.base_url(),
        streaming = config.llm.stream,
        locale = %config.locale,
        "diagnosis service ready"
    );

    Ok(Service::new(config, RasterImageNormalizer::new(), model_gateway))
}
