use crate::domain::{
    common::PlantroConfig,
    diagnosis::{mapper::DiagnosisMapper, ports::ModelGateway},
    image::ports::ImageNormalizer,
};

/// Stateless orchestrator shared by every analysis request.
///
/// Holds only read-only configuration and the two collaborators, so a single
/// instance can serve concurrent requests.
#[derive(Clone)]
pub struct Service<N, G>
where
    N: ImageNormalizer,
    G: ModelGateway,
{
    pub(crate) config: PlantroConfig,
    pub(crate) image_normalizer: N,
    pub(crate) model_gateway: G,
    pub(crate) mapper: DiagnosisMapper,
}

impl<N, G> Service<N, G>
where
    N: ImageNormalizer,
    G: ModelGateway,
{
    pub fn new(config: PlantroConfig, image_normalizer: N, model_gateway: G) -> Self {
        let mapper = DiagnosisMapper::new(config.diagnosis.clone());

        Self {
            config,
            image_normalizer,
            model_gateway,
            mapper,
        }
    }

    pub fn config(&self) -> &PlantroConfig {
        &self.config
    }
}
