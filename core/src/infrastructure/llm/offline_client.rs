use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::domain::{
    common::entities::app_errors::CoreError,
    diagnosis::{ports::ModelGateway, value_objects::ModelReply},
    image::entities::EncodedImage,
};

/// Gateway that answers from a fixed set of diagnoses without any network.
///
/// The scenario is picked from a SHA-256 digest of the input, so the same
/// photo or query always gets the same answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClient;

impl OfflineClient {
    pub fn new() -> Self {
        Self
    }

    fn reply_for(&self, prompt: &str, image_payload: Option<&str>) -> ModelReply {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        if let Some(payload) = image_payload {
            hasher.update(payload.as_bytes());
        }
        let digest = hasher.finalize();

        let scenarios = scenarios();
        let index = usize::from(digest[0]) % scenarios.len();
        tracing::info!(
            digest = %hex::encode(&digest[..8]),
            scenario = index,
            "answering from offline scenarios"
        );

        ModelReply::new(scenarios[index].to_string())
    }
}

fn scenarios() -> [Value; 3] {
    [
        json!({
            "isUnknownSubject": false,
            "name": "Healthy",
            "plantName": "Monstera Deliciosa",
            "confidence": 0.98,
            "reasoning": "Leaves are evenly green with no spots, lesions or pests.",
            "description": [
                "The plant appears healthy and vibrant.",
                "No visible signs of pests or diseases.",
                "Leaves are a rich green colour."
            ],
            "treatment": [
                "Continue regular watering.",
                "Ensure adequate indirect sunlight.",
                "Wipe leaves to remove dust."
            ],
            "recoveryTime": "N/A",
            "supplements": [{
                "name": "Organic Fertilizer",
                "price": 299,
                "store": "Flipkart",
                "link": "https://www.flipkart.com/search?q=organic+fertilizer",
                "why_this_product": "Keeps a healthy plant well fed during the growing season."
            }]
        }),
        json!({
            "isUnknownSubject": false,
            "name": "Leaf Spot",
            "plantName": "Ficus Elastica",
            "confidence": 0.92,
            "reasoning": "Dark spots with yellow halos point to a fungal or bacterial infection.",
            "description": [
                "Brown or black spots on leaves.",
                "Yellow halos around spots.",
                "Caused by fungal or bacterial infection."
            ],
            "treatment": [
                "Remove infected leaves immediately.",
                "Avoid overhead watering to keep foliage dry.",
                "Apply copper-based fungicide if severe."
            ],
            "recoveryTime": "2-3 weeks",
            "supplements": [{
                "name": "Copper Fungicide",
                "price": 450,
                "store": "Flipkart",
                "link": "https://www.flipkart.com/search?q=copper+fungicide",
                "why_this_product": "Copper stops the spread of leaf spot pathogens."
            }]
        }),
        json!({
            "isUnknownSubject": false,
            "name": "Powdery Mildew",
            "plantName": "Rosa (Rose)",
            "confidence": 0.95,
            "reasoning": "White powdery growth on the upper leaf surface is typical of mildew.",
            "description": [
                "White, powdery fungal growth on leaves.",
                "Leaves may curl or turn yellow.",
                "Common in humid conditions."
            ],
            "treatment": [
                "Improve air circulation around the plant.",
                "Prune affected areas.",
                "Apply neem oil or sulfur fungicide."
            ],
            "recoveryTime": "1-2 weeks",
            "supplements": [{
                "name": "Neem Oil",
                "price": 350,
                "store": "Flipkart",
                "link": "https://www.flipkart.com/search?q=neem+oil",
                "why_this_product": "Neem oil smothers mildew spores and is safe for roses."
            }]
        }),
    ]
}

impl ModelGateway for OfflineClient {
    async fn submit_vision_prompt(
        &self,
        prompt: String,
        image: EncodedImage,
    ) -> Result<ModelReply, CoreError> {
        Ok(self.reply_for(&prompt, Some(image.base64_payload())))
    }

    async fn submit_text_prompt(&self, prompt: String) -> Result<ModelReply, CoreError> {
        Ok(self.reply_for(&prompt, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_input_same_answer() {
        let client = OfflineClient::new();
        let first = client.submit_text_prompt("wilting".to_string()).await.unwrap();
        let second = client.submit_text_prompt("wilting".to_string()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_replies_are_plain_json_objects() {
        let client = OfflineClient::new();
        let image = EncodedImage::new("image/jpeg", b"leaf", 1, 1, 4);
        let reply = client
            .submit_vision_prompt("diagnose".to_string(), image)
            .await
            .unwrap();

        let value: Value = serde_json::from_str(reply.as_str()).unwrap();
        assert!(value["name"].is_string());
        assert_eq!(value["supplements"][0]["store"], "Flipkart");
    }
}
