use std::{io::Cursor, time::Duration};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use plantro_core::{
    application::create_service,
    domain::{
        common::{LLMConfig, PlantroConfig, ProviderKind, entities::app_errors::ErrorKind},
        diagnosis::{
            DiagnoseImageInput, Locale, PipelineStage, SearchByTextInput, ports::DiagnosisService,
        },
        image::entities::RawImage,
    },
};

fn offline_config() -> PlantroConfig {
    PlantroConfig {
        llm: LLMConfig::for_provider(ProviderKind::Offline),
        ..PlantroConfig::default()
    }
}

fn jpeg_photo() -> RawImage {
    let img = RgbImage::from_pixel(3000, 2000, Rgb([60, 140, 60]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    RawImage::sniffed(bytes)
}

#[tokio::test]
async fn test_photo_is_diagnosed_end_to_end_without_network() {
    let service = create_service(offline_config()).await.unwrap();

    let diagnosis = service
        .diagnose_image(DiagnoseImageInput {
            image: jpeg_photo(),
            locale: Some(Locale::English),
        })
        .await
        .unwrap();

    assert!(!diagnosis.is_unknown_subject);
    assert!(diagnosis.request_id.is_some());
    assert!(!diagnosis.recommended_products.is_empty());
    assert!((0.0..=1.0).contains(&diagnosis.confidence));
}

#[tokio::test]
async fn test_text_search_is_answered_offline() {
    let service = create_service(offline_config()).await.unwrap();

    let diagnosis = service
        .search_by_text(SearchByTextInput {
            query: "white powder on rose leaves".to_string(),
            locale: None,
        })
        .await
        .unwrap();

    assert!(diagnosis.recommended_products[0].price_minor_units.is_some());
}

#[tokio::test]
async fn test_undecodable_photo_fails_while_normalizing() {
    let service = create_service(offline_config()).await.unwrap();

    let failure = service
        .diagnose_image(DiagnoseImageInput {
            image: RawImage::new(b"not a photo".to_vec(), "image/jpeg"),
            locale: None,
        })
        .await
        .unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Normalizing);
    assert_eq!(failure.kind(), ErrorKind::ImageDecode);
}

#[tokio::test]
async fn test_missing_key_for_hosted_provider_fails_fast() {
    let config = PlantroConfig {
        llm: LLMConfig::for_provider(ProviderKind::Groq),
        ..PlantroConfig::default()
    };
    let service = create_service(config).await.unwrap();

    let failure = service
        .search_by_text(SearchByTextInput {
            query: "wilting".to_string(),
            locale: None,
        })
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::MissingCredential);
    assert_eq!(failure.stage, PipelineStage::Idle);
}

#[tokio::test]
async fn test_zero_request_timeout_is_rejected() {
    let mut config = offline_config();
    config.llm.request_timeout = Duration::ZERO;

    let error = create_service(config).await.err().unwrap();

    assert!(error.to_string().contains("request timeout"));
}
