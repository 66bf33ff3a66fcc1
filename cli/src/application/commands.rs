use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use plantro_core::{
    application::create_service,
    domain::{
        common::PlantroConfig,
        diagnosis::{DiagnoseImageInput, SearchByTextInput, session::DiagnosisSession},
        image::entities::RawImage,
    },
};

use crate::{
    application::render,
    args::{Args, Command, OutputFormat},
};

pub async fn run(args: Args) -> Result<ExitCode, anyhow::Error> {
    let output = args.output;
    let command = args.command.clone();
    let config = PlantroConfig::from(args);

    let service = create_service(config).await?;
    let session = Arc::new(DiagnosisSession::new(service));

    let interrupt = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                session.cancel();
            }
        })
    };

    let outcome = match command {
        Command::Diagnose { image } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("failed to read {}", image.display()))?;
            tracing::info!(path = %image.display(), bytes = bytes.len(), "photo loaded");

            session
                .diagnose_image(DiagnoseImageInput {
                    image: RawImage::sniffed(bytes),
                    locale: None,
                })
                .await
        }
        Command::Search { query } => {
            session
                .search_by_text(SearchByTextInput {
                    query: query.join(" "),
                    locale: None,
                })
                .await
        }
    };
    interrupt.abort();

    match (outcome, output) {
        (Ok(diagnosis), OutputFormat::Text) => {
            print!("{}", render::diagnosis_text(&diagnosis)?);
            Ok(ExitCode::SUCCESS)
        }
        (Ok(diagnosis), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(&diagnosis)?);
            Ok(ExitCode::SUCCESS)
        }
        (Err(failure), OutputFormat::Text) => {
            eprintln!("{}", render::failure_text(&failure));
            Ok(ExitCode::FAILURE)
        }
        (Err(failure), OutputFormat::Json) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&render::failure_json(&failure))?
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
