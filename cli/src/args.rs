use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use plantro_core::domain::{
    common::{LLMConfig, PlantroConfig, ProviderKind},
    diagnosis::{
        Locale,
        mapper::{DEFAULT_CONFIDENCE, DiagnosisDefaults},
    },
    image::value_objects::{DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY, NormalizeOptions},
};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "plantro",
    version,
    about = "Diagnose plant health from a photo or a description"
)]
pub struct Args {
    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub image: ImageArgs,

    #[command(flatten)]
    pub log: LogArgs,

    /// Language of the diagnosis text (en, bn)
    #[arg(long, env = "PLANTRO_LOCALE", default_value = "en", global = true)]
    pub locale: Locale,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    /// Confidence reported when the model gives none
    #[arg(long, env = "PLANTRO_DEFAULT_CONFIDENCE", default_value_t = DEFAULT_CONFIDENCE)]
    pub default_confidence: f64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LlmArgs {
    #[arg(long, env = "PLANTRO_PROVIDER", default_value = "groq", global = true)]
    pub provider: ProviderKind,

    /// Falls back to the provider's own variable, e.g. GROQ_API_KEY
    #[arg(long, env = "PLANTRO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Defaults to the provider's vision model
    #[arg(long, env = "PLANTRO_MODEL")]
    pub model: Option<String>,

    #[arg(long, env = "PLANTRO_BASE_URL")]
    pub base_url: Option<String>,

    /// Stream the reply instead of waiting for the whole body
    #[arg(long, env = "PLANTRO_STREAM")]
    pub stream: bool,

    #[arg(long, env = "PLANTRO_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

impl LlmArgs {
    fn resolved_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.provider
                .credential_env_var()
                .and_then(|name| std::env::var(name).ok())
        })
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct ImageArgs {
    /// Longest edge of the photo sent to the model, in pixels
    #[arg(long, env = "PLANTRO_MAX_DIMENSION", default_value_t = DEFAULT_MAX_DIMENSION)]
    pub max_dimension: u32,

    /// JPEG quality factor in (0, 1]
    #[arg(long, env = "PLANTRO_QUALITY", default_value_t = DEFAULT_QUALITY)]
    pub quality: f32,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    /// Used when RUST_LOG is not set
    #[arg(long, env = "PLANTRO_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[arg(long, env = "PLANTRO_LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Diagnose a plant from a photo
    Diagnose {
        /// Path to a JPEG, PNG, WebP or other common image
        image: PathBuf,
    },
    /// Look up a plant problem from a description of its symptoms
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

impl From<Args> for PlantroConfig {
    fn from(args: Args) -> Self {
        let provider = args.llm.provider;
        let api_key = args.llm.resolved_api_key();

        Self {
            llm: LLMConfig {
                provider,
                api_key,
                model: args
                    .llm
                    .model
                    .unwrap_or_else(|| provider.default_model().to_string()),
                base_url: args.llm.base_url,
                stream: args.llm.stream,
                request_timeout: Duration::from_secs(args.llm.timeout_secs),
            },
            image: NormalizeOptions::new(args.image.max_dimension, args.image.quality),
            diagnosis: DiagnosisDefaults {
                confidence: args.default_confidence,
                ..DiagnosisDefaults::default()
            },
            locale: args.locale,
        }
    }
}
