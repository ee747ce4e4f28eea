use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info, warn};
use voicechat::config::{build_app_config, AppConfig, ResponseSettings};
use voicechat::integration::{ChatSession, Orchestrator};
use voicechat::llm::{load_model, PromptTemplate};
use voicechat::speech::{self, SpeechQueue};
use voicechat::ui::{self, AppState};
use voicechat::{logging, ChatError};

fn main() -> ExitCode {
    // A missing .env is fine
    let dotenv = dotenvy::dotenv();
    logging::init();
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = match load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&e);
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_and_validate() -> voicechat::Result<AppConfig> {
    let config = build_app_config()?;
    config.validate()?;
    if let Some(version) = &config.version {
        info!("Configuration version {}", version);
    }
    Ok(config)
}

fn report_config_error(e: &ChatError) {
    error!("{}", e);
    eprintln!("{}", e);
    eprintln!();
    match e {
        ChatError::ConfigNotFound { .. } => eprintln!(
            "Create the file, or point MODEL_CONFIG_PATH, PROMPT_CONFIG_PATH, \
             RESPONSE_CONFIG_PATH and THEME_CONFIG_PATH (or CONFIG_PATH for a single file) \
             at existing configuration files."
        ),
        ChatError::ConfigParse { .. } => {
            eprintln!("Fix the JSON syntax in the file above and start again.")
        }
        ChatError::MissingSection(_) => eprintln!(
            "The configuration file named by CONFIG_PATH must contain both a \"model\" \
             and a \"prompt\" object."
        ),
        _ => eprintln!("Correct every problem listed above and start again."),
    }
}

fn run(config: AppConfig) -> Result<()> {
    let model_config = config.model_config()?;
    let prompt_config = config.prompt_config()?;
    let response = config.response_settings()?;
    let theme = config.theme_settings()?.with_env_overrides();

    info!("Starting {}", theme.app_name);

    // The model client stays on this runtime for the life of the process
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let model = runtime
        .block_on(load_model(&model_config))
        .context("Failed to load the model")?;
    let template = PromptTemplate::from_config(&prompt_config)?;

    let (response, speech) = start_speech(response);
    let speech_enabled = speech.is_some();

    let mut session = ChatSession::new(model_config, response, model, template);
    if let Some(queue) = speech {
        session = session.with_speech(queue);
    }

    let (orchestrator, handle) = Orchestrator::new(session, runtime);
    let worker = orchestrator.start()?;

    let state = AppState::new()
        .with_orchestrator(handle)
        .with_speech_enabled(speech_enabled);
    let result = ui::run(theme, state);

    if worker.join().is_err() {
        warn!("Chat worker panicked");
    }
    result.map_err(|e| anyhow::anyhow!("UI error: {}", e))
}

/// Bring up speech when responses should be spoken
fn start_speech(response: ResponseSettings) -> (ResponseSettings, Option<SpeechQueue>) {
    if !response.speak_responses {
        info!("Spoken responses are off");
        return (response, None);
    }

    let fallback = response.clone();
    let started = speech::initialize(response)
        .and_then(|(response, engine)| {
            let queue = SpeechQueue::spawn(engine, response.clone())?;
            Ok((response, queue))
        });

    match started {
        Ok((response, queue)) => (response, Some(queue)),
        Err(e) => {
            warn!("Speech unavailable, continuing with text only: {}", e);
            (fallback, None)
        }
    }
}
