//! Configuration loading and validation against real files

use parking_lot::{const_mutex, Mutex};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use voicechat::config::{
    load_config, validate_all_configs, validate_model_config, validate_prompt_config, AppConfig,
    ConfigSection, ConfigSource, SectionKind,
};
use voicechat::ChatError;

/// Tests that touch process environment variables take this first
static ENV_LOCK: Mutex<()> = const_mutex(());

fn section(value: Value) -> ConfigSection {
    value.as_object().cloned().unwrap()
}

fn write_json(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

#[test]
fn test_load_config_round_trip() {
    let value = json!({
        "use_remote_model": true,
        "model_source": "OpenAI",
        "model_name": "gpt-4o-mini",
        "model_parameters": {"temperature": 0.7, "max_tokens": 512},
        "nested": {"list": [1, 2.5, "three", null, false]}
    });

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();

    let loaded = load_config(file.path()).unwrap();
    assert_eq!(Value::Object(loaded), value);
}

#[test]
fn test_load_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_config(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ChatError::ConfigNotFound { ref path } if path.ends_with("absent.json")));
}

#[test]
fn test_load_config_malformed_json() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"model_name\": \"m\",").unwrap();

    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ChatError::ConfigParse { .. }));
}

#[test]
fn test_load_config_rejects_non_object() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[1, 2, 3]").unwrap();

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("expected a JSON object"));
}

#[test]
fn test_split_source_loads_all_sections() {
    let dir = TempDir::new().unwrap();
    let model = write_json(dir.path(), "model.json", &json!({"model_name": "m"}));
    let prompt = write_json(dir.path(), "prompt.json", &json!({"template": "{question}"}));
    let response = write_json(dir.path(), "response.json", &json!({"speak_responses": false}));
    let theme = write_json(dir.path(), "theme.json", &json!({"app_name": "Helper"}));

    let config = ConfigSource::Split {
        model,
        prompt,
        response,
        theme,
    }
    .load()
    .unwrap();

    assert_eq!(config.model["model_name"], json!("m"));
    assert_eq!(config.response["speak_responses"], json!(false));
    assert_eq!(config.theme_settings().unwrap().app_name, "Helper");
    assert!(config.version.is_none());
}

#[test]
fn test_split_source_fails_on_any_missing_file() {
    let dir = TempDir::new().unwrap();
    let model = write_json(dir.path(), "model.json", &json!({}));

    let err = ConfigSource::Split {
        model,
        prompt: dir.path().join("missing_prompt.json"),
        response: dir.path().join("r.json"),
        theme: dir.path().join("t.json"),
    }
    .load()
    .unwrap_err();

    assert!(err.to_string().contains("missing_prompt.json"));
}

#[test]
fn test_unified_source() {
    let dir = TempDir::new().unwrap();
    let path = write_json(
        dir.path(),
        "app.json",
        &json!({
            "app_name": "Kitchen Helper",
            "version": "2.0",
            "model": {
                "use_remote_model": false,
                "model_source": "Ollama",
                "model_name": "llama3.1",
                "model_parameters": {}
            },
            "prompt": {"template": "Q: {question}", "input_variables": ["question"]}
        }),
    );

    let source = ConfigSource::from_lookup(|key| {
        (key == "CONFIG_PATH").then(|| path.display().to_string())
    });
    let config = source.load().unwrap();

    assert_eq!(config.version.as_deref(), Some("2.0"));
    assert_eq!(config.theme_settings().unwrap().app_name, "Kitchen Helper");
    assert!(config.validate().is_ok());
    assert_eq!(config.response_settings().unwrap().response_stream_lag_time, 0.1);
}

#[test]
fn test_unified_source_requires_prompt() {
    let dir = TempDir::new().unwrap();
    let path = write_json(dir.path(), "app.json", &json!({"model": {}}));

    let err = ConfigSource::Unified(path).load().unwrap_err();
    assert!(matches!(err, ChatError::MissingSection(ref s) if s == "prompt"));
    assert!(!err.is_recoverable());
}

#[test]
fn test_remote_model_with_credential_is_valid() {
    let _guard = ENV_LOCK.lock();
    std::env::set_var("OPENAI_API_KEY", "sk-test");

    for name in ["gpt-4o", "gpt-4o-mini", "o3"] {
        let config = section(json!({
            "use_remote_model": true,
            "model_source": "OpenAI",
            "model_name": name,
            "model_parameters": {"temperature": 0.0}
        }));
        let (ok, errors) = validate_model_config(&config);
        assert!(ok, "unexpected errors: {:?}", errors);
        assert!(errors.is_empty());
    }

    std::env::remove_var("OPENAI_API_KEY");
}

#[test]
fn test_remote_model_without_credential() {
    let _guard = ENV_LOCK.lock();
    std::env::remove_var("OPENAI_API_KEY");

    let config = section(json!({
        "use_remote_model": true,
        "model_source": "OpenAI",
        "model_name": "gpt-4o",
        "model_parameters": {}
    }));
    let (ok, errors) = validate_model_config(&config);
    assert!(!ok);
    assert!(errors.iter().any(|e| e.contains("OPENAI_API_KEY")));
}

#[test]
fn test_prompt_variable_missing_from_template() {
    let config = section(json!({
        "template": "Answer briefly: {question}",
        "input_variables": ["question", "context"]
    }));
    let (ok, errors) = validate_prompt_config(&config);
    assert!(!ok);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("'context'"));
}

#[test]
fn test_all_sections_invalid_reports_every_header() {
    let _guard = ENV_LOCK.lock();

    let model = section(json!({"use_remote_model": "yes"}));
    let prompt = section(json!({"template": 7}));
    let response = section(json!({"speak_responses": "sometimes"}));
    let theme = section(json!({"app_name": 42}));

    let err = validate_all_configs(&model, &prompt, &response, &theme).unwrap_err();
    let report = match &err {
        ChatError::ConfigValidation(report) => report.clone(),
        other => panic!("unexpected error {:?}", other),
    };

    let text = err.to_string();
    for kind in [
        SectionKind::Model,
        SectionKind::Prompt,
        SectionKind::Response,
        SectionKind::Theme,
    ] {
        assert!(text.contains(kind.header()), "missing {:?} in\n{}", kind, text);
    }
    assert!(report.error_count() >= 4);
    assert!(text.starts_with("Configuration validation failed:"));
}

#[test]
fn test_empty_optional_sections_are_valid() {
    let _guard = ENV_LOCK.lock();

    let model = section(json!({
        "use_remote_model": false,
        "model_source": "Ollama",
        "model_name": "m",
        "model_parameters": {},
        "use_gpu": true,
        "num_gpu": 2
    }));
    let prompt = section(json!({"template": "{question}", "input_variables": ["question"]}));

    assert!(
        validate_all_configs(&model, &prompt, &ConfigSection::new(), &ConfigSection::new()).is_ok()
    );
}

#[test]
fn test_validated_config_always_converts_to_typed_sections() {
    let _guard = ENV_LOCK.lock();

    let model = section(json!({
        "use_remote_model": false,
        "model_source": "Ollama",
        "model_name": "llama3.1",
        "model_parameters": {"temperature": 0.1},
        "use_gpu": true,
        "num_gpu": 0,
        "send_chat_history": false,
        "base_url": "localhost:11434",
        "request_timeout_secs": 0
    }));
    let prompt = section(json!({"template": "{question}", "input_variables": ["question"]}));
    let response = section(json!({
        "speak_responses": true,
        "response_delay_time": 0,
        "response_stream_lag_time": 1,
        "speech_rate_wpm": 200,
        "voice_name": "Samantha",
        "use_mac_os_speech": false,
        "tts_model_path": "voice.onnx",
        "tts_tokens_path": "tokens.txt"
    }));
    let theme = section(json!({
        "app_name": "Helper",
        "chat_placeholder_text": "Ask away",
        "textbox_placeholder_text": "Type here",
        "source_theme": "Glass",
        "primary_hue": "blue",
        "font": ["Inter", "JetBrains Mono"],
        "load_theme_from_hf_hub": false,
        "hf_hub_theme_name": "someone/theme"
    }));

    validate_all_configs(&model, &prompt, &response, &theme).unwrap();

    let config = AppConfig {
        model,
        prompt,
        response,
        theme,
        version: None,
    };
    assert_eq!(config.model_config().unwrap().gpu_count(), 0);
    config.prompt_config().unwrap();
    assert_eq!(config.response_settings().unwrap().speech_rate(), 200);
    assert_eq!(config.theme_settings().unwrap().font.len(), 2);
}

#[test]
fn test_negative_gpu_count_fails_validation_not_startup() {
    let _guard = ENV_LOCK.lock();

    let model = section(json!({
        "use_remote_model": false,
        "model_source": "Ollama",
        "model_name": "llama3.1",
        "model_parameters": {},
        "use_gpu": true,
        "num_gpu": -1
    }));
    let prompt = section(json!({"template": "{question}", "input_variables": ["question"]}));

    let err = validate_all_configs(&model, &prompt, &ConfigSection::new(), &ConfigSection::new())
        .unwrap_err();
    assert!(err.to_string().contains("'num_gpu' must be a non-negative integer"));
}
