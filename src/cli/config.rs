use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, Settings, API_KEY_ENV};

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{tail}", chars[..3].iter().collect::<String>())
}

pub fn format_settings(settings: &Settings) -> String {
    let key = match (std::env::var(API_KEY_ENV).ok(), &settings.api_key) {
        (Some(env), _) if !env.trim().is_empty() => format!("{} (from {API_KEY_ENV})", mask(&env)),
        (_, Some(k)) => mask(k),
        _ => "(not set)".to_string(),
    };
    [
        format!("Settings:     {}", settings_path().display()),
        format!("api_key:      {key}"),
        format!("model:        {}", settings.model),
        format!("api_base:     {}", settings.api_base),
        format!("max_tokens:   {}", settings.max_tokens),
        format!("temperature:  {}", settings.temperature),
        format!("timeout_secs: {}", settings.timeout_secs),
    ]
    .join("\n")
}

pub fn show() -> Result<()> {
    println!("{}", format_settings(&load_settings()));
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.set(key, value)?;
    save_settings(&settings)?;
    println!("Updated {key}");
    Ok(())
}
