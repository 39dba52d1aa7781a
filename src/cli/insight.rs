use colored::Colorize;

use crate::cli::{open_session, warn_no_data, FilterArgs};
use crate::error::{Result, SpendError};
use crate::insight::OpenAiClient;
use crate::settings::load_settings;

/// AI failures (no key, network, provider error) end as one warning, not an
/// error exit.
pub fn run(file: &str, filter: &FilterArgs) -> Result<()> {
    let mut session = open_session(file, filter)?;
    if session.selected().is_empty() {
        warn_no_data();
        return Ok(());
    }
    let settings = load_settings();
    let result = OpenAiClient::from_settings(&settings).and_then(|client| {
        println!("{}", "AI 분석 중...".dimmed());
        session.insight(&client, &settings).map(|text| text.to_string())
    });
    match result {
        Ok(text) => println!("{}", textwrap::fill(&text, 100)),
        Err(SpendError::NoMatchingData) => warn_no_data(),
        Err(e) => println!("{}", format!("Warning: {e}").yellow()),
    }
    Ok(())
}
