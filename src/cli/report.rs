use std::path::Path;

use colored::Colorize;

use crate::cli::{open_session, warn_no_data, FilterArgs};
use crate::error::Result;
use crate::insight::OpenAiClient;
use crate::report::write_report;
use crate::session::Session;
use crate::settings::load_settings;

pub fn run(file: &str, filter: &FilterArgs, output: &str, no_ai: bool) -> Result<()> {
    let mut session = open_session(file, filter)?;
    if session.selected().is_empty() {
        warn_no_data();
        return Ok(());
    }

    if !no_ai {
        fetch_narrative(&mut session);
    }

    let markdown = session.render_report(chrono::Local::now().naive_local())?;
    write_report(Path::new(output), &markdown)?;
    println!("Wrote {output}");
    Ok(())
}

/// AI failures are a warning: the report is still written with a placeholder.
fn fetch_narrative(session: &mut Session) {
    let settings = load_settings();
    let result = OpenAiClient::from_settings(&settings)
        .and_then(|client| session.insight(&client, &settings).map(|_| ()));
    if let Err(e) = result {
        println!("{}", format!("Warning: {e}").yellow());
    }
}
