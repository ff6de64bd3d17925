mod bootstrap;
mod report;

use anyhow::Result;
use eventlab_core::settings::Settings;
use eventlab_data::analysis::analyze_file;

use crate::report::ReportOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("eventlab v{} starting", env!("CARGO_PKG_VERSION"));

    let format = settings.resolved_input_format()?;
    let source = settings.input.display().to_string();

    tracing::info!("Loading {} as {}", source, format);
    let input = settings.input.clone();
    let analysis = tokio::task::spawn_blocking(move || analyze_file(&input, format)).await??;
    tracing::info!(
        "Cleaned {} of {} rows in {:.3}s",
        analysis.metadata.rows_out,
        analysis.metadata.rows_in,
        analysis.metadata.clean_time_seconds
    );

    let options = ReportOptions {
        preview_rows: usize::from(settings.preview_rows),
        top_countries: usize::from(settings.top_countries),
    };

    if settings.wants_json() {
        println!("{}", report::render_json(&source, &analysis, options)?);
    } else {
        print!("{}", report::render_text(&source, &analysis, options));
    }

    Ok(())
}
