mod bootstrap;
mod render;

use anyhow::{bail, Result};
use guild_core::points_text::extract_points;
use guild_core::settings::{Settings, StoreConfig};
use guild_core::tiers::TierTable;
use guild_core::validation::MonthlyGainRequest;
use guild_data::analysis::evaluate_monthly_gain;
use guild_data::store::SnapshotStore;
use render::OutputFormat;

fn main() -> Result<()> {
    // Missing .env is fine; env-backed flags simply keep their defaults.
    let _ = dotenvy::dotenv();

    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Guild Gain v{} starting", env!("CARGO_PKG_VERSION"));

    let format = OutputFormat::from_flag(&settings.format);
    let data_folder = bootstrap::discover_data_folder(settings.data_folder.as_deref());
    tracing::info!("View: {}, data folder: {}", settings.view, data_folder.display());

    let store = SnapshotStore::new(StoreConfig::new(data_folder));

    let output = match settings.view.as_str() {
        "leaderboard" => {
            let (year, month) = settings.target_month();
            let request = MonthlyGainRequest::new(year, month, settings.top)?;
            let result = evaluate_monthly_gain(&store, &request)?;
            render::leaderboard(&result, format)?
        }

        "tier" => {
            let points = resolve_points(&settings)?;
            render::tier(points, TierTable::default().classify(points), format)?
        }

        "promotion" => {
            let points = resolve_points(&settings)?;
            let plan = TierTable::default().plan_promotion(&settings.held, points);
            render::promotion(&plan, format)?
        }

        "latest" => render::latest(&store.latest_overall()?, format)?,

        unknown => bail!("Unknown view: {}", unknown),
    };

    println!("{output}");
    Ok(())
}

/// Point value from `--points`, or read out of `--text`.
fn resolve_points(settings: &Settings) -> Result<u64> {
    match (settings.points, &settings.text) {
        (Some(points), _) => Ok(points),
        (None, Some(text)) => match extract_points(text) {
            Some(points) => Ok(points),
            None => bail!("Could not find a GP value in the text"),
        },
        (None, None) => bail!("Provide --points or --text"),
    }
}
