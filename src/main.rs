use solid_stress::output::StressVolumeBundle;
use solid_stress::SolidParameters;

use eyre::WrapErr;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(StructOpt, Debug)]
#[structopt(name = "solid_stress")]
struct Opt {
    /// JSON parameter file.
    #[structopt(short, long)]
    input_file: std::path::PathBuf,
    /// Where to write the stress volume. `.json` is written as JSON, anything else as MessagePack.
    #[structopt(short, long, default_value = "stress_volume.msgpack")]
    output: std::path::PathBuf,
    /// Optionally write the per-step diagnostics here, as JSON.
    #[structopt(long)]
    history: Option<std::path::PathBuf>,
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opt = Opt::from_args();

    let params = std::fs::read(&opt.input_file)
        .wrap_err_with(|| format!("Failed to read JSON parameter file: {:?}", &opt.input_file))
        .and_then(|json| SolidParameters::from_json(&json))?;

    let report = solid_stress::run_with_history(&params);

    StressVolumeBundle::new(&report.volume, &params).write(&opt.output)?;
    tracing::info!(path = ?opt.output, "Wrote stress volume");

    if let Some(path) = opt.history {
        let json = serde_json::to_vec_pretty(&report.history)
            .wrap_err("Serde failed to serialize step history.")?;
        std::fs::write(&path, json)
            .wrap_err_with(|| format!("Failed to write step history: {:?}", &path))?;
        tracing::info!(path = ?path, steps = report.history.len(), "Wrote step history");
    }

    Ok(())
}
