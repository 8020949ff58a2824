#[macro_use]
extern crate log;

use std::path::PathBuf;

use anyhow::{Context, Result};
use structopt::StructOpt;

use gtfs::{Config, StopID};

#[derive(StructOpt)]
#[structopt(name = "transit", about = "Summarize a static GTFS feed as JSON")]
struct Args {
    /// A JSON config file. Anything it doesn't set takes the default.
    #[structopt(long)]
    config: Option<PathBuf>,
    /// The primary directory containing stops.txt, routes.txt, etc
    #[structopt(long)]
    data_dir: Option<PathBuf>,
    /// How many stops the overview returns
    #[structopt(long)]
    stop_limit: Option<usize>,
    /// How many routes the overview returns
    #[structopt(long)]
    route_limit: Option<usize>,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Stops and routes, with route geometry and the mode serving each stop
    Overview {
        /// Also write the overview as GeoJSON to this path
        #[structopt(long)]
        geojson: Option<PathBuf>,
    },
    /// One stop and every route serving it
    Stop { stop_id: String },
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::load(path)?,
            None => Config::default(),
        }
        .with_env_overrides();
        if let Some(ref dir) = self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(n) = self.stop_limit {
            config.stop_limit = n;
        }
        if let Some(n) = self.route_limit {
            config.route_limit = n;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::from_args();
    let config = args.config()?;
    debug!("Using {:?}", config);

    match args.cmd {
        Command::Overview { geojson } => {
            let overview = gtfs::get_transit_overview(&config)?;
            if let Some(path) = geojson {
                let gj = overview.to_geojson();
                fs_err::write(&path, serde_json::to_string_pretty(&gj)?)?;
                info!("Wrote {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        Command::Stop { stop_id } => {
            let detail = gtfs::get_stop_detail(&config, &StopID::new(stop_id.clone()))
                .with_context(|| format!("describing stop {stop_id}"))?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
    }
    Ok(())
}
