use clap::{Parser, Subcommand};

use cqi_osm::algorithm;
use cqi_osm::config::IndexConfiguration;
use cqi_osm::model::layer::{export_ops, import_ops};
use cqi_osm::model::CqiError;

#[derive(Parser)]
#[command(name = "cqi-osm", version, about = "cycling quality index for OpenStreetMap ways")]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// score the ways of a GeoJSON extract
    Geojson {
        /// GeoJSON file with OSM way features to score
        input_file: String,
        /// output file for the scored ways
        output_file: String,
        /// TOML or JSON file overriding the default index parameters
        #[arg(short, long)]
        configuration_file: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let args = CliArgs::parse();
    match run(args) {
        Ok(_) => {}
        Err(e) => log::error!("{e}"),
    }
}

fn run(args: CliArgs) -> Result<(), CqiError> {
    match args.command {
        Commands::Geojson {
            input_file,
            output_file,
            configuration_file,
        } => {
            let config = match &configuration_file {
                Some(file) => IndexConfiguration::try_from(file)?,
                None => IndexConfiguration::default(),
            };
            let mut layer = import_ops::read_geojson_layer(&input_file)?;
            log::info!("imported {} ways from {}", layer.features.len(), input_file);
            algorithm::run_pipeline(&mut layer, &config);
            export_ops::write_geojson_layer(&layer, &output_file)?;
            log::info!(
                "wrote {} scored ways to {}",
                layer.features.len(),
                output_file
            );
            Ok(())
        }
    }
}
