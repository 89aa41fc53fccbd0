use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use kmeans_elbow::cli::{Cli, Commands, IOParams};
use kmeans_elbow::logger::init_logger;
use kmeans_elbow::{handle_clustering, handle_elbow, ServiceResponse, WcssReport};

fn read_request(params: &IOParams) -> io::Result<Vec<u8>> {
    match &params.input {
        Some(path) => fs::read(path),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn input_name(input: &Option<PathBuf>) -> String {
    input
        .as_ref()
        .map_or_else(|| "stdin".to_string(), |path| path.display().to_string())
}

fn log_suggestion(response: &ServiceResponse) {
    match serde_json::from_value::<WcssReport>(response.body.clone()) {
        Ok(report) => match report.optimal_k() {
            Some(k) => log::info!("Suggested number of clusters (elbow): {}", k),
            None => log::info!("No WCSS entries to suggest a number of clusters from"),
        },
        Err(e) => log::error!("Unable to read WCSS report: {}", e),
    }
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if let Err(e) = init_logger(level) {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    let (io_params, km) = match &cli.command {
        Commands::Cluster(args) => (&args.io, &args.km),
        Commands::Elbow(args) => (&args.io, &args.km),
    };
    if !km.validate() {
        log::error!("please fix arguments");
        std::process::exit(1);
    }

    let body = match read_request(io_params) {
        Ok(body) => body,
        Err(e) => {
            log::error!("Unable to read request from {}: {}", input_name(&io_params.input), e);
            std::process::exit(1);
        }
    };

    let config = km.config();
    let response = match &cli.command {
        Commands::Cluster(_) => handle_clustering(&body, &config),
        Commands::Elbow(args) => {
            let response = handle_elbow(&body, &config);
            if args.suggest && response.is_success() {
                log_suggestion(&response);
            }
            response
        }
    };

    println!("{}", response.body);
    if !response.is_success() {
        std::process::exit(1);
    }
}
