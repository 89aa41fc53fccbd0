use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::algorithm::{KMeansConfig, DEFAULT_CONVERGENCE_THRESHOLD, DEFAULT_MAX_ITERATIONS, DEFAULT_SEED};

#[derive(Parser, Clone, Debug)]
#[command(name = "kmeans-elbow")]
#[command(about = "K-means clustering of score vectors with an elbow sweep for choosing K")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(about = "Assign each point to a cluster")]
    Cluster(ClusterArgs),

    #[command(about = "WCSS for k = 1..max_k")]
    Elbow(ElbowArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct ClusterArgs {
    #[command(flatten)]
    pub io: IOParams,

    #[command(flatten)]
    pub km: KMeansParams,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ElbowArgs {
    #[command(flatten)]
    pub io: IOParams,

    #[command(flatten)]
    pub km: KMeansParams,

    /// Log the suggested k at the elbow of the curve
    #[arg(long, default_value_t = false)]
    pub suggest: bool,
}

#[derive(clap::Args, Clone, Debug)]
pub struct IOParams {
    /// JSON request document (default stdin)
    #[arg(short, long, help_heading = "I/O")]
    pub input: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct KMeansParams {
    /// Seed for centroid initialization
    #[arg(long, default_value_t = DEFAULT_SEED, help_heading = "K-means")]
    pub seed: u64,

    /// Maximum assign/update rounds per run
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS, help_heading = "K-means")]
    pub max_iterations: usize,

    /// Centroid movement at or below which a run stops
    #[arg(long, default_value_t = DEFAULT_CONVERGENCE_THRESHOLD, help_heading = "K-means")]
    pub threshold: f64,
}

impl KMeansParams {
    pub fn validate(&self) -> bool {
        let mut is_ok = true;

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            log::error!("--threshold must be a finite, non-negative number");
            is_ok = false;
        }

        if self.max_iterations == 0 {
            log::warn!("--max-iterations 0 assigns points to the initial centroids only");
        }

        is_ok
    }

    pub fn config(&self) -> KMeansConfig {
        KMeansConfig::default()
            .with_seed(self.seed)
            .with_max_iterations(self.max_iterations)
            .with_convergence_threshold(self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cluster_defaults() {
        let cli = Cli::parse_from(["kmeans-elbow", "cluster"]);
        let Commands::Cluster(args) = cli.command else {
            panic!("expected the cluster subcommand");
        };
        assert!(args.io.input.is_none());
        assert!(args.km.validate());
        assert_eq!(args.km.config(), KMeansConfig::default());
    }

    #[test]
    fn test_parse_elbow_options() {
        let cli = Cli::parse_from([
            "kmeans-elbow",
            "elbow",
            "--input",
            "scores.json",
            "--seed",
            "42",
            "--max-iterations",
            "20",
            "--suggest",
            "--debug",
        ]);
        assert!(cli.debug);
        let Commands::Elbow(args) = cli.command else {
            panic!("expected the elbow subcommand");
        };
        assert!(args.suggest);
        assert_eq!(args.io.input, Some(PathBuf::from("scores.json")));
        assert_eq!(args.km.config(), KMeansConfig::default().with_seed(42).with_max_iterations(20));
    }

    #[test]
    fn test_negative_threshold_is_invalid() {
        let cli = Cli::parse_from(["kmeans-elbow", "cluster", "--threshold=-1"]);
        let Commands::Cluster(args) = cli.command else {
            panic!("expected the cluster subcommand");
        };
        assert!(!args.km.validate());
    }
}
