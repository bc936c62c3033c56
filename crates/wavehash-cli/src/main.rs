use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use log::{info, warn, LevelFilter};
use std::path::PathBuf;

use wavehash_core::metrics::{format_metrics_table, DEFAULT_NUM_THRESHOLDS};
use wavehash_core::{
    compute_roc, evaluate_pairs, find_optimal_threshold, wavelet_hash, Criterion, Gallery,
    GalleryOptions, HashConfig, HashConfigOverrides, ImageSize, ImageSource, LabeledPair,
    QuantMethod, QuantParams, SubbandMode,
};

mod pairs;

#[derive(Parser)]
#[command(name = "wavehash")]
#[command(about = "Wavelet perceptual hashing, retrieval and threshold evaluation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write rotating log files to this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the wavelet hash of each image
    Hash {
        /// Images to hash
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Print full hash results as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        hash: HashArgs,
    },

    /// Find the gallery images closest to a query image
    Search {
        /// Query image
        query: PathBuf,

        /// Directory of gallery images
        #[arg(short, long)]
        gallery: PathBuf,

        /// Number of results
        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: usize,

        /// Drop results farther than this Hamming distance
        #[arg(long)]
        max_distance: Option<u32>,

        /// Only scan the top level of the gallery directory
        #[arg(long)]
        no_recursive: bool,

        /// Hashing threads (0 = one per CPU)
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        hash: HashArgs,
    },

    /// Score a labelled pair dataset (ROOT/similar/*, ROOT/dissimilar/*)
    Evaluate {
        /// Dataset root
        root: PathBuf,

        /// Metric maximized by the threshold search
        #[arg(long, default_value = "accuracy")]
        criterion: Criterion,

        /// Number of candidate thresholds
        #[arg(long, default_value_t = DEFAULT_NUM_THRESHOLDS)]
        thresholds: usize,

        #[command(flatten)]
        hash: HashArgs,
    },

    /// Generate a configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "wavehash.json")]
        path: PathBuf,

        /// Start from a named preset (haar_l2_median, db2_l2_median, db4_l3_median, sym2_l2_mean)
        #[arg(long)]
        preset: Option<String>,
    },
}

/// Hash configuration flags shared by the hashing commands
#[derive(Args, Debug, Default)]
struct HashArgs {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wavelet name (haar, db2, db3, db4, sym2, sym3, coif1)
    #[arg(long)]
    wavelet: Option<String>,

    /// Decomposition levels
    #[arg(long)]
    level: Option<usize>,

    /// Subband mode (LL, LL_LH, LL_HL, LL_LH_HL, ALL)
    #[arg(long)]
    mode: Option<SubbandMode>,

    /// Quantization method (median, mean, ternary, uniform_step)
    #[arg(long)]
    method: Option<QuantMethod>,

    /// Hash length in bits
    #[arg(long)]
    bits: Option<usize>,

    /// Normalized image size, e.g. 256x256
    #[arg(long)]
    size: Option<ImageSize>,

    /// Quantization parameter as KEY=VALUE (k, mid_policy, delta); repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
}

impl HashArgs {
    fn overrides(&self) -> anyhow::Result<HashConfigOverrides> {
        let quant_params = if self.params.is_empty() {
            None
        } else {
            let mut params = QuantParams::new();
            for param in &self.params {
                let (key, value) = param
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", param))?;
                let value: f64 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid value for parameter '{}'", key))?;
                params.insert(key.trim().to_string(), value);
            }
            Some(params)
        };

        Ok(HashConfigOverrides {
            wavelet: self.wavelet.clone(),
            level: self.level,
            subband_mode: self.mode,
            quant_method: self.method,
            hash_bits: self.bits,
            image_size: self.size,
            quant_params,
        })
    }

    /// Config file (or defaults) with command line overrides applied
    fn resolve(&self) -> anyhow::Result<HashConfig> {
        let base = match &self.config {
            Some(path) => HashConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => HashConfig::default(),
        };
        let config = base.with_overrides(&self.overrides()?);
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: u8, log_dir: Option<&PathBuf>) -> anyhow::Result<()> {
    if let Some(dir) = log_dir {
        return wavehash_core::logging::init_logger(dir)
            .map_err(|e| anyhow!("Failed to initialise logging: {}", e));
    }

    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or(wavehash_core::logging::LOG_LEVEL_ENV, level.as_str()),
    )
    .init();
    Ok(())
}

fn preset(name: &str) -> anyhow::Result<HashConfig> {
    match name.to_lowercase().as_str() {
        "haar_l2_median" => Ok(HashConfig::haar_l2_median()),
        "db2_l2_median" => Ok(HashConfig::db2_l2_median()),
        "db4_l3_median" => Ok(HashConfig::db4_l3_median()),
        "sym2_l2_mean" => Ok(HashConfig::sym2_l2_mean()),
        other => bail!("Unknown preset '{}'", other),
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_dir.as_ref())?;

    match cli.command {
        Commands::Hash { images, json, hash } => {
            let config = hash.resolve()?;
            info!("Hashing {} images with {}", images.len(), config);

            let mut results = Vec::new();
            for path in &images {
                let result = wavelet_hash(ImageSource::Path(path), &config)
                    .with_context(|| format!("Failed to hash {}", path.display()))?;
                if json {
                    results.push(serde_json::json!({
                        "path": path.display().to_string(),
                        "hash": result,
                    }));
                } else {
                    println!("{}  {}", result.hex, path.display());
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            Ok(())
        }

        Commands::Search {
            query,
            gallery,
            top_k,
            max_distance,
            no_recursive,
            threads,
            json,
            hash,
        } => {
            let config = hash.resolve()?;
            let options = GalleryOptions {
                recursive: !no_recursive,
                threads,
                show_progress: !json,
                ..GalleryOptions::default()
            };

            let gallery = Gallery::build(&gallery, config, &options)?;
            if !gallery.skipped().is_empty() {
                warn!("{} images could not be hashed", gallery.skipped().len());
            }

            let hits = gallery.retrieve(ImageSource::Path(&query), top_k, max_distance)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                println!(
                    "Top {} of {} gallery images for {}:",
                    hits.len(),
                    gallery.len(),
                    query.display()
                );
                for (rank, hit) in hits.iter().enumerate() {
                    println!(
                        "  {:>2}. distance {:>4} | similarity {:>6.2}% | {}",
                        rank + 1,
                        hit.distance,
                        hit.similarity * 100.0,
                        hit.id
                    );
                }
            }
            Ok(())
        }

        Commands::Evaluate {
            root,
            criterion,
            thresholds,
            hash,
        } => {
            let config = hash.resolve()?;
            let files = pairs::collect_pairs(&root)?;
            if files.is_empty() {
                bail!("No image pairs found under {}", root.display());
            }

            let labeled: Vec<LabeledPair<'_>> = files
                .iter()
                .map(|pair| {
                    LabeledPair::new(pair.left.as_path(), pair.right.as_path(), pair.similar)
                })
                .collect();
            info!("Evaluating {} pairs with {}", labeled.len(), config);

            let result = evaluate_pairs(&labeled, &config)?;
            let search =
                find_optimal_threshold(&result.distances, &result.labels, criterion, thresholds)?;
            let roc = compute_roc(&result.distances, &result.labels)?;

            println!(
                "{}",
                format_metrics_table(&[(config.to_string(), search.best)], &[])
            );
            println!(
                "Best {} = {:.4} at distance threshold {:.2}",
                criterion, search.best_score, search.best.threshold
            );
            println!(
                "ROC AUC = {:.4}, Youden optimum at distance {} (TPR {:.4}, FPR {:.4})",
                roc.auc, roc.optimal_threshold, roc.optimal_tpr, roc.optimal_fpr
            );
            Ok(())
        }

        Commands::GenerateConfig { path, preset: name } => {
            let config = match name {
                Some(name) => preset(&name)?,
                None => HashConfig::default(),
            };
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}
