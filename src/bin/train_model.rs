use clap::Parser;
use house_price_estimator::utils::error::ErrorSeverity;
use house_price_estimator::utils::logger;
use house_price_estimator::{LocalStorage, TomlConfig, TrainingEngine, TrainingPipeline};

#[derive(Parser)]
#[command(name = "train-model")]
#[command(about = "Train the house price model from a labelled CSV")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Labelled dataset (overrides [training] dataset_path)
    #[arg(short, long)]
    dataset: Option<String>,

    /// Where to write the model artifact (overrides [model] path)
    #[arg(short, long)]
    output: Option<String>,

    #[arg(long)]
    n_estimators: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long)]
    min_samples_leaf: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be trained without fitting anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match &args.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => TomlConfig::default(),
    };

    // 應用命令列覆蓋設定
    if let Some(dataset) = &args.dataset {
        config.training.dataset_path = dataset.clone();
    }
    if let Some(output) = &args.output {
        config.model.path = output.clone();
    }
    if args.n_estimators.is_some() {
        config.training.n_estimators = args.n_estimators;
    }
    if args.learning_rate.is_some() {
        config.training.learning_rate = args.learning_rate;
    }
    if args.max_depth.is_some() {
        config.training.max_depth = args.max_depth;
    }
    if args.min_samples_leaf.is_some() {
        config.training.min_samples_leaf = args.min_samples_leaf;
    }

    let verbose = args.verbose || config.logging.verbose;
    if config.logging.json {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    // 驗證配置
    if let Err(e) = config.validate_training() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    display_plan(&config, args.dry_run);
    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no model will be trained");
        return Ok(());
    }

    let storage = LocalStorage::default();
    let pipeline = TrainingPipeline::new(
        storage,
        config.training.dataset_path.clone(),
        config.model.path.clone(),
        config.training.params(),
    );
    let engine = TrainingEngine::new(pipeline);

    match engine.run() {
        Ok(report) => {
            println!("✅ Training completed successfully!");
            println!("  Rows: {}", report.rows);
            println!("  Trees: {}", report.trees);
            println!("  Train RMSE: {:.2}", report.metrics.rmse);
            println!("  Train R²: {:.4}", report.metrics.r_squared);
            println!("📁 Model saved to: {}", report.model_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Training failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_plan(config: &TomlConfig, dry_run: bool) {
    let params = config.training.params();

    println!("📋 Training Plan:");
    println!("  Dataset: {}", config.training.dataset_path);
    println!("  Output: {}", config.model.path);
    println!("  Estimators: {}", params.n_estimators);
    println!("  Learning Rate: {}", params.learning_rate);
    println!("  Max Depth: {}", params.max_depth);
    println!("  Min Samples/Leaf: {}", params.min_samples_leaf);

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
