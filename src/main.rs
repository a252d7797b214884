use clap::Parser;
use house_price_estimator::app::form::collect_input;
use house_price_estimator::app::render::{render_error, render_estimate, render_warning, ConsoleNotifier};
use house_price_estimator::core::ConfigProvider;
use house_price_estimator::utils::error::ErrorSeverity;
use house_price_estimator::utils::logger;
use house_price_estimator::{load_model, CliConfig, EstimationService, EstimatorError, LocalStorage};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger(config.logging.verbose);
    } else {
        logger::init_cli_logger(config.logging.verbose);
    }

    tracing::info!("🏠 Starting house-price estimator");
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate_estimator() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        exit_with(&e);
    }

    // 模型只載入一次，之後唯讀
    let storage = LocalStorage::default();
    let loaded = load_model(&storage, config.model_path(), config.fallback_estimator());
    let service = EstimationService::new(loaded.handle, ConsoleNotifier).with_warning(loaded.warning);
    if let Some(warning) = service.warning() {
        eprintln!("{}", render_warning(warning));
    }

    let input = if cli.interactive {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        collect_input(stdin.lock(), stdout.lock())?
    } else {
        cli.property_input()
    };

    match service.estimate(&input) {
        Ok(estimate) => {
            println!("{}", render_estimate(&estimate, config.currency_symbol()));
        }
        Err(e) => {
            // 單次估價失敗不視為程序錯誤
            eprintln!("{}", render_error(&e));
        }
    }

    Ok(())
}

fn exit_with(e: &EstimatorError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
