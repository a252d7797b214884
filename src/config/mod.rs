pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{limits, Answer, PropertyInput};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "house-price")]
#[command(about = "Estimate a residential property price from its attributes")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Trained model artifact (overrides [model] path)
    #[arg(long)]
    pub model_path: Option<String>,

    /// Currency symbol shown before the price (overrides [display] currency_symbol)
    #[arg(long)]
    pub currency: Option<String>,

    /// Ask for each attribute on stdin instead of reading flags
    #[arg(short, long)]
    pub interactive: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Total livable area in sq. ft.
    #[arg(long, default_value_t = limits::DEFAULT_AREA, value_parser = parse_area)]
    pub area: f64,

    #[arg(long, default_value_t = limits::DEFAULT_BEDROOMS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub bedrooms: u32,

    #[arg(long, default_value_t = limits::DEFAULT_BATHROOMS, value_parser = clap::value_parser!(u32).range(1..=5))]
    pub bathrooms: u32,

    #[arg(long, default_value_t = limits::DEFAULT_STORIES, value_parser = clap::value_parser!(u32).range(1..=5))]
    pub stories: u32,

    /// Main road access (Yes/No)
    #[arg(long, default_value = limits::DEFAULT_ANSWER)]
    pub mainroad: String,

    /// Dedicated guest room (Yes/No)
    #[arg(long, default_value = limits::DEFAULT_ANSWER)]
    pub guestroom: String,

    /// Basement (Yes/No)
    #[arg(long, default_value = limits::DEFAULT_ANSWER)]
    pub basement: String,

    /// Hot water heating (Yes/No)
    #[arg(long, default_value = limits::DEFAULT_ANSWER)]
    pub hotwaterheating: String,

    /// Central air conditioning (Yes/No)
    #[arg(long, default_value = limits::DEFAULT_ANSWER)]
    pub airconditioning: String,

    /// Car parking spaces
    #[arg(long, default_value_t = limits::DEFAULT_PARKING, value_parser = clap::value_parser!(u32).range(0..=4))]
    pub parking: u32,

    /// Located in a preferred area (Yes/No)
    #[arg(long, default_value = limits::DEFAULT_ANSWER)]
    pub prefarea: String,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn property_input(&self) -> PropertyInput {
        PropertyInput {
            area: self.area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            stories: self.stories,
            mainroad: Answer::from(self.mainroad.clone()),
            guestroom: Answer::from(self.guestroom.clone()),
            basement: Answer::from(self.basement.clone()),
            hotwaterheating: Answer::from(self.hotwaterheating.clone()),
            airconditioning: Answer::from(self.airconditioning.clone()),
            parking: self.parking,
            prefarea: Answer::from(self.prefarea.clone()),
        }
    }

    /// 載入 TOML 配置並套用命令列覆蓋設定
    pub fn resolve(&self) -> crate::utils::error::Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(model_path) = &self.model_path {
            config.model.path = model_path.clone();
        }
        if let Some(currency) = &self.currency {
            config.display.currency_symbol = currency.clone();
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.json_logs {
            config.logging.json = true;
        }

        Ok(config)
    }
}

#[cfg(feature = "cli")]
fn parse_area(raw: &str) -> std::result::Result<f64, String> {
    let area: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !limits::AREA.contains(&area) {
        return Err(format!(
            "area must be between {} and {}",
            limits::AREA.start(),
            limits::AREA.end()
        ));
    }
    Ok(area)
}
