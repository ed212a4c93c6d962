//! Config command - show configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::SlipwayResult;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config) -> SlipwayResult<()> {
    match args.action {
        ConfigAction::Show => {
            let text = toml::to_string_pretty(config)?;
            print!("{}", text);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", ConfigManager::default_config_path().display());
            Ok(())
        }
    }
}
