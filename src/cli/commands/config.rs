//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{validate, Config, ConfigManager};
use crate::error::{PackError, PackResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "general.build_log",
    "runtime.binary",
    "runtime.socket",
    "runtime.export_user",
    "cache.root",
    "workspace.temp_root",
    "workspace.prefix",
    "build.default_stack",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> PackResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            set_value(&mut updated, &key, &value)?;
            validate(&updated).map_err(PackError::User)?;
            manager.save(&updated).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> PackResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> PackResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

/// Apply a dot-separated `key = value` to `config`. An empty value clears
/// optional keys.
fn set_value(config: &mut Config, key: &str, value: &str) -> PackResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => {
            if !matches!(value, "text" | "json") {
                return Err(PackError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )));
            }
            config.general.log_format = value.to_string();
        }
        ["general", "build_log"] => config.general.build_log = parse_bool(value)?,

        ["runtime", "binary"] => config.runtime.binary = required(key, value)?,
        ["runtime", "socket"] => config.runtime.socket = PathBuf::from(required(key, value)?),
        ["runtime", "export_user"] => config.runtime.export_user = required(key, value)?,

        ["cache", "root"] => config.cache.root = optional(value).map(PathBuf::from),

        ["workspace", "temp_root"] => config.workspace.temp_root = optional(value).map(PathBuf::from),
        ["workspace", "prefix"] => config.workspace.prefix = required(key, value)?,

        ["build", "default_stack"] => config.build.default_stack = optional(value),

        _ => {
            return Err(PackError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn required(key: &str, value: &str) -> PackResult<String> {
    if value.is_empty() {
        return Err(PackError::User(format!("{} cannot be empty", key)));
    }
    Ok(value.to_string())
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(value: &str) -> PackResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(PackError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}
