//! Cache command - inspect or clear an application's build cache

use crate::cache::CacheResolver;
use crate::cli::args::{CacheAction, CacheArgs};
use crate::cli::commands::app_dir_or_cwd;
use crate::config::Config;
use crate::error::PackResult;
use crate::ui::{self, UiContext};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> PackResult<()> {
    let resolver = CacheResolver::from_config(&config.cache)?;

    match args.action {
        CacheAction::Path { path } => {
            let app_dir = app_dir_or_cwd(path)?;
            println!("{}", resolver.path_for(&app_dir)?.display());
        }
        CacheAction::Clear { path } => {
            let ctx = UiContext::detect();
            let app_dir = app_dir_or_cwd(path)?;
            let dir = resolver.path_for(&app_dir)?;

            if resolver.clear(&app_dir)? {
                ui::step_ok_detail(&ctx, "Cache cleared", &dir.display().to_string());
            } else {
                ui::step_warn(&ctx, &format!("No cache at {}", dir.display()));
            }
        }
    }

    Ok(())
}
