//! Status command - check the container runtime

use crate::cache::CacheResolver;
use crate::config::Config;
use crate::error::PackResult;
use crate::orchestration::{CliRuntime, ContainerRuntime};
use crate::ui::{self, UiContext};
use console::style;

/// Execute the status command
pub async fn execute(config: &Config) -> PackResult<()> {
    let ctx = UiContext::detect();
    println!("{}", style("pack status").bold().cyan());
    println!();

    let runtime = CliRuntime::new(config.runtime.binary.clone());
    let available = runtime.is_available().await?;
    ui::key_value_status(
        &ctx,
        "Runtime",
        &format!(
            "{} ({})",
            runtime.runtime_name(),
            if available { "available" } else { "not found" }
        ),
        available,
    );

    let socket = &config.runtime.socket;
    let socket_present = socket.exists();
    ui::key_value_status(
        &ctx,
        "Socket",
        &socket.display().to_string(),
        socket_present,
    );

    match CacheResolver::from_config(&config.cache) {
        Ok(cache) => ui::remark(&ctx, &format!("Cache root: {}", cache.root().display())),
        Err(e) => ui::step_warn(&ctx, &format!("Cache root unavailable: {}", e)),
    }

    println!();
    if available && socket_present {
        println!("{}", style("Ready to build").green().bold());
    } else {
        if !available {
            ui::step_warn_hint(
                &ctx,
                &format!("{} is not usable", runtime.runtime_name()),
                "Install Docker or set runtime.binary",
            );
        }
        if !socket_present {
            ui::step_warn_hint(
                &ctx,
                "Runtime socket missing",
                "Start the daemon or set runtime.socket",
            );
        }
    }

    Ok(())
}
