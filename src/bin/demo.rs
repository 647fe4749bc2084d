use anyhow::Result;
use log::{error, warn};
use persona_log::{run_main, setup, styled_print, SetupOptions};
use std::process::ExitCode;

/// Optional YAML file replacing the demo's built-in options
const CONFIG_ENV: &str = "PERSONA_LOG_CONFIG";

fn demo_options() -> Result<SetupOptions> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return SetupOptions::load(&path);
    }

    Ok(SetupOptions::default()
        .with_format("%(asctime)s - %(name)s - %(levelname)s - %(message)s")
        .with_character("Taiga from Toradora")
        .with_file("log.out")
        .with_logger(true)
        .with_excepthook(true))
}

fn main() -> ExitCode {
    let styler = match demo_options().and_then(setup) {
        Ok(styler) => styler,
        Err(e) => {
            // Styling is unavailable, fall back to a plain logger to explain why
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("info"),
            )
            .try_init();
            error!("Failed to set up persona logger: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    run_main(&styler, || -> Result<()> {
        warn!("The program has crashed");

        styled_print!(styler, "Testing print statement", vec![0, 1, 2])?;

        anyhow::bail!("The programmer is a baka")
    })
}
