//! # Feature: Setup
//!
//! One-time initialization: credentials, the styled root logger, the panic
//! hook, and the shared [`Styler`] every other feature restyles through.
//! A second call only warns and hands back the first styler.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release

use crate::core::{SetupOptions, DIAG_TARGET};
use crate::features::completion::{CompletionService, OpenAiCompletion};
use crate::features::crash::install_panic_hook;
use crate::features::formatter::StyledFormatter;
use crate::features::logger::{console_handler, file_handler, StyledLogger};
use crate::features::personas::Styler;
use anyhow::Result;
use log::{debug, info, warn};
use std::env;
use std::sync::{Arc, OnceLock};

/// Credential variable read from the environment or `.env`
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Variable the openai crate reads its key from
const CLIENT_KEY_ENV: &str = "OPENAI_KEY";

/// Set once by the first successful setup, never cleared
static ACTIVE: OnceLock<Arc<Styler>> = OnceLock::new();

/// Run setup with the OpenAI completion service
pub fn setup(options: SetupOptions) -> Result<Arc<Styler>> {
    Setup::new(options).run()
}

pub fn is_initialized() -> bool {
    ACTIVE.get().is_some()
}

/// The styler installed by setup, if setup has run
pub fn active_styler() -> Option<Arc<Styler>> {
    ACTIVE.get().cloned()
}

/// Setup with an optional custom completion service
pub struct Setup {
    options: SetupOptions,
    service: Option<Arc<dyn CompletionService>>,
}

impl Setup {
    pub fn new(options: SetupOptions) -> Self {
        Self {
            options,
            service: None,
        }
    }

    /// Use `service` instead of building an OpenAI client from the environment
    pub fn with_service(mut self, service: Arc<dyn CompletionService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn run(self) -> Result<Arc<Styler>> {
        if let Some(existing) = ACTIVE.get() {
            warn!(target: DIAG_TARGET, "persona logger was already initialized!");
            return Ok(existing.clone());
        }

        let options = self.options;
        options.validate()?;

        // Load environment variables from .env file
        dotenvy::dotenv().ok();
        export_api_key();

        let service: Arc<dyn CompletionService> = match self.service {
            Some(service) => service,
            None => Arc::new(OpenAiCompletion::from_env()?),
        };
        let styler = Styler::new(&options.character, service);

        if options.logger {
            let logger = build_root_logger(&options, &styler)?;
            debug!(
                target: DIAG_TARGET,
                "Installing styled root logger with {} handler(s)",
                logger.handler_count()
            );
            logger.install()?;
        }

        if options.excepthook {
            install_panic_hook(styler.clone());
        }

        info!("persona logger was successfully initialized!");

        Ok(ACTIVE.get_or_init(|| Arc::new(styler)).clone())
    }
}

/// Console handler plus an optional file handler, each with its own formatter
pub fn build_root_logger(options: &SetupOptions, styler: &Styler) -> Result<StyledLogger> {
    let level = options.level_filter()?;
    let format = options.log_format()?;

    let mut logger = StyledLogger::new().with_handler(console_handler(
        StyledFormatter::new(styler.clone(), format.clone()),
        level,
    ));

    if let Some(path) = &options.file {
        logger = logger.with_handler(file_handler(
            StyledFormatter::new(styler.clone(), format),
            level,
            path,
        )?);
    }

    Ok(logger)
}

// The openai crate reads OPENAI_KEY, not OPENAI_API_KEY
fn export_api_key() {
    if let Ok(key) = env::var(API_KEY_ENV) {
        if !key.is_empty() {
            env::set_var(CLIENT_KEY_ENV, key);
        }
    }
}
