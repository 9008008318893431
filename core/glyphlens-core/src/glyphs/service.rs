//! Glyph metadata facade with single-flight initialisation (made by FontLab https://www.fontlab.com/)
//!
//! The service owns one provider. Setup that must happen before any lookup
//! (`initialise`) runs in [`GlyphMetadataService::new`]; the slow part
//! (`generate`) runs on tokio's blocking pool the first time anybody awaits
//! [`GlyphMetadataService::initialize`]. Every later or concurrent caller
//! awaits the same shared task and sees the same outcome, success or failure.

use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, Context, Result};
use futures_util::future::{BoxFuture, FutureExt, Shared};

use super::{GlyphDataProvider, GlyphDescriptor, InitReport};
use crate::variant::FontVariant;

/// Initialisation failure, cloneable so every waiter can hold it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("glyph dataset initialisation failed: {0:#}")]
pub struct InitError(Arc<anyhow::Error>);

impl InitError {
    fn new(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

pub type InitOutcome = std::result::Result<InitReport, InitError>;

type InitTask = Shared<BoxFuture<'static, InitOutcome>>;

pub struct GlyphMetadataService<P: GlyphDataProvider> {
    provider: Arc<P>,
    init: OnceLock<InitTask>,
}

impl<P: GlyphDataProvider> GlyphMetadataService<P> {
    /// Takes ownership of `provider` and runs its one-time setup.
    pub fn new(mut provider: P) -> Result<Self> {
        provider.initialise().context("initialising glyph provider")?;
        Ok(Self {
            provider: Arc::new(provider),
            init: OnceLock::new(),
        })
    }

    /// Runs the provider's dataset generation at most once per service.
    ///
    /// Must be awaited inside a tokio runtime.
    pub async fn initialize(&self) -> InitOutcome {
        self.init_task().await
    }

    /// True once initialisation has finished successfully.
    pub fn is_initialized(&self) -> bool {
        self.init
            .get()
            .and_then(|task| task.peek())
            .is_some_and(|outcome| outcome.is_ok())
    }

    /// Description of `code_point` for `variant`; `None` without a variant.
    pub fn description(&self, code_point: u32, variant: Option<&FontVariant>) -> Option<String> {
        let variant = variant?;
        self.provider.description(code_point, Some(variant))
    }

    /// Searches the variant's repertoire on the blocking pool.
    pub async fn search(&self, query: &str, variant: Option<&FontVariant>) -> Result<Vec<GlyphDescriptor>> {
        let Some(variant) = variant else {
            return Ok(Vec::new());
        };
        let provider = Arc::clone(&self.provider);
        let query = query.to_string();
        let variant = variant.clone();

        tokio::task::spawn_blocking(move || provider.search(&query, Some(&variant)))
            .await
            .context("glyph search task did not complete")?
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn init_task(&self) -> InitTask {
        self.init
            .get_or_init(|| {
                let provider = Arc::clone(&self.provider);
                async move {
                    log::debug!("starting glyph dataset generation");
                    match tokio::task::spawn_blocking(move || provider.generate()).await {
                        Ok(Ok(report)) => Ok(report),
                        Ok(Err(err)) => Err(InitError::new(err)),
                        Err(join) => Err(InitError::new(anyhow!("generation task aborted: {join}"))),
                    }
                }
                .boxed()
                .shared()
            })
            .clone()
    }
}
