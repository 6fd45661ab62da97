pub mod config;
pub mod error;
pub mod handlers;
pub mod heuristics;
pub mod models;
pub mod modes;
pub mod prompt;
pub mod response;
pub mod service;
pub mod transport;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::service::{AssistantService, CredentialSource};
use crate::transport::build_transport;

pub use crate::modes::{Mode, PlanTier};
pub use crate::prompt::{PromptSpec, build_prompt};

/// Wire the configured transport into a service that reads its credential from the environment.
pub fn service_from_config(cfg: Arc<Config>) -> Result<AssistantService> {
    let transport = build_transport(&cfg)?;
    Ok(AssistantService::new(
        transport,
        cfg,
        CredentialSource::Environment,
    ))
}
