//! One full processing run: rules file in, Feedly saved stream through.

use std::path::Path;

use tracing::{debug, info};

use crate::channels::{FeedlyClient, saved_entries};
use crate::config::load_config;
use crate::error::Result;
use crate::pipeline::processor::{RunSummary, process_entries};
use crate::processors::{ProcessorContext, ProcessorRegistry, build_rules};

/// Load the rules, connect to Feedly and process every saved entry.
///
/// Processors are built before the first Feedly request, so a bad rules file
/// or a missing credential fails without touching the network.
pub async fn run(
    config_file: &Path,
    token_dir: &Path,
    feedly_api_base: &str,
    ctx: &ProcessorContext,
) -> Result<RunSummary> {
    let config = load_config(config_file)?;
    info!(
        "Loaded {} rules from {}",
        config.rules.len(),
        config_file.display()
    );

    let rules = build_rules(&config, &ProcessorRegistry::new(), ctx)?;

    let client = FeedlyClient::from_token_dir(token_dir, feedly_api_base).await?;
    debug!(stream_id = %client.saved_stream_id(), "Connected to Feedly");

    Ok(process_entries(saved_entries(&client), &rules).await?)
}
