//! CLI command implementations for tag limit administration.
//!
//! Commands run against the settings service only; nothing here needs a
//! tag editor. `check` evaluates the guard rule directly so limits can be
//! tried out from a terminal.

use anyhow::{Context, Result, bail};

use crate::client::ClientContext;
use crate::guard::{self, GuardState, KeyDecision};
use crate::settings::{ContentTypeOption, IgnoreList, SettingsService};

/// Print the current settings, as text or as JSON.
pub async fn cmd_show(service: &SettingsService, json: bool) -> Result<()> {
    let settings = service.load().await.context("failed to load settings")?;

    if json {
        let text = serde_json::to_string_pretty(&settings).context("failed to encode settings")?;
        println!("{text}");
        return Ok(());
    }

    println!("Max tags per item: {}", settings.max_tags);
    if settings.enabled_content_types.is_empty() {
        println!("Enabled content types: (none)");
    } else {
        let types: Vec<&str> = settings
            .enabled_content_types
            .iter()
            .map(String::as_str)
            .collect();
        println!("Enabled content types: {}", types.join(", "));
    }
    Ok(())
}

/// Initialise settings on first use.
pub async fn cmd_install(service: &SettingsService) -> Result<()> {
    if service.install().await.context("failed to install settings")? {
        println!("Tag limit installed. No content types are limited yet.");
    } else {
        println!("Tag limit is already installed.");
    }
    Ok(())
}

/// Store a new maximum.
pub async fn cmd_set_max(service: &SettingsService, raw: &str) -> Result<()> {
    let stored = service
        .set_max_tags(raw)
        .await
        .context("failed to save max tags")?;
    let effective = service.get_max_tags().await.context("failed to load max tags")?;

    if i64::from(effective) == stored {
        println!("Max tags set to {stored}.");
    } else {
        println!("Stored {stored}, which is not a positive number; the default of {effective} applies.");
    }
    Ok(())
}

/// Enable tag limiting for content types.
pub async fn cmd_enable(
    service: &SettingsService,
    ignore: &IgnoreList,
    types: &[String],
) -> Result<()> {
    if let Some(t) = types.iter().find(|t| ignore.contains(t)) {
        bail!("content type '{t}' is a system type and cannot be limited");
    }

    let added = service
        .enable(types, ignore)
        .await
        .context("failed to enable content types")?;
    if added.is_empty() {
        println!("Nothing changed.");
    } else {
        for t in &added {
            println!("  enabled: {t}");
        }
    }
    Ok(())
}

/// Disable tag limiting for content types.
pub async fn cmd_disable(service: &SettingsService, types: &[String]) -> Result<()> {
    let removed = service
        .disable(types)
        .await
        .context("failed to disable content types")?;
    if removed.is_empty() {
        println!("Nothing changed.");
    } else {
        for t in &removed {
            println!("  disabled: {t}");
        }
    }
    Ok(())
}

/// List the content types that can be limited.
pub async fn cmd_content_types(
    service: &SettingsService,
    ignore: &IgnoreList,
    known: &[String],
) -> Result<()> {
    let settings = service.load().await.context("failed to load settings")?;
    let options = ContentTypeOption::list(known, &settings, ignore);

    if options.is_empty() {
        println!("No content types available.");
        return Ok(());
    }

    println!("{:<24} {:<8}", "CONTENT TYPE", "LIMITED");
    println!("{}", "-".repeat(33));
    for option in &options {
        let limited = if option.checked { "yes" } else { "no" };
        println!("{:<24} {}", option.machine_name, limited);
    }
    Ok(())
}

/// Print the script context an editor page for the content type receives.
pub async fn cmd_context(service: &SettingsService, content_type: &str) -> Result<()> {
    let settings = service.load().await.context("failed to load settings")?;
    match ClientContext::for_page(&settings, content_type) {
        Some(ctx) => println!("{}", ctx.to_script().context("failed to encode context")?),
        None => println!("Tag limiting is not enabled for '{content_type}'; no guard is attached."),
    }
    Ok(())
}

/// Evaluate the guard rule for a given editor state.
pub async fn cmd_check(
    service: &SettingsService,
    chips: usize,
    input: &str,
    max_override: Option<i64>,
) -> Result<()> {
    let max_tags = match max_override {
        Some(max) => max,
        None => i64::from(service.get_max_tags().await.context("failed to load max tags")?),
    };
    let candidates = guard::count_candidates(input);
    let verdict = guard::evaluate(chips, max_tags, candidates);

    let state = match verdict.state {
        GuardState::Open => "open",
        GuardState::Capped => "capped",
    };
    let commit = match verdict.decision {
        KeyDecision::Allow => "allowed",
        KeyDecision::Suppress => "suppressed",
    };

    println!("max tags:   {max_tags}");
    println!("chips:      {chips}");
    println!("candidates: {candidates}");
    println!("state:      {state}");
    println!("commit:     {commit}");
    Ok(())
}
