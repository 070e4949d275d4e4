//! Verify site health and emit diagnostics.

use anyhow::{bail, Context, Result};
use leafpress_core::{Config, Diagnostic, DiagnosticSeverity, SiteBuilder};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct VerificationSummary<'a> {
    posts: usize,
    errors: usize,
    warnings: usize,
    infos: usize,
    diagnostics: &'a [Diagnostic],
}

/// Load and render every post without writing output and surface diagnostics.
///
/// Unlike `build`, a post that fails to render is reported rather than
/// aborting the run; any error-level diagnostic fails the command.
pub fn verify_site(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let builder = SiteBuilder::new(config).without_cache();
    let site = builder
        .load()
        .context("Failed to load site for verification")?;

    let mut diagnostics = site.diagnostics.clone();
    for item in &site.items {
        if let Err(err) = builder.render_item(item) {
            diagnostics.push(
                Diagnostic::new("render.failed", DiagnosticSeverity::Error, err.to_string())
                    .for_item(item),
            );
        }
    }

    let count = |severity: DiagnosticSeverity| {
        diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    };
    let errors = count(DiagnosticSeverity::Error);
    let warnings = count(DiagnosticSeverity::Warning);
    let infos = count(DiagnosticSeverity::Info);

    let summary = VerificationSummary {
        posts: site.items.len(),
        errors,
        warnings,
        infos,
        diagnostics: &diagnostics,
    };

    if json {
        let payload = serde_json::to_string_pretty(&summary)?;
        println!("{}", payload);
    } else {
        println!(
            "Verification complete: {} posts, {} errors, {} warnings, {} info",
            summary.posts, errors, warnings, infos
        );
        for diag in &diagnostics {
            let slug = diag
                .slug
                .as_deref()
                .map(|s| format!(" [{}]", s))
                .unwrap_or_default();
            let source = diag
                .source_path
                .as_deref()
                .map(|s| format!(" ({})", s))
                .unwrap_or_default();
            println!(
                "- {:?} {}{}{}: {}",
                diag.severity, diag.code, slug, source, diag.message
            );
        }
    }

    if errors > 0 {
        bail!("Verification failed with {} error(s)", errors);
    }
    Ok(())
}
