use super::CmdContext;
use crate::output::{pretty_kv, render_mode};
use anyhow::Result;
use clap::Args;
use horilla_core::config;
use horilla_core::db::migrations::LATEST_SCHEMA_VERSION;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
struct InitReport {
    config_path: String,
    config_created: bool,
    store_path: String,
    schema_version: u32,
}

/// Create `.horilla/config.toml` (if missing) and the migrated store.
///
/// Safe to re-run: an existing config is left alone and the store is only
/// migrated forward.
pub fn run_init(_args: &InitArgs, ctx: &CmdContext) -> Result<()> {
    let config_created = config::write_default_config(&ctx.project_root)?;
    let _conn = horilla_core::db::open_store(&ctx.store_path)?;

    tracing::info!(
        store = %ctx.store_path.display(),
        config_created,
        "initialized hierarchy store"
    );

    let report = InitReport {
        config_path: config::config_path(&ctx.project_root).display().to_string(),
        config_created,
        store_path: ctx.store_path.display().to_string(),
        schema_version: LATEST_SCHEMA_VERSION,
    };

    render_mode(
        ctx.output,
        &report,
        |r, w| writeln!(w, "{}", r.store_path),
        |r, w| {
            writeln!(w, "✓ Initialized hierarchy store")?;
            pretty_kv(w, "store", &r.store_path)?;
            pretty_kv(
                w,
                "config",
                if r.config_created {
                    format!("{} (created)", r.config_path)
                } else {
                    format!("{} (kept)", r.config_path)
                },
            )?;
            pretty_kv(w, "schema", format!("v{}", r.schema_version))
        },
    )
}
