use super::{CmdContext, open_db};
use crate::output::{CliError, render_error, render_mode};
use anyhow::Result;
use clap::Args;
use horilla_core::db::query;
use horilla_core::{EntityKind, ErrorCode, NodeId};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Display name of the new node.
    pub name: String,
}

#[derive(Debug, Serialize)]
struct Added {
    id: NodeId,
    kind: EntityKind,
    name: String,
}

/// Insert a new root node.
pub fn run_add(args: &AddArgs, ctx: &CmdContext) -> Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        render_error(ctx.output, &CliError::new(format!("{} name must not be blank", ctx.kind)))?;
        anyhow::bail!("blank {} name", ctx.kind);
    }

    let conn = open_db(ctx)?;
    let id = match query::insert_node(&conn, ctx.kind, name) {
        Ok(id) => id,
        Err(e) => {
            render_error(ctx.output, &CliError::coded(format!("{e:#}"), ErrorCode::StoreWriteFailed))?;
            return Err(e);
        }
    };
    tracing::info!(kind = %ctx.kind, id = %id, "added node");

    let added = Added {
        id,
        kind: ctx.kind,
        name: name.to_string(),
    };
    render_mode(
        ctx.output,
        &added,
        |a, w| writeln!(w, "{}", a.id),
        |a, w| writeln!(w, "✓ Added {} {}: {}", a.kind, a.id, a.name),
    )
}
