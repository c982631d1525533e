use super::{CmdContext, fail, open_db, render_nodes};
use anyhow::Result;
use clap::Args;
use horilla_core::NodeId;
use horilla_core::db::hierarchy::ancestors;

#[derive(Args, Debug)]
pub struct AncestorsArgs {
    pub id: NodeId,
}

/// Immediate parent first, root last.
pub fn run_ancestors(args: &AncestorsArgs, ctx: &CmdContext) -> Result<()> {
    let conn = open_db(ctx)?;
    let nodes = match ancestors(&conn, ctx.kind, args.id) {
        Ok(nodes) => nodes,
        Err(e) => return fail(ctx, e),
    };
    render_nodes(ctx, &format!("Ancestors of {} {}", ctx.kind, args.id), &nodes)
}
