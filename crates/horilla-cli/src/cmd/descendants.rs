use super::{CmdContext, fail, open_db, render_nodes};
use anyhow::Result;
use clap::Args;
use horilla_core::NodeId;
use horilla_core::db::hierarchy::descendants;

#[derive(Args, Debug)]
pub struct DescendantsArgs {
    pub id: NodeId,
}

/// Depth-first pre-order, siblings ascending by id.
pub fn run_descendants(args: &DescendantsArgs, ctx: &CmdContext) -> Result<()> {
    let conn = open_db(ctx)?;
    let nodes = match descendants(&conn, ctx.kind, args.id) {
        Ok(nodes) => nodes,
        Err(e) => return fail(ctx, e),
    };
    render_nodes(ctx, &format!("Descendants of {} {}", ctx.kind, args.id), &nodes)
}
