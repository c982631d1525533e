use super::{CmdContext, fail, open_db, render_nodes};
use anyhow::Result;
use clap::Args;
use horilla_core::NodeId;
use horilla_core::db::hierarchy::parent_candidates;

#[derive(Args, Debug)]
pub struct CandidatesArgs {
    /// Node that needs a parent.
    pub child: NodeId,
}

/// List the nodes a picker may offer as parent for `child`.
pub fn run_candidates(args: &CandidatesArgs, ctx: &CmdContext) -> Result<()> {
    let conn = open_db(ctx)?;
    let nodes = match parent_candidates(&conn, ctx.kind, args.child) {
        Ok(nodes) => nodes,
        Err(e) => return fail(ctx, e),
    };
    render_nodes(
        ctx,
        &format!("Parent candidates for {} {}", ctx.kind, args.child),
        &nodes,
    )
}
