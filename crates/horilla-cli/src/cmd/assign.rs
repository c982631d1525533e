use super::{CmdContext, fail, open_db};
use crate::output::render_mode;
use anyhow::Result;
use clap::Args;
use horilla_core::db::hierarchy::assign_child;
use horilla_core::hierarchy::{ReparentPolicy, ValidAssignment};
use horilla_core::{EntityKind, NodeId};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Node that becomes the parent.
    #[arg(long)]
    pub parent: NodeId,

    /// Node to place under the parent. Omitting it is rejected.
    #[arg(long)]
    pub child: Option<NodeId>,
}

#[derive(Debug, Serialize)]
struct Assigned {
    kind: EntityKind,
    #[serde(flatten)]
    assignment: ValidAssignment,
    policy: ReparentPolicy,
}

/// Validate and commit one parent/child edge.
pub fn run_assign(args: &AssignArgs, ctx: &CmdContext) -> Result<()> {
    let mut conn = open_db(ctx)?;
    let assignment = match assign_child(&mut conn, ctx.kind, args.parent, args.child, ctx.policy) {
        Ok(assignment) => assignment,
        Err(e) => return fail(ctx, e),
    };

    let result = Assigned {
        kind: ctx.kind,
        assignment,
        policy: ctx.policy,
    };
    render_mode(
        ctx.output,
        &result,
        |r, w| {
            writeln!(
                w,
                "{}\t{}",
                r.assignment.parent_id, r.assignment.child_id
            )
        },
        |r, w| {
            writeln!(
                w,
                "✓ {} {} is now a child of {}",
                r.kind, r.assignment.child_id, r.assignment.parent_id
            )
        },
    )
}
