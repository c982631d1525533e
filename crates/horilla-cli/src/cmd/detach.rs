use super::{CmdContext, fail, open_db};
use crate::output::render;
use anyhow::Result;
use clap::Args;
use horilla_core::db::hierarchy::detach_child;
use horilla_core::{EntityKind, NodeId};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct DetachArgs {
    /// Node to make a root.
    pub id: NodeId,
}

#[derive(Debug, Serialize)]
struct Detached {
    kind: EntityKind,
    id: NodeId,
    previous_parent: Option<NodeId>,
}

pub fn run_detach(args: &DetachArgs, ctx: &CmdContext) -> Result<()> {
    let mut conn = open_db(ctx)?;
    let previous_parent = match detach_child(&mut conn, ctx.kind, args.id) {
        Ok(previous) => previous,
        Err(e) => return fail(ctx, e),
    };

    let result = Detached {
        kind: ctx.kind,
        id: args.id,
        previous_parent,
    };
    render(ctx.output, &result, |r, w| match r.previous_parent {
        Some(parent) => writeln!(w, "✓ Detached {} {} from {parent}", r.kind, r.id),
        None => writeln!(w, "{} {} is already a root", r.kind, r.id),
    })
}
