//! Command handlers for `horilla-hier`.
//!
//! Each handler takes its clap args and a [`CmdContext`], prints through
//! [`crate::output`], and returns an error after rendering it so `main`
//! exits non-zero.

pub mod add;
pub mod ancestors;
pub mod assign;
pub mod candidates;
pub mod check;
pub mod completions;
pub mod descendants;
pub mod detach;
pub mod init;

use crate::output::{CliError, OutputMode, pretty_section, render_error, render_mode};
use horilla_core::db::hierarchy::AssignError;
use horilla_core::hierarchy::ReparentPolicy;
use horilla_core::model::HierarchyNode;
use horilla_core::{EntityKind, ErrorCode};
use rusqlite::Connection;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Everything a handler needs besides its own args.
#[derive(Debug, Clone)]
pub struct CmdContext {
    pub project_root: PathBuf,
    pub store_path: PathBuf,
    pub policy: ReparentPolicy,
    pub kind: EntityKind,
    pub output: OutputMode,
}

/// Open the store, or render `E1001` if `init` has not run.
pub fn open_db(ctx: &CmdContext) -> anyhow::Result<Connection> {
    match horilla_core::db::try_open_store(&ctx.store_path)? {
        Some(conn) => Ok(conn),
        None => {
            let code = ErrorCode::NotInitialized;
            render_error(
                ctx.output,
                &CliError::coded(
                    format!("{}: no store at {}", code.message(), ctx.store_path.display()),
                    code,
                ),
            )?;
            anyhow::bail!("store not found at {}", ctx.store_path.display());
        }
    }
}

/// Render an [`AssignError`] and turn it into the command's failure.
///
/// Guard rejections use the kind-specific form message.
pub fn fail(ctx: &CmdContext, err: AssignError) -> anyhow::Result<()> {
    let code = err.code();
    let message = match &err {
        AssignError::Rejected(reason) => reason.user_message(ctx.kind),
        other => other.to_string(),
    };
    render_error(ctx.output, &CliError::coded(&message, code))?;
    Err(anyhow::Error::new(err).context(format!("{code}: {message}")))
}

#[derive(Debug, Serialize)]
struct NodeList<'a> {
    kind: EntityKind,
    heading: &'a str,
    nodes: &'a [HierarchyNode],
}

/// Print a node list: one `id<TAB>name<TAB>parent` row per node in text
/// mode, a titled section in pretty mode.
pub fn render_nodes(ctx: &CmdContext, heading: &str, nodes: &[HierarchyNode]) -> anyhow::Result<()> {
    let list = NodeList {
        kind: ctx.kind,
        heading,
        nodes,
    };
    render_mode(
        ctx.output,
        &list,
        |list, w| {
            for node in list.nodes {
                write_row(w, node)?;
            }
            Ok(())
        },
        |list, w| {
            pretty_section(w, &format!("{} ({})", list.heading, list.nodes.len()))?;
            if list.nodes.is_empty() {
                writeln!(w, "  (none)")?;
            }
            for node in list.nodes {
                let parent = node
                    .parent_id
                    .map_or_else(|| "root".to_string(), |p| format!("parent {p}"));
                writeln!(w, "  {:>6}  {}  [{parent}]", node.id, node.name)?;
            }
            Ok(())
        },
    )
}

fn write_row(w: &mut dyn Write, node: &HierarchyNode) -> io::Result<()> {
    let parent = node.parent_id.map_or_else(|| "-".to_string(), |p| p.to_string());
    writeln!(w, "{}\t{}\t{parent}", node.id, node.name)
}
