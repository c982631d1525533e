use super::{CmdContext, open_db};
use crate::output::{CliError, pretty_kv, pretty_section, render_error, render_mode};
use anyhow::Result;
use clap::Args;
use horilla_core::db::hierarchy::audit;
use horilla_core::hierarchy::ForestReport;
use horilla_core::{EntityKind, ErrorCode};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct CheckArgs {}

#[derive(Debug, Serialize)]
struct CheckReport {
    kind: EntityKind,
    healthy: bool,
    #[serde(flatten)]
    report: ForestReport,
}

/// Audit stored parent links. Fails when any cycle or dangling parent exists.
pub fn run_check(_args: &CheckArgs, ctx: &CmdContext) -> Result<()> {
    let conn = open_db(ctx)?;
    let report = audit(&conn, ctx.kind)?;
    let healthy = report.is_healthy();

    let result = CheckReport {
        kind: ctx.kind,
        healthy,
        report,
    };
    render_mode(
        ctx.output,
        &result,
        |r, w| {
            writeln!(
                w,
                "{}\tnodes={}\troots={}\tcycles={}\tdangling={}",
                if r.healthy { "ok" } else { "corrupt" },
                r.report.nodes,
                r.report.roots,
                r.report.cycles.len(),
                r.report.dangling.len()
            )?;
            for cycle in &r.report.cycles {
                writeln!(w, "{cycle}")?;
            }
            for d in &r.report.dangling {
                writeln!(w, "dangling {} -> {}", d.node_id, d.missing_parent)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, &format!("{} hierarchy", r.kind))?;
            pretty_kv(w, "nodes", r.report.nodes.to_string())?;
            pretty_kv(w, "roots", r.report.roots.to_string())?;
            pretty_kv(w, "cycles", r.report.cycles.len().to_string())?;
            pretty_kv(w, "dangling", r.report.dangling.len().to_string())?;
            for cycle in &r.report.cycles {
                writeln!(w, "  ✗ {cycle}")?;
            }
            for d in &r.report.dangling {
                writeln!(w, "  ✗ {} points at missing parent {}", d.node_id, d.missing_parent)?;
            }
            if r.healthy {
                writeln!(w, "✓ forest is healthy")?;
            }
            Ok(())
        },
    )?;

    if !healthy {
        let code = ErrorCode::CorruptHierarchy;
        render_error(
            ctx.output,
            &CliError::coded(format!("{} hierarchy is not a forest", ctx.kind), code),
        )?;
        anyhow::bail!("{code}: {} hierarchy is not a forest", ctx.kind);
    }
    Ok(())
}
