//! Report generation
//!
//! Renders a load report and the resulting forests as TXT or JSON.

use anyhow::Result;
use decoder_forest::{DecoderCatalog, ForestView, LoadReport};
use serde::Serialize;
use std::io::Write;

/// Serializable snapshot of one node and its subtree
#[derive(Debug, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub has_next_alternate: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn collect(view: ForestView<'_>) -> Vec<TreeNode> {
        view.iter()
            .map(|node| TreeNode {
                name: node.name().to_string(),
                has_next_alternate: node.has_next_alternate(),
                children: Self::collect(node.children()),
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    report: &'a LoadReport,
    program_name_forest: Vec<TreeNode>,
    unscoped_forest: Vec<TreeNode>,
}

/// Write the report as pretty-printed JSON
pub fn write_json<W: Write>(out: &mut W, catalog: &DecoderCatalog, report: &LoadReport) -> Result<()> {
    let json = JsonReport {
        report,
        program_name_forest: TreeNode::collect(catalog.lookup(true)),
        unscoped_forest: TreeNode::collect(catalog.lookup(false)),
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)?;
    Ok(())
}

/// Write the report as plain text
pub fn write_text<W: Write>(out: &mut W, catalog: &DecoderCatalog, report: &LoadReport) -> Result<()> {
    let stats = &report.stats;
    let elapsed = report.finished_at - report.started_at;

    writeln!(out, "Decoder catalog load ({})", report.started_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "  Attached:        {}", report.attached)?;
    writeln!(out, "  Rejected:        {}", report.rejected.len())?;
    writeln!(out, "  Published:       {}", if report.published { "yes" } else { "no" })?;
    if report.aborted {
        writeln!(out, "  Stopped early:   yes")?;
    }
    writeln!(
        out,
        "  Nodes:           {} ({} program-name roots, {} unscoped roots, {} alternate links)",
        stats.total_nodes, stats.pn_roots, stats.npn_roots, stats.alternate_links
    )?;
    writeln!(out, "  Duration:        {} ms", elapsed.num_milliseconds())?;

    for (title, view) in [
        ("Program-name forest", catalog.lookup(true)),
        ("Unscoped forest", catalog.lookup(false)),
    ] {
        writeln!(out, "\n{}:", title)?;
        if view.is_empty() {
            writeln!(out, "  (empty)")?;
        } else {
            write_tree(out, view, 1)?;
        }
    }

    if !report.rejected.is_empty() {
        writeln!(out, "\nRejections:")?;
        for rejection in &report.rejected {
            let parent = rejection
                .parent
                .as_deref()
                .map(|p| format!(" (parent '{}')", p))
                .unwrap_or_default();
            writeln!(
                out,
                "  #{} '{}'{}: {} - {}",
                rejection.index, rejection.decoder, parent, rejection.kind, rejection.message
            )?;
        }
    }

    Ok(())
}

fn write_tree<W: Write>(out: &mut W, view: ForestView<'_>, depth: usize) -> Result<()> {
    for node in view.iter() {
        let marker = if node.has_next_alternate() { "  [+alt]" } else { "" };
        writeln!(out, "{}{}{}", "  ".repeat(depth), node.name(), marker)?;
        write_tree(out, node.children(), depth + 1)?;
    }
    Ok(())
}
