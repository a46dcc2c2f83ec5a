//! `catalyze graph`: dump every node in the store.
//!
//! Nodes are listed in bucket-scan order with their fingerprint, direct
//! includes and, for headers, the paired `.c` file. An include cycle is
//! reported as a warning; it does not change the exit code.

use catalyze_graph::NodeStore;
use serde::Serialize;
use tracing::warn;

use crate::pipeline::BuildContext;
use crate::{GlobalArgs, GraphArgs, ReportFormat};

/// One node as it appears in the dump.
#[derive(Debug, Serialize)]
struct NodeReport<'a> {
    path: &'a str,
    content_hash: String,
    dependencies: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    companion: Option<&'a str>,
}

/// Store and arena totals for `--stats`.
#[derive(Debug, Serialize)]
struct StoreStats {
    nodes: usize,
    edges: usize,
    buckets: usize,
    arena_used: usize,
    arena_wasted: usize,
    arena_capacity: usize,
}

#[derive(Debug, Serialize)]
struct GraphReport<'a> {
    nodes: Vec<NodeReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<StoreStats>,
}

/// Runs the `catalyze graph` command.
pub fn run(args: &GraphArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut ctx = BuildContext::open(global)?;
    ctx.build(global.keep_going)?;

    let report = build_report(&ctx.store, args.stats);
    if let Some(cycle) = &report.cycle {
        warn!("include cycle: {}", cycle.join(" -> "));
    }

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&report)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(0)
}

fn build_report(store: &NodeStore, with_stats: bool) -> GraphReport<'_> {
    let nodes = store
        .scan_order()
        .map(|id| {
            let node = store.node(id);
            NodeReport {
                path: node.path(),
                content_hash: node.content_hash().to_string(),
                dependencies: node.dependencies().map(|d| store.node(d).path()).collect(),
                companion: store
                    .companion_source(id)
                    .map(|c| store.node(c).path()),
            }
        })
        .collect();

    let cycle = store
        .find_cycle()
        .map(|ids| ids.into_iter().map(|id| store.node(id).path()).collect());

    let stats = with_stats.then(|| {
        let arena = store.arena_stats();
        StoreStats {
            nodes: store.len(),
            edges: store.edge_count(),
            buckets: store.capacity(),
            arena_used: arena.used,
            arena_wasted: arena.wasted,
            arena_capacity: arena.capacity,
        }
    });

    GraphReport {
        nodes,
        cycle,
        stats,
    }
}

fn render_text(report: &GraphReport<'_>) -> String {
    let mut out = String::new();
    for node in &report.nodes {
        out.push_str(&format!("{} [{}]", node.path, node.content_hash));
        if let Some(companion) = node.companion {
            out.push_str(&format!(" (source: {companion})"));
        }
        out.push('\n');
        for dep in &node.dependencies {
            out.push_str(&format!("  -> {dep}\n"));
        }
    }
    if let Some(stats) = &report.stats {
        out.push_str(&format!(
            "\n{} node(s), {} edge(s), {} bucket(s)\narena: {} used, {} wasted, {} capacity\n",
            stats.nodes,
            stats.edges,
            stats.buckets,
            stats.arena_used,
            stats.arena_wasted,
            stats.arena_capacity
        ));
    }
    out
}
