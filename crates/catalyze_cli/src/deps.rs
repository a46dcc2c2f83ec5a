//! `catalyze deps`: list what one file includes, or what includes it.

use catalyze_graph::{NodeId, NodeStore};

use crate::pipeline::BuildContext;
use crate::{DepsArgs, GlobalArgs};

/// Runs the `catalyze deps` command.
///
/// Prints one path per line on stdout. An unknown file is an error.
pub fn run(args: &DepsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut ctx = BuildContext::open(global)?;
    ctx.build(global.keep_going)?;

    let id = ctx
        .node_for(&args.file)
        .ok_or_else(|| format!("{} is not in the include graph", args.file))?;

    for path in query(&ctx.store, id, args.transitive, args.reverse) {
        println!("{path}");
    }
    Ok(0)
}

fn query(store: &NodeStore, id: NodeId, transitive: bool, reverse: bool) -> Vec<&str> {
    let ids: Vec<NodeId> = match (reverse, transitive) {
        (false, false) => store.node(id).dependencies().collect(),
        (false, true) => store.transitive_dependencies(id),
        (true, false) => store.dependents(id),
        (true, true) => store.transitive_dependents(id),
    };
    ids.into_iter().map(|d| store.node(d).path()).collect()
}
