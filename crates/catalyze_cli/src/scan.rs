//! `catalyze scan`: build the include graph and summarize it.
//!
//! 1. Resolve the project root and load `catalyze.toml`
//! 2. Read and fingerprint every tracked file
//! 3. Upsert each file and scan its `#include` directives
//! 4. Print totals to stderr

use crate::pipeline::BuildContext;
use crate::GlobalArgs;

/// Runs the `catalyze scan` command.
///
/// Returns exit code 0 once every tracked file has been scanned.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut ctx = BuildContext::open(global)?;

    if !global.quiet {
        eprintln!(
            "   Scanning {} ({} tracked files)",
            ctx.config.project.name,
            ctx.config.project.files.len()
        );
    }

    ctx.build(global.keep_going)?;

    if !global.quiet {
        if global.verbose {
            for file in ctx.sources.files() {
                eprintln!("   {:>8x}  {}", file.fingerprint.as_raw(), file.path);
            }
        }
        let report = &ctx.report;
        eprintln!(
            "   Result: {} node(s), {} edge(s) from {} directive(s) ({} system, {} skipped)",
            ctx.store.len(),
            ctx.store.edge_count(),
            report.directives,
            report.system,
            report.skipped
        );
        if !ctx.skipped_files.is_empty() {
            eprintln!("   Skipped {} unreadable file(s)", ctx.skipped_files.len());
        }
    }

    Ok(0)
}
