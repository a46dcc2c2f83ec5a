//! `catalyze status`: classify tracked files against the cache.
//!
//! The cache is loaded before anything is scanned, so a run compares this
//! build's fingerprints with the previous run's. Files are reported on
//! stdout one per line as `new`, `modified` or `unchanged`.

use catalyze_cache::{Cache, ChangeSet};

use crate::pipeline::BuildContext;
use crate::{GlobalArgs, StatusArgs};

/// Runs the `catalyze status` command.
///
/// With `--write`, the fresh fingerprints replace the cache afterwards.
pub fn run(args: &StatusArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut ctx = BuildContext::open(global)?;

    let mut cache = Cache::load_or_create(&ctx.cache_path(), ctx.config.project.files.len())?;
    ctx.build(global.keep_going)?;

    let current = ctx.tracked_fingerprints();
    let changes = cache.detect_changes(&current);

    for line in status_lines(&ctx.config.project.files, &changes) {
        println!("{line}");
    }

    if !global.quiet {
        eprintln!(
            "   Result: {} new, {} modified, {} unchanged, {} deleted ({} to rescan)",
            changes.new_files.len(),
            changes.modified_files.len(),
            changes.unchanged_files.len(),
            changes.deleted.len(),
            changes.dirty_count()
        );
    }

    if args.write {
        cache.save(&current)?;
        if !global.quiet {
            eprintln!("   Wrote {}", cache.path().display());
        }
    }

    Ok(0)
}

/// One `<state> <path>` line per tracked file, in tracked-file order.
fn status_lines(files: &[String], changes: &ChangeSet) -> Vec<String> {
    files
        .iter()
        .map(|path| {
            let state = if changes.new_files.contains(path) {
                "new"
            } else if changes.modified_files.contains(path) {
                "modified"
            } else {
                "unchanged"
            };
            format!("{state:<9} {path}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_tracked_order() {
        let files = vec!["a.c".to_string(), "b.h".to_string(), "c.c".to_string()];
        let changes = ChangeSet {
            new_files: vec!["c.c".to_string()],
            modified_files: vec!["a.c".to_string()],
            unchanged_files: vec!["b.h".to_string()],
            deleted: vec![],
        };
        assert_eq!(
            status_lines(&files, &changes),
            ["modified  a.c", "unchanged b.h", "new       c.c"]
        );
    }
}
