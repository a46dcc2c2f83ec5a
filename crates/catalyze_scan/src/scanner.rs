//! The scan driver: finder, classifier and resolver feeding the node store.

use catalyze_common::ScanMode;
use catalyze_graph::{EdgeInsert, NodeId, NodeStore, StoreError};
use tracing::trace;

use crate::finder::find_directives;
use crate::include::{classify, Directive};
use crate::resolve::resolve_include;

/// Counters from scanning one file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// `#include` markers found.
    pub directives: usize,
    /// New edges recorded.
    pub edges_added: usize,
    /// Quoted includes whose edge already existed.
    pub duplicates: usize,
    /// `<...>` includes, ignored.
    pub system: usize,
    /// Malformed directives, ignored.
    pub skipped: usize,
}

impl ScanReport {
    /// Adds `other`'s counters to this report.
    pub fn absorb(&mut self, other: &ScanReport) {
        self.directives += other.directives;
        self.edges_added += other.edges_added;
        self.duplicates += other.duplicates;
        self.system += other.system;
        self.skipped += other.skipped;
    }
}

/// Scans `bytes`, the contents of `file_path`, and records an edge from
/// `file_path` to every quoted include it names.
///
/// Targets are created in the store on demand with an unknown fingerprint.
/// Stops at the first store error; edges recorded before it remain.
pub fn scan(
    store: &mut NodeStore,
    file_path: &str,
    bytes: &[u8],
    mode: ScanMode,
) -> Result<ScanReport, StoreError> {
    let from = store.get_or_insert(file_path)?;
    scan_node(store, from, bytes, mode)
}

/// Like [`scan`], for a file whose node is already known.
///
/// Every edge lands on `from` even if the bucket array grows during the scan
/// and `from` stops being reachable by path.
pub fn scan_node(
    store: &mut NodeStore,
    from: NodeId,
    bytes: &[u8],
    mode: ScanMode,
) -> Result<ScanReport, StoreError> {
    let file_path = store.node(from).path().to_owned();
    let mut report = ScanReport::default();

    for marker in find_directives(bytes, mode) {
        report.directives += 1;
        match classify(bytes, marker) {
            Directive::Quoted(text) => {
                let target = resolve_include(&file_path, text);
                let to = store.get_or_insert(&target)?;
                match store.add_edge_ids(from, to)? {
                    EdgeInsert::Added => {
                        trace!(from = %file_path, to = %target, "include edge");
                        report.edges_added += 1;
                    }
                    EdgeInsert::AlreadyPresent => report.duplicates += 1,
                }
            }
            Directive::System => report.system += 1,
            Directive::Skipped(reason) => {
                trace!(file = %file_path, offset = marker, ?reason, "skipped include");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use catalyze_arena::Arena;
    use catalyze_common::Fingerprint;

    use super::*;

    fn deps_of(store: &NodeStore, path: &str) -> Vec<String> {
        let node = store.get_path(path).unwrap();
        node.dependencies()
            .map(|id| store.node(id).path().to_string())
            .collect()
    }

    #[test]
    fn records_quoted_includes_in_order() {
        let mut store = NodeStore::new(16).unwrap();
        store.upsert("src/main.c", Fingerprint::from_raw(7)).unwrap();
        let src = b"#include <stdio.h>\n#include \"foo.h\"\n#include \"../include/bar.h\"\n\nint main(void) { return 0; }\n";

        let report = scan(&mut store, "src/main.c", src, ScanMode::Lanes).unwrap();
        assert_eq!(
            report,
            ScanReport {
                directives: 3,
                edges_added: 2,
                duplicates: 0,
                system: 1,
                skipped: 0,
            }
        );
        assert_eq!(deps_of(&store, "src/main.c"), ["src/foo.h", "include/bar.h"]);
        assert_eq!(
            store.get_path("src/foo.h").unwrap().content_hash(),
            Fingerprint::UNKNOWN
        );
        assert_eq!(
            store.get_path("src/main.c").unwrap().content_hash(),
            Fingerprint::from_raw(7)
        );
    }

    #[test]
    fn system_only_file_has_no_edges() {
        let mut store = NodeStore::new(16).unwrap();
        store.upsert("a.c", Fingerprint::from_raw(1)).unwrap();
        let report = scan(
            &mut store,
            "a.c",
            b"#include <stdlib.h>\n#include <string.h>\n",
            ScanMode::Scalar,
        )
        .unwrap();
        assert_eq!(report.system, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_path("a.c").unwrap().dep_count(), 0);
    }

    #[test]
    fn repeated_include_is_counted_once() {
        let mut store = NodeStore::new(16).unwrap();
        let src = b"#include \"a.h\"\n#include \"a.h\"\n";
        let report = scan(&mut store, "x.c", src, ScanMode::Lanes).unwrap();
        assert_eq!(report.edges_added, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(deps_of(&store, "x.c"), ["a.h"]);
    }

    #[test]
    fn malformed_directives_do_not_stop_the_scan() {
        let mut store = NodeStore::new(16).unwrap();
        let src = b"#include \"\"\n#include \"broken\n#include NAME\n#include \"ok.h\"\n";
        let report = scan(&mut store, "m.c", src, ScanMode::Lanes).unwrap();
        assert_eq!(report.skipped, 3);
        assert_eq!(report.edges_added, 1);
        assert_eq!(deps_of(&store, "m.c"), ["ok.h"]);
    }

    #[test]
    fn self_include_is_recorded() {
        let mut store = NodeStore::new(16).unwrap();
        scan(&mut store, "inc/loop.h", b"#include \"loop.h\"\n", ScanMode::Lanes).unwrap();
        let id = store.lookup("inc/loop.h").unwrap();
        assert!(store.node(id).depends_on(id));
    }

    #[test]
    fn modes_agree_at_awkward_lengths() {
        for pad in [0usize, 5, 24, 31, 32, 33, 60, 64, 97] {
            let mut src = vec![b' '; pad];
            src.extend_from_slice(b"#include \"a.h\"\n#include \"b.h\"");

            let mut lanes = NodeStore::new(8).unwrap();
            let mut scalar = NodeStore::new(8).unwrap();
            let r1 = scan(&mut lanes, "d/f.c", &src, ScanMode::Lanes).unwrap();
            let r2 = scan(&mut scalar, "d/f.c", &src, ScanMode::Scalar).unwrap();
            assert_eq!(r1, r2, "pad {pad}");
            assert_eq!(deps_of(&lanes, "d/f.c"), ["d/a.h", "d/b.h"], "pad {pad}");
        }
    }

    #[test]
    fn store_error_is_propagated() {
        let mut store = NodeStore::with_arena(Arena::with_capacity(16), 4).unwrap();
        let err = scan(
            &mut store,
            "a.c",
            b"#include \"a_very_long_header_name.h\"\n",
            ScanMode::Lanes,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::ArenaExhausted { .. }));
    }

    #[test]
    fn edges_stay_on_the_scanned_node_across_growth() {
        // One bucket: every new target forces the bucket array to double.
        let mut store = NodeStore::new(1).unwrap();
        let from = store.upsert("src/main.c", Fingerprint::from_raw(3)).unwrap();
        let src = b"#include \"a.h\"\n#include \"b.h\"\n#include \"c.h\"\n#include \"d.h\"\n#include \"e.h\"\n";

        let report = scan_node(&mut store, from, src, ScanMode::Lanes).unwrap();
        assert_eq!(report.edges_added, 5);
        assert_eq!(store.capacity(), 8);

        let deps: Vec<&str> = store
            .node(from)
            .dependencies()
            .map(|id| store.node(id).path())
            .collect();
        assert_eq!(deps, ["src/a.h", "src/b.h", "src/c.h", "src/d.h", "src/e.h"]);
        let copies = store
            .ids()
            .filter(|&id| store.node(id).path() == "src/main.c")
            .count();
        assert_eq!(copies, 1);
    }

    #[test]
    fn reports_accumulate() {
        let mut total = ScanReport::default();
        total.absorb(&ScanReport {
            directives: 2,
            edges_added: 1,
            duplicates: 0,
            system: 1,
            skipped: 0,
        });
        total.absorb(&ScanReport {
            directives: 1,
            edges_added: 0,
            duplicates: 0,
            system: 0,
            skipped: 1,
        });
        assert_eq!(total.directives, 3);
        assert_eq!(total.skipped, 1);
        assert_eq!(total.system, 1);
    }
}
