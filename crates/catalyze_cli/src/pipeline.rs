//! Shared pipeline helpers for CLI commands.
//!
//! Contains project root resolution, configuration loading, and the
//! [`BuildContext`] that loads, fingerprints and scans every tracked file
//! into one node store.

use std::path::{Path, PathBuf};

use catalyze_arena::Arena;
use catalyze_cache::TrackedFingerprint;
use catalyze_common::{fingerprint_file, Fingerprint};
use catalyze_config::{ProjectConfig, CONFIG_FILE};
use catalyze_graph::{GrowthPolicy, NodeId, NodeStore};
use catalyze_scan::{scan_node, ScanReport};
use catalyze_source::SourceDb;
use tracing::{debug, info, warn};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `catalyze.toml`.
///
/// Returns the directory containing `catalyze.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `catalyze.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Loads the configuration selected by the global args.
///
/// An explicit `--config` file is read as given; otherwise `catalyze.toml` in
/// `project_dir` is used.
pub fn load_project_config(
    global: &GlobalArgs,
    project_dir: &Path,
) -> Result<ProjectConfig, Box<dyn std::error::Error>> {
    let explicit = global
        .config
        .as_deref()
        .map(Path::new)
        .filter(|p| p.is_file());
    let config = match explicit {
        Some(path) => catalyze_config::load_config_file(path)?,
        None => catalyze_config::load_config(project_dir)?,
    };
    Ok(config)
}

/// Everything one run works on: configuration, loaded sources and the
/// node store. Created once per command and released when dropped.
pub struct BuildContext {
    /// Project root; tracked paths are relative to it.
    pub root: PathBuf,
    /// The parsed project configuration.
    pub config: ProjectConfig,
    /// Bytes and fingerprints of every loaded tracked file.
    pub sources: SourceDb,
    /// The include graph.
    pub store: NodeStore,
    /// Totals across every scanned file.
    pub report: ScanReport,
    /// Tracked files skipped under `--keep-going`.
    pub skipped_files: Vec<String>,
    /// The node each tracked file was upserted as, in tracked-file order.
    ///
    /// Under [`GrowthPolicy::Preserve`] a node can become unreachable through
    /// [`NodeStore::lookup`] once the bucket array grows, so tracked files are
    /// resolved through these ids instead.
    tracked: Vec<(String, NodeId)>,
}

impl BuildContext {
    /// Resolves the project and creates an empty store sized from config.
    pub fn open(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let root = resolve_project_root(global)?;
        let config = load_project_config(global, &root)?;

        let policy = if config.store.rehash_on_grow {
            GrowthPolicy::Rehash
        } else {
            GrowthPolicy::Preserve
        };
        let arena = Arena::with_capacity(config.store.arena_bytes);
        let store = NodeStore::with_arena(arena, config.store.capacity)?.with_growth_policy(policy);
        let sources = SourceDb::new(config.fingerprint.strategy);

        debug!(
            root = %root.display(),
            files = config.project.files.len(),
            buckets = store.capacity(),
            policy = ?store.growth_policy(),
            "build context opened"
        );
        Ok(Self {
            root,
            config,
            sources,
            store,
            report: ScanReport::default(),
            skipped_files: Vec::new(),
            tracked: Vec::new(),
        })
    }

    /// Loads every tracked file, then upserts and scans each in list order.
    ///
    /// An unreadable file fails the run unless `keep_going` is set, in which
    /// case it is recorded with whatever [`fingerprint_file`] reports for it
    /// (unknown when it cannot be read) and not scanned.
    pub fn build(&mut self, keep_going: bool) -> Result<(), Box<dyn std::error::Error>> {
        let tracked = self.config.project.files.clone();
        let loaded = self.sources.load_all(&self.root, &tracked);
        let mode = self.config.scan.mode;

        for (path, result) in tracked.iter().zip(loaded) {
            let id = match result {
                Ok(id) => id,
                Err(e) if keep_going => {
                    warn!("skipping {path}: {e}");
                    let fingerprint =
                        fingerprint_file(&self.root.join(path), path, self.config.fingerprint.strategy);
                    let node = self.store.upsert(path, fingerprint)?;
                    self.tracked.push((path.clone(), node));
                    self.skipped_files.push(path.clone());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let file = self.sources.get_file(id);
            let node = self.store.upsert(&file.path, file.fingerprint)?;
            self.tracked.push((path.clone(), node));
            let report = scan_node(&mut self.store, node, &file.bytes, mode)?;
            debug!(
                path = %file.path,
                directives = report.directives,
                edges = report.edges_added,
                skipped = report.skipped,
                "scanned"
            );
            self.report.absorb(&report);
        }

        let arena = self.store.arena_stats();
        info!(
            nodes = self.store.len(),
            edges = self.store.edge_count(),
            buckets = self.store.capacity(),
            "include graph built"
        );
        debug!(
            used = arena.used,
            wasted = arena.wasted,
            capacity = arena.capacity,
            "arena usage"
        );
        Ok(())
    }

    /// Where the cache file lives.
    pub fn cache_path(&self) -> PathBuf {
        self.root.join(&self.config.cache.path)
    }

    /// The node for `path`: a tracked file's own node if it is one, else
    /// whatever [`NodeStore::lookup`] finds.
    pub fn node_for(&self, path: &str) -> Option<NodeId> {
        self.tracked
            .iter()
            .find(|(tracked, _)| tracked == path)
            .map(|&(_, id)| id)
            .or_else(|| self.store.lookup(path))
    }

    /// Fresh fingerprints of the tracked files in tracked-file order, taken
    /// from the nodes they were upserted as.
    ///
    /// A file that was never built (the run stopped before it) reports
    /// [`Fingerprint::UNKNOWN`].
    pub fn tracked_fingerprints(&self) -> Vec<TrackedFingerprint> {
        self.config
            .project
            .files
            .iter()
            .map(|path| {
                let content_hash = self
                    .node_for(path)
                    .map(|id| self.store.node(id).content_hash())
                    .unwrap_or(Fingerprint::UNKNOWN);
                TrackedFingerprint::new(path.as_str(), content_hash)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_for(config: Option<String>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config,
            keep_going: false,
        }
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    fn demo_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            CONFIG_FILE,
            r#"
[project]
name = "demo"
files = ["src/main.c", "src/foo.c", "src/foo.h", "include/util.h"]
"#,
        );
        write(
            dir.path(),
            "src/main.c",
            "#include <stdio.h>\n#include \"foo.h\"\n#include \"../include/util.h\"\n",
        );
        write(dir.path(), "src/foo.c", "#include \"foo.h\"\n");
        write(dir.path(), "src/foo.h", "#pragma once\n");
        write(dir.path(), "include/util.h", "#pragma once\n");
        dir
    }

    #[test]
    fn find_project_root_walks_up() {
        let dir = demo_project();
        let nested = dir.path().join("src");
        assert_eq!(find_project_root(&nested).unwrap(), dir.path());
    }

    #[test]
    fn find_project_root_fails_without_config() {
        let dir = tempfile::tempdir().unwrap();
        // Only meaningful if no ancestor of the temp dir has a catalyze.toml.
        if let Err(e) = find_project_root(dir.path()) {
            assert!(e.to_string().contains(CONFIG_FILE));
        }
    }

    #[test]
    fn resolve_from_config_file_uses_parent() {
        let dir = demo_project();
        let config = dir.path().join(CONFIG_FILE);
        let global = global_for(Some(config.display().to_string()));
        assert_eq!(resolve_project_root(&global).unwrap(), dir.path());
    }

    #[test]
    fn resolve_from_config_dir_uses_it() {
        let dir = demo_project();
        let global = global_for(Some(dir.path().display().to_string()));
        assert_eq!(resolve_project_root(&global).unwrap(), dir.path());
    }

    #[test]
    fn build_populates_store() {
        let dir = demo_project();
        let global = global_for(Some(dir.path().display().to_string()));
        let mut ctx = BuildContext::open(&global).unwrap();
        ctx.build(false).unwrap();

        assert_eq!(ctx.store.len(), 4);
        assert_eq!(ctx.report.edges_added, 3);
        assert_eq!(ctx.report.system, 1);

        let main = ctx.store.get_path("src/main.c").unwrap();
        let deps: Vec<&str> = main
            .dependencies()
            .map(|id| ctx.store.node(id).path())
            .collect();
        assert_eq!(deps, ["src/foo.h", "include/util.h"]);

        // Every tracked file got its real fingerprint.
        for tracked in ctx.tracked_fingerprints() {
            assert!(!tracked.content_hash.is_unknown(), "{}", tracked.path);
        }
    }

    #[test]
    fn missing_file_is_fatal_without_keep_going() {
        let dir = demo_project();
        std::fs::remove_file(dir.path().join("src/foo.c")).unwrap();
        let global = global_for(Some(dir.path().display().to_string()));
        let mut ctx = BuildContext::open(&global).unwrap();
        let err = ctx.build(false).unwrap_err();
        assert!(err.to_string().contains("src/foo.c"));
    }

    #[test]
    fn missing_file_is_skipped_with_keep_going() {
        let dir = demo_project();
        std::fs::remove_file(dir.path().join("src/foo.c")).unwrap();
        let global = global_for(Some(dir.path().display().to_string()));
        let mut ctx = BuildContext::open(&global).unwrap();
        ctx.build(true).unwrap();

        assert_eq!(ctx.skipped_files, ["src/foo.c"]);
        let foo_c = ctx.store.get_path("src/foo.c").unwrap();
        assert!(foo_c.content_hash().is_unknown());
        assert_eq!(foo_c.dep_count(), 0);
    }

    /// Eight tracked files in a two-bucket store: the bucket array doubles
    /// twice while they are upserted, stranding earlier files from `lookup`.
    fn crowded_project() -> (tempfile::TempDir, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<String> = (0..8).map(|i| format!("f{i}.c")).collect();
        let list = files
            .iter()
            .map(|f| format!("\"{f}\""))
            .collect::<Vec<_>>()
            .join(", ");
        write(
            dir.path(),
            CONFIG_FILE,
            &format!("[project]\nname = \"crowded\"\nfiles = [{list}]\n\n[store]\ncapacity = 2\n"),
        );
        for f in &files {
            write(dir.path(), f, &format!("int {};\n", f.replace('.', "_")));
        }
        (dir, files)
    }

    #[test]
    fn tracked_fingerprints_survive_bucket_growth() {
        let (dir, files) = crowded_project();
        let global = global_for(Some(dir.path().display().to_string()));
        let mut ctx = BuildContext::open(&global).unwrap();
        ctx.build(false).unwrap();
        assert_eq!(ctx.store.len(), 8);
        assert!(ctx.store.capacity() > 2);

        let fresh = ctx.tracked_fingerprints();
        let paths: Vec<&str> = fresh.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, files.iter().map(String::as_str).collect::<Vec<_>>());
        for (tracked, source) in fresh.iter().zip(ctx.sources.files()) {
            assert_eq!(tracked.content_hash, source.fingerprint, "{}", tracked.path);
            assert!(!tracked.content_hash.is_unknown(), "{}", tracked.path);
        }

        // Every tracked file resolves to its own node, reachable by path or not.
        for f in &files {
            let id = ctx.node_for(f).unwrap();
            assert_eq!(ctx.store.node(id).path(), f);
        }
    }

    #[test]
    fn cache_round_trip_survives_bucket_growth() {
        let (dir, _) = crowded_project();
        let global = global_for(Some(dir.path().display().to_string()));

        let mut first = BuildContext::open(&global).unwrap();
        first.build(false).unwrap();
        let mut cache = catalyze_cache::Cache::load_or_create(&first.cache_path(), 8).unwrap();
        cache.save(&first.tracked_fingerprints()).unwrap();

        let mut second = BuildContext::open(&global).unwrap();
        second.build(false).unwrap();
        let cache = catalyze_cache::Cache::load_or_create(&second.cache_path(), 8).unwrap();
        let changes = cache.detect_changes(&second.tracked_fingerprints());
        assert_eq!(changes.unchanged_files.len(), 8, "{changes:?}");
        assert!(changes.is_empty());
    }

    #[test]
    fn cache_path_is_relative_to_root() {
        let dir = demo_project();
        let global = global_for(Some(dir.path().display().to_string()));
        let ctx = BuildContext::open(&global).unwrap();
        assert_eq!(ctx.cache_path(), dir.path().join("catalyze.cache"));
    }
}
