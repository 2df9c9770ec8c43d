//! Stylesheet inlining.
//!
//! Small stylesheets are cheaper to ship inside the rendered HTML than as a
//! separate request. Each stylesheet under the configured byte threshold gets
//! a numeric slot the first time any node reaches it, and its text is
//! rendered as `stylesheets/{slot}.js` so node modules can import it by slot.
//! Nothing is written here; the build writes the modules once every node
//! has resolved.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use kiln_graph::Runtime;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::js;
use crate::{Error, Result};

/// Asset path -> inline slot, in first-seen order.
///
/// Slots are dense and never reassigned, so the same traversal order always
/// produces the same table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineTable {
    slots: IndexMap<String, usize>,
}

impl InlineTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `path` if it is inlined, assigning the next slot when it is
    /// seen for the first time and `size < threshold`.
    pub fn consider(&mut self, path: &str, size: u64, threshold: u64) -> Option<usize> {
        if let Some(&slot) = self.slots.get(path) {
            return Some(slot);
        }
        if !Self::fits(size, threshold) {
            return None;
        }
        let slot = self.slots.len();
        self.slots.insert(path.to_string(), slot);
        Some(slot)
    }

    /// Whether a stylesheet of `size` bytes is small enough to inline.
    pub fn fits(size: u64, threshold: u64) -> bool {
        size < threshold
    }

    pub fn slot(&self, path: &str) -> Option<usize> {
        self.slots.get(path).copied()
    }

    /// Slot the next newly inlined stylesheet will get.
    pub fn next_slot(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.slots.iter().map(|(path, &slot)| (path.as_str(), slot))
    }
}

/// Output path of the module holding an inlined stylesheet.
pub fn stylesheet_module_path(slot: usize) -> String {
    format!("stylesheets/{slot}.js")
}

/// A rendered stylesheet module waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetModule {
    pub slot: usize,
    /// Asset path of the inlined stylesheet.
    pub path: String,
    pub contents: String,
}

impl StylesheetModule {
    fn new(slot: usize, path: &str, css: &str) -> Self {
        Self {
            slot,
            path: path.to_string(),
            contents: format!("// {path}\nexport default {};\n", js::string(css)),
        }
    }

    pub fn module_path(&self) -> String {
        stylesheet_module_path(self.slot)
    }
}

/// Decides which stylesheets are inlined for one build and renders their
/// modules.
///
/// Owns the build's [`InlineTable`]; callers pass it by `&mut` so slot
/// assignment stays sequential.
#[derive(Debug)]
pub struct StylesheetInliner {
    runtime: Arc<dyn Runtime>,
    /// Directory stylesheet asset paths are relative to.
    asset_root: PathBuf,
    threshold: u64,
    table: InlineTable,
    /// Stylesheets already measured and found too large.
    rejected: FxHashSet<String>,
    modules: Vec<StylesheetModule>,
}

impl StylesheetInliner {
    pub fn new(
        runtime: Arc<dyn Runtime>,
        asset_root: impl Into<PathBuf>,
        threshold: u64,
    ) -> Self {
        Self {
            runtime,
            asset_root: asset_root.into(),
            threshold,
            table: InlineTable::new(),
            rejected: FxHashSet::default(),
            modules: Vec::new(),
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn table(&self) -> &InlineTable {
        &self.table
    }

    /// Stylesheet modules rendered so far, in slot order.
    pub fn modules(&self) -> &[StylesheetModule] {
        &self.modules
    }

    pub fn into_parts(self) -> (InlineTable, Vec<StylesheetModule>) {
        (self.table, self.modules)
    }

    /// Inline `path` if it is small enough, returning its slot.
    ///
    /// The slot is only recorded once the stylesheet has been read, so a
    /// failed read leaves the table as it was.
    ///
    /// # Errors
    ///
    /// [`Error::AssetReadFailure`] if the stylesheet cannot be measured or
    /// read.
    pub fn inline(&mut self, path: &str) -> Result<Option<usize>> {
        if let Some(slot) = self.table.slot(path) {
            return Ok(Some(slot));
        }
        if self.threshold == 0 || self.rejected.contains(path) {
            return Ok(None);
        }

        let file = self.asset_root.join(path);
        let size = self
            .runtime
            .metadata(&file)
            .map_err(|source| Error::AssetReadFailure {
                path: path.to_string(),
                source,
            })?
            .size;

        if !InlineTable::fits(size, self.threshold) {
            debug!(path, size, threshold = self.threshold, "stylesheet not inlined");
            self.rejected.insert(path.to_string());
            return Ok(None);
        }

        let css = self
            .runtime
            .read_to_string(&file)
            .map_err(|source| Error::AssetReadFailure {
                path: path.to_string(),
                source,
            })?;

        let assigned = self.table.consider(path, size, self.threshold);
        if let Some(slot) = assigned {
            self.modules.push(StylesheetModule::new(slot, path, &css));
            debug!(path, size, slot, "inlined stylesheet");
        }
        Ok(assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_graph::TestRuntime;

    const THRESHOLD: u64 = 10;

    fn inliner(runtime: &Arc<TestRuntime>, threshold: u64) -> StylesheetInliner {
        StylesheetInliner::new(runtime.clone(), "/app/out/client", threshold)
    }

    #[test]
    fn test_threshold_boundary_is_strict() {
        let mut table = InlineTable::new();
        assert_eq!(table.consider("a.css", THRESHOLD - 1, THRESHOLD), Some(0));
        assert_eq!(table.consider("b.css", THRESHOLD, THRESHOLD), None);
        assert_eq!(table.consider("c.css", THRESHOLD + 1, THRESHOLD), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_zero_threshold_never_inlines() {
        let mut table = InlineTable::new();
        assert_eq!(table.consider("empty.css", 0, 0), None);
    }

    #[test]
    fn test_slots_are_stable() {
        let mut table = InlineTable::new();
        assert_eq!(table.consider("a.css", 1, THRESHOLD), Some(0));
        assert_eq!(table.consider("b.css", 1, THRESHOLD), Some(1));
        assert_eq!(table.consider("a.css", 1, THRESHOLD), Some(0));
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![("a.css", 0), ("b.css", 1)]
        );
    }

    #[test]
    fn test_inline_renders_module_without_writing() {
        let runtime = Arc::new(
            TestRuntime::new("/app")
                .with_file("out/client/assets/a.css", "p{color:red}")
                .with_file("out/client/assets/big.css", "x".repeat(64)),
        );
        let mut inliner = inliner(&runtime, 32);

        assert_eq!(inliner.inline("assets/a.css").unwrap(), Some(0));
        assert_eq!(inliner.inline("assets/big.css").unwrap(), None);
        assert_eq!(inliner.inline("assets/a.css").unwrap(), Some(0));

        assert_eq!(
            inliner.modules(),
            [StylesheetModule {
                slot: 0,
                path: "assets/a.css".to_string(),
                contents: "// assets/a.css\nexport default \"p{color:red}\";\n".to_string(),
            }]
        );
        assert_eq!(inliner.modules()[0].module_path(), "stylesheets/0.js");
        assert!(runtime.contents("/app/out/server/stylesheets/0.js").is_none());
    }

    #[test]
    fn test_inline_threshold_boundary_on_real_files() {
        let runtime = Arc::new(
            TestRuntime::new("/app")
                .with_file("out/client/under.css", "x".repeat(9))
                .with_file("out/client/exact.css", "x".repeat(10))
                .with_file("out/client/over.css", "x".repeat(11)),
        );
        let mut inliner = inliner(&runtime, THRESHOLD);

        assert_eq!(inliner.inline("under.css").unwrap(), Some(0));
        assert_eq!(inliner.inline("exact.css").unwrap(), None);
        assert_eq!(inliner.inline("over.css").unwrap(), None);

        assert_eq!(inliner.table().iter().collect::<Vec<_>>(), vec![("under.css", 0)]);
        assert_eq!(inliner.modules().len(), 1);
    }

    #[test]
    fn test_read_failure_leaves_table_untouched() {
        let runtime = Arc::new(
            TestRuntime::new("/app").with_file("out/client/assets/a.css", "a{}"),
        );
        let mut inliner = inliner(&runtime, 32);

        assert_eq!(inliner.inline("assets/a.css").unwrap(), Some(0));
        let err = inliner.inline("assets/missing.css").unwrap_err();

        assert!(matches!(
            err,
            Error::AssetReadFailure { ref path, .. } if path == "assets/missing.css"
        ));
        assert_eq!(inliner.table().len(), 1);
        assert_eq!(inliner.table().slot("assets/a.css"), Some(0));
        assert_eq!(inliner.table().next_slot(), 1);
    }

    #[test]
    fn test_disabled_inliner_does_not_touch_disk() {
        let runtime = Arc::new(TestRuntime::new("/app"));
        let mut inliner = inliner(&runtime, 0);

        assert_eq!(inliner.inline("assets/missing.css").unwrap(), None);
        assert!(inliner.table().is_empty());
    }
}
