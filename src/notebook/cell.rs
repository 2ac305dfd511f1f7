//! Notebook cell model and the cell URI scheme.
//!
//! A cell is the editable unit the user sees; its compiled text is what the
//! debug adapter actually executes. The `notebook-cell` URI scheme encodes the
//! notebook path plus a cell id fragment, so a cell identity survives renames
//! of the dump file and stays meaningful to the editing surface.

use std::sync::atomic::{AtomicBool, Ordering};

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// URI scheme identifying editable notebook cells.
pub const CELL_URI_SCHEME: &str = "notebook-cell";

/// An editable notebook cell together with its compiled text.
#[derive(Debug)]
pub struct NotebookCell {
    uri: Url,
    notebook: String,
    ordinal: Option<usize>,
    language: String,
    compiled_text: String,
    live: AtomicBool,
}

impl NotebookCell {
    pub fn new(
        uri: Url,
        notebook: impl Into<String>,
        ordinal: Option<usize>,
        language: impl Into<String>,
        compiled_text: impl Into<String>,
    ) -> Self {
        Self {
            uri,
            notebook: notebook.into(),
            ordinal,
            language: language.into(),
            compiled_text: compiled_text.into(),
            live: AtomicBool::new(true),
        }
    }

    /// Canonical user-facing identity of this cell.
    pub fn identity(&self) -> &Url {
        &self.uri
    }

    /// Display name of the containing notebook.
    pub fn notebook(&self) -> &str {
        &self.notebook
    }

    /// Zero-based position within the notebook, when known.
    pub fn ordinal(&self) -> Option<usize> {
        self.ordinal
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn compiled_text(&self) -> &str {
        &self.compiled_text
    }

    /// Whether the cell still exists in the editing surface. Dead cells keep
    /// their registry entry so stale debugger references are suppressed
    /// rather than misattributed.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn close(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Human-readable label for the editor, e.g. `sales.ipynb, Cell 3`.
    /// The ordinal is rendered 1-based; cells without a known position fall
    /// back to the bare notebook name.
    pub fn display_name(&self) -> String {
        match self.ordinal {
            Some(ordinal) => format!("{}, Cell {}", self.notebook, ordinal + 1),
            None => self.notebook.clone(),
        }
    }

    /// File extension for this cell's dump, derived from the language so the
    /// debug adapter recognizes the file type.
    pub(crate) fn dump_extension(&self) -> &'static str {
        language_to_extension(&self.language)
    }
}

/// Build the canonical cell URI for `cell_id` inside `notebook`.
///
/// Format: `notebook-cell://{host}{notebook_path}#{cell_id}`. The cell id is
/// percent-encoded; notebook URIs that cannot carry a path (cannot-be-a-base
/// forms like `untitled:...`) yield `None`.
pub fn cell_uri(notebook: &Url, cell_id: &str) -> Option<Url> {
    if notebook.cannot_be_a_base() {
        return None;
    }
    let encoded = utf8_percent_encode(cell_id, NON_ALPHANUMERIC);
    let raw = format!(
        "{CELL_URI_SCHEME}://{}{}#{encoded}",
        notebook.host_str().unwrap_or(""),
        notebook.path(),
    );
    Url::parse(&raw).ok()
}

/// Check whether a raw path string is a cell URI.
///
/// Anything that fails to parse, or parses under another scheme, is not ours;
/// callers forward such paths unmodified.
pub fn is_cell_uri(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| url.scheme() == CELL_URI_SCHEME)
}

/// Map a cell language to its dump file extension.
///
/// Returns "txt" for unknown languages as a safe fallback.
fn language_to_extension(language: &str) -> &'static str {
    match language {
        "python" => "py",
        "julia" => "jl",
        "r" => "r",
        "rust" => "rs",
        "javascript" => "js",
        "typescript" => "ts",
        "sql" => "sql",
        "bash" | "sh" => "sh",
        "powershell" => "ps1",
        _ => "txt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notebook_url() -> Url {
        Url::parse("file:///work/sales.ipynb").unwrap()
    }

    fn cell(ordinal: Option<usize>) -> NotebookCell {
        NotebookCell::new(
            cell_uri(&notebook_url(), "cell-1").unwrap(),
            "sales.ipynb",
            ordinal,
            "python",
            "x = 1\n",
        )
    }

    #[test]
    fn cell_uri_carries_scheme_path_and_fragment() {
        let uri = cell_uri(&notebook_url(), "cell-abc").unwrap();
        assert_eq!(uri.scheme(), CELL_URI_SCHEME);
        assert_eq!(uri.path(), "/work/sales.ipynb");
        assert_eq!(uri.fragment(), Some("cell%2Dabc"));
    }

    #[test]
    fn cell_uri_percent_encodes_the_cell_id() {
        let uri = cell_uri(&notebook_url(), "cell/0?x").unwrap();
        let raw = uri.to_string();
        assert!(
            raw.ends_with("#cell%2F0%3Fx"),
            "special characters must be encoded: {raw}"
        );
    }

    #[test]
    fn cell_uri_rejects_cannot_be_a_base_notebooks() {
        let untitled = Url::parse("untitled:Untitled-1").unwrap();
        assert!(cell_uri(&untitled, "cell-1").is_none());
    }

    #[test]
    fn is_cell_uri_detects_own_scheme_only() {
        let uri = cell_uri(&notebook_url(), "cell-1").unwrap();
        assert!(is_cell_uri(uri.as_str()));
        assert!(!is_cell_uri("file:///work/sales.ipynb"));
        assert!(!is_cell_uri("not a uri"));
        assert!(!is_cell_uri(""));
    }

    #[test]
    fn display_name_renders_one_based_ordinal() {
        assert_eq!(cell(Some(2)).display_name(), "sales.ipynb, Cell 3");
    }

    #[test]
    fn display_name_without_ordinal_is_the_notebook_name() {
        assert_eq!(cell(None).display_name(), "sales.ipynb");
    }

    #[test]
    fn close_marks_the_cell_dead() {
        let cell = cell(Some(0));
        assert!(cell.is_live());
        cell.close();
        assert!(!cell.is_live());
    }

    #[test]
    fn dump_extension_follows_language() {
        assert_eq!(cell(Some(0)).dump_extension(), "py");
        let unknown = NotebookCell::new(
            cell_uri(&notebook_url(), "cell-2").unwrap(),
            "sales.ipynb",
            None,
            "mystery",
            "",
        );
        assert_eq!(unknown.dump_extension(), "txt");
    }
}
