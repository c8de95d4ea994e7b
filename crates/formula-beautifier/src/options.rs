//! Printer configuration

use ahash::AHashSet;

/// Functions printed one argument per line when called with more than one
/// argument: the logical, conditional-aggregation, lookup and dynamic-array
/// families.
pub const DEFAULT_MULTILINE_FUNCTIONS: &[&str] = &[
    // Logical
    "IF", "IFS", "AND", "OR", "NOT", "XOR", "SWITCH", "CHOOSE",
    // Conditional aggregation
    "SUMIF", "SUMIFS", "COUNTIF", "COUNTIFS", "AVERAGEIF", "AVERAGEIFS",
    // Lookup
    "VLOOKUP", "HLOOKUP", "XLOOKUP", "INDEX", "MATCH",
    // Dynamic arrays and names
    "LET", "LAMBDA", "FILTER", "SORT", "SORTBY",
];

/// Prefixes Excel writes in front of newer function names in stored formulas
const FUTURE_FUNCTION_PREFIXES: &[&str] = &["_xlfn._xlws.", "_xlfn.", "_xlws."];

/// Options controlling how a parsed formula is printed
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Indentation unit repeated once per nesting level (default: 4 spaces)
    pub indent: String,
    /// Single-line width past which any call with arguments is broken over
    /// several lines (default: 80)
    pub max_line_width: usize,
    /// Maximum nesting of groups, calls, arrays and prefix operators
    /// accepted by the parser (default: 64)
    pub max_depth: usize,
    /// Upper-cased names of the formatting-significant functions
    pub multiline_functions: AHashSet<String>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            max_line_width: 80,
            max_depth: 64,
            multiline_functions: DEFAULT_MULTILINE_FUNCTIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl FormatOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent with `size` spaces per level
    pub fn with_indent_size(self, size: usize) -> Self {
        self.with_indent(" ".repeat(size))
    }

    /// Indent with an arbitrary unit, e.g. `"\t"`
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_max_line_width(mut self, width: usize) -> Self {
        self.max_line_width = width;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Mark another function as formatting-significant
    pub fn with_multiline_function(mut self, name: &str) -> Self {
        self.multiline_functions.insert(name.to_uppercase());
        self
    }

    /// Stop treating a function as formatting-significant
    pub fn without_multiline_function(mut self, name: &str) -> Self {
        self.multiline_functions.remove(&name.to_uppercase());
        self
    }

    /// Whether calls to `name` prefer one argument per line.
    ///
    /// Matching ignores case and the `_xlfn.` / `_xlws.` prefixes.
    pub fn is_multiline_function(&self, name: &str) -> bool {
        let upper = name.to_uppercase();
        let bare = FUTURE_FUNCTION_PREFIXES
            .iter()
            .find_map(|prefix| upper.strip_prefix(prefix))
            .unwrap_or(&upper);
        self.multiline_functions.contains(bare)
    }

    /// Indentation string for the given nesting level
    pub fn indent_at(&self, level: usize) -> String {
        self.indent.repeat(level)
    }
}
