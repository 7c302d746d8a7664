//! # Identifier Renaming
//!
//! Source names that collide with target keywords, common target builtins,
//! or the runtime facade's own names are rewritten by appending a stable
//! `_js` suffix. Property names in member accesses are never renamed, and
//! double-underscore prefixes pass through untouched. The rewrite is
//! recorded per scope in the transform context's rename log.

use crate::transformer::py_ast::RUNTIME_NAMES;

/// Target-language keywords; assigning to these is a syntax error there
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Target builtins shadowing of which would break emitted helper calls
pub const PYTHON_BUILTINS: &[&str] = &[
    "abs", "all", "any", "bool", "bytes", "callable", "chr", "dict", "dir", "divmod",
    "enumerate", "filter", "float", "format", "getattr", "hasattr", "hash", "hex", "id",
    "input", "int", "isinstance", "issubclass", "iter", "len", "list", "map", "max", "min",
    "next", "object", "open", "ord", "pow", "print", "property", "range", "repr", "reversed",
    "round", "set", "setattr", "slice", "sorted", "str", "sum", "super", "tuple", "type",
    "vars", "zip",
];

/// Whether a source identifier must be rewritten in the output
pub fn needs_rename(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
        || PYTHON_BUILTINS.contains(&name)
        || RUNTIME_NAMES.contains(&name)
}

/// Applies the stable `_js` suffix when the name collides
pub fn rename(name: &str) -> String {
    if needs_rename(name) {
        format!("{name}_js")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_get_the_suffix() {
        assert_eq!(rename("class"), "class_js");
        assert_eq!(rename("lambda"), "lambda_js");
        assert_eq!(rename("None"), "None_js");
    }

    #[test]
    fn builtins_get_the_suffix() {
        assert_eq!(rename("print"), "print_js");
        assert_eq!(rename("str"), "str_js");
    }

    #[test]
    fn runtime_facade_names_get_the_suffix() {
        assert_eq!(rename("js_plus"), "js_plus_js");
        assert_eq!(rename("JSUndefined"), "JSUndefined_js");
    }

    #[test]
    fn ordinary_names_pass_through() {
        assert_eq!(rename("total"), "total");
        assert_eq!(rename("getValue"), "getValue");
    }

    #[test]
    fn double_underscore_prefixes_are_preserved() {
        assert_eq!(rename("__proto"), "__proto");
        assert_eq!(rename("__dict"), "__dict");
    }
}
