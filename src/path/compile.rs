use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Bare keys in dot notation; anything else must be bracket-quoted.
static BARE_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").unwrap()
});

/// One navigation step of a compiled path expression.
///
/// `Key` and `Index` are the definite forms. The remaining variants are
/// recognized so that `is_definite` can reject them at bind time; the
/// evaluator never executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member access, key folded to lowercase at compile time
    Key(String),
    /// Array element access
    Index(usize),
    /// `.*` or `[*]`
    Wildcard,
    /// `..`
    RecursiveDescent,
    /// `['a','b']` or `[0,1]`
    Union,
    /// `[0:2]`
    Slice,
    /// `[?(...)]`
    Filter,
}

/// A path expression rejected by the compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid path expression '{path}': {reason}")]
pub struct PathError {
    pub path: String,
    pub reason: String,
}

impl PathError {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        PathError {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// A pre-parsed path expression bound to a column at setup time.
///
/// Key segments are matched case-insensitively: `compile` folds path
/// keys to lowercase and the extractor folds document keys the same
/// way before evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    raw: String,
    segments: Vec<Segment>,
}

impl CompiledPath {
    /// Compile a raw expression into a segment list.
    ///
    /// The grammar is the subset of JSONPath sufficient to address one
    /// leaf: `$`, `.key`, `['key']`, `["key"]` and `[0]`. Indefinite
    /// forms parse successfully and are caught by `is_definite`.
    pub fn compile(raw: &str) -> Result<CompiledPath, PathError> {
        let expr = raw.trim();
        let mut chars = expr.chars().peekable();

        match chars.next() {
            Some('$') => {}
            _ => return Err(PathError::new(raw, "expression must start with '$'")),
        }

        let mut segments = Vec::new();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if chars.peek() == Some(&'.') {
                        chars.next();
                        segments.push(Segment::RecursiveDescent);
                        // a bracket selector may follow directly ("$..[0]")
                        if chars.peek() == Some(&'[') || chars.peek().is_none() {
                            continue;
                        }
                    }
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        segments.push(Segment::Wildcard);
                        continue;
                    }
                    let mut key = String::new();
                    while let Some(&n) = chars.peek() {
                        if n == '.' || n == '[' {
                            break;
                        }
                        key.push(n);
                        chars.next();
                    }
                    if key.is_empty() {
                        return Err(PathError::new(raw, "empty key after '.'"));
                    }
                    if !BARE_KEY_REGEX.is_match(&key) {
                        return Err(PathError::new(
                            raw,
                            format!("key '{}' must be bracket-quoted", key),
                        ));
                    }
                    segments.push(Segment::Key(key.to_ascii_lowercase()));
                }
                '[' => {
                    let mut content = String::new();
                    let mut quote: Option<char> = None;
                    let mut closed = false;
                    for n in chars.by_ref() {
                        match quote {
                            Some(q) if n == q => quote = None,
                            None if n == '\'' || n == '"' => quote = Some(n),
                            None if n == ']' => {
                                closed = true;
                                break;
                            }
                            _ => {}
                        }
                        content.push(n);
                    }
                    if !closed || quote.is_some() {
                        return Err(PathError::new(raw, "unterminated bracket selector"));
                    }
                    segments.push(parse_bracket(raw, content.trim())?);
                }
                _ => {
                    return Err(PathError::new(
                        raw,
                        format!("unexpected character '{}'", c),
                    ));
                }
            }
        }

        Ok(CompiledPath {
            raw: expr.to_string(),
            segments,
        })
    }

    /// The expression text this path was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True iff this path matches at most one node in any document.
    pub fn is_definite(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Key(_) | Segment::Index(_)))
    }
}

/// Classify the content of one `[...]` selector.
fn parse_bracket(raw: &str, content: &str) -> Result<Segment, PathError> {
    if content.is_empty() {
        return Err(PathError::new(raw, "empty bracket selector"));
    }
    if content == "*" {
        return Ok(Segment::Wildcard);
    }
    if content.starts_with('?') {
        return Ok(Segment::Filter);
    }
    if let Some(first) = content.chars().next() {
        if first == '\'' || first == '"' {
            if content.len() >= 2 && content.ends_with(first) {
                let inner = &content[1..content.len() - 1];
                if inner.contains(first) {
                    // a second quote inside means a multi-key union
                    return Ok(Segment::Union);
                }
                if inner.is_empty() {
                    return Err(PathError::new(raw, "empty quoted key"));
                }
                return Ok(Segment::Key(inner.to_ascii_lowercase()));
            }
            return Err(PathError::new(raw, "unterminated quoted key"));
        }
    }
    if content.contains(',') {
        return Ok(Segment::Union);
    }
    if content.contains(':') {
        return Ok(Segment::Slice);
    }
    content
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| PathError::new(raw, format!("invalid array index '{}'", content)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_navigation() {
        let path = CompiledPath::compile("$.user.name").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("user".to_string()),
                Segment::Key("name".to_string())
            ]
        );
        assert!(path.is_definite());
    }

    #[test]
    fn test_bracket_key_allows_dots() {
        let path = CompiledPath::compile("$['param.keywords']").unwrap();
        assert_eq!(
            path.segments(),
            &[Segment::Key("param.keywords".to_string())]
        );
        assert!(path.is_definite());
    }

    #[test]
    fn test_array_index() {
        let path = CompiledPath::compile("$.items[2].id").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("items".to_string()),
                Segment::Index(2),
                Segment::Key("id".to_string())
            ]
        );
    }

    #[test]
    fn test_keys_fold_to_lowercase() {
        let path = CompiledPath::compile("$.UserName['Inner.Key']").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("username".to_string()),
                Segment::Key("inner.key".to_string())
            ]
        );
    }

    #[test]
    fn test_root_only() {
        let path = CompiledPath::compile("$").unwrap();
        assert!(path.segments().is_empty());
        assert!(path.is_definite());
    }

    #[test]
    fn test_indefinite_forms() {
        for expr in ["$.a.*", "$.a[*]", "$..a", "$.a[?(@.b > 1)]", "$.a[0,1]", "$.a[0:2]"] {
            let path = CompiledPath::compile(expr).unwrap();
            assert!(!path.is_definite(), "{} should be indefinite", expr);
        }
    }

    #[test]
    fn test_quoted_union_is_indefinite() {
        let path = CompiledPath::compile("$['a','b']").unwrap();
        assert!(!path.is_definite());
    }

    #[test]
    fn test_invalid_expressions() {
        for expr in ["user.name", "$.", "$.a.", "$['unterminated", "$.a[", "$.a[x]", "$.a[''],", "$ .a"] {
            assert!(
                CompiledPath::compile(expr).is_err(),
                "{} should fail to compile",
                expr
            );
        }
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let path = CompiledPath::compile("  $.id  ").unwrap();
        assert_eq!(path.raw(), "$.id");
    }
}
