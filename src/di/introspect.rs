//! Dependency-name introspection.
//!
//! A factory's explicit dependency list always wins. Without one, the names are
//! read from the parameter list in the factory's signature text. For
//! constructor-style factories that is the constructor's own parameter list.

use crate::di::{Factory, FactoryKind};

const CONSTRUCTOR_MARKERS: [&str; 2] = ["fn new", "constructor"];

/// Ordered dependency names of `factory`. Empty when nothing can be derived.
pub fn dependency_names(factory: &Factory) -> Vec<String> {
    if let Some(names) = factory.dependencies() {
        return names.to_vec();
    }
    let Some(signature) = factory.signature() else {
        return Vec::new();
    };
    match factory.kind() {
        FactoryKind::Function => parse_parameters(signature),
        FactoryKind::Constructor => constructor_parameters(signature),
        FactoryKind::Value => Vec::new(),
    }
}

/// Parameter names of the constructor found in `text`, or nothing when there is none.
pub fn constructor_parameters(text: &str) -> Vec<String> {
    let text = strip_comments(text);
    CONSTRUCTOR_MARKERS
        .iter()
        .filter_map(|marker| find_word(&text, marker))
        .min()
        .map(|start| parse_parameters(&text[start..]))
        .unwrap_or_default()
}

/// Parameter names of the first parameter list in `text`, in declaration order.
///
/// A single unparenthesized arrow parameter (`db => ...`) is its own list.
pub fn parse_parameters(text: &str) -> Vec<String> {
    let text = strip_comments(text);
    if let Some(name) = arrow_parameter(&text) {
        return vec![name];
    }
    let Some(list) = parameter_list(&text) else {
        return Vec::new();
    };
    split_parameters(list)
        .into_iter()
        .filter_map(parameter_name)
        .collect()
}

/// Walks parameter text, tracking string literals, bracket nesting and
/// whether the current position lies in a default expression.
///
/// `'` opens a string inside a default expression or right after `=`, `(`,
/// `[`, `{` or `?`. Anywhere else it starts a lifetime.
#[derive(Default)]
struct Scanner {
    quote: Option<char>,
    escaped: bool,
    depth: usize,
    angles: usize,
    default_depth: Option<usize>,
    prev: char,
}

impl Scanner {
    fn in_literal(&self) -> bool {
        self.quote.is_some()
    }

    fn in_default(&self) -> bool {
        self.default_depth.is_some()
    }

    /// Advance over `c`. Returns `false` when `c` belongs to a string literal.
    fn step(&mut self, c: char) -> bool {
        if let Some(q) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == q {
                self.quote = None;
                self.prev = c;
            }
            return false;
        }
        match c {
            '"' | '`' => {
                self.quote = Some(c);
                return false;
            }
            '\'' if self.in_default() || matches!(self.prev, '=' | '(' | '[' | '{' | '?') => {
                self.quote = Some(c);
                return false;
            }
            '(' | '[' | '{' => self.depth += 1,
            ')' | ']' | '}' => {
                self.depth = self.depth.saturating_sub(1);
                if self.default_depth.is_some_and(|d| self.depth < d) {
                    self.default_depth = None;
                }
            }
            // In a default expression `<` and `>` are comparisons.
            '<' if !self.in_default() => self.angles += 1,
            '>' if !self.in_default() && !matches!(self.prev, '-' | '=') => {
                self.angles = self.angles.saturating_sub(1);
            }
            '=' if !self.in_default()
                && self.angles == 0
                && !matches!(self.prev, '=' | '!' | '<' | '>') =>
            {
                self.default_depth = Some(self.depth);
            }
            ',' if self.default_depth == Some(self.depth) => self.default_depth = None,
            _ => {}
        }
        if !c.is_whitespace() {
            self.prev = c;
        }
        true
    }
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut scanner = Scanner::default();

    while let Some(c) = chars.next() {
        if !scanner.in_literal() {
            match (c, chars.peek()) {
                ('/', Some('*')) => {
                    chars.next();
                    let mut prev = '\0';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        prev = c;
                    }
                    out.push(' ');
                    continue;
                }
                ('/', Some('/')) => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                _ => {}
            }
        }
        scanner.step(c);
        out.push(c);
    }
    out
}

fn find_word(text: &str, word: &str) -> Option<usize> {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(word).map(|(i, _)| i).find(|&i| {
        let before = text[..i].chars().next_back();
        let after = text[i + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// The identifier before a `=>` that comes ahead of any `(`.
fn arrow_parameter(text: &str) -> Option<String> {
    let arrow = text.find("=>")?;
    if text.find('(').is_some_and(|open| open < arrow) {
        return None;
    }
    let head = text[..arrow].trim_end();
    let start = head
        .rfind(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .map_or(0, |i| i + 1);
    let name = &head[start..];
    (!name.is_empty()).then(|| name.to_string())
}

/// The text between the first `(` and its matching `)`.
fn parameter_list(text: &str) -> Option<&str> {
    let open = text.find('(')?;
    let mut scanner = Scanner::default();

    for (i, c) in text[open..].char_indices() {
        if scanner.step(c) && c == ')' && scanner.depth == 0 {
            return Some(&text[open + 1..open + i]);
        }
    }
    None
}

/// Split at commas that are not nested inside brackets, generics or strings.
fn split_parameters(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = 0;

    for (i, c) in list.char_indices() {
        let top_level = scanner.depth == 0 && scanner.angles == 0;
        if scanner.step(c) && c == ',' && top_level {
            parts.push(&list[start..i]);
            start = i + 1;
        }
    }
    parts.push(&list[start..]);
    parts
}

fn parameter_name(param: &str) -> Option<String> {
    let end = param.find([':', '=']).unwrap_or(param.len());
    let name = param[..end].trim();
    let name = name.strip_prefix("...").unwrap_or(name);
    let name = name.strip_prefix("mut ").unwrap_or(name).trim();

    if name.is_empty() || is_receiver(name) {
        return None;
    }
    Some(name.to_string())
}

fn is_receiver(name: &str) -> bool {
    name.trim_start_matches('&')
        .split_whitespace()
        .filter(|word| !word.starts_with('\'') && *word != "mut")
        .eq(["self"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::{Args, Construct, Produced};
    use crate::error::Result;

    #[test]
    fn test_plain_list() {
        assert_eq!(parse_parameters("function sync1(a, b) { return a + b; }"), [
            "a", "b"
        ]);
        assert_eq!(parse_parameters("fn service1(ref1: Entry) -> Svc"), ["ref1"]);
    }

    #[test]
    fn test_comments_and_whitespace() {
        let text = "fn f( /* the first */ a,\n   // second one\n  b /* trailing */ )";
        assert_eq!(parse_parameters(text), ["a", "b"]);
    }

    #[test]
    fn test_defaults_are_discarded() {
        let text = r#"function f(a = 1, b = "x, y", c = (1, 2), d = x < y)"#;
        assert_eq!(parse_parameters(text), ["a", "b", "c", "d"]);

        assert_eq!(parse_parameters("function f(a = 'x, y', b)"), ["a", "b"]);
        assert_eq!(parse_parameters("function f(a = ')', b)"), ["a", "b"]);
        assert_eq!(parse_parameters("function f(a = ['//', 'y'], b = '/* c */')"), [
            "a", "b"
        ]);
        assert_eq!(parse_parameters(r"function f(a = 'it\'s', b)"), ["a", "b"]);
    }

    #[test]
    fn test_lifetimes_are_not_strings() {
        let text = "fn f<'a>(x: &'a str, it: impl Iterator<Item = &'a u8>, y: u8)";
        assert_eq!(parse_parameters(text), ["x", "it", "y"]);
    }

    #[test]
    fn test_bare_arrow() {
        assert_eq!(parse_parameters("a => a"), ["a"]);
        assert_eq!(parse_parameters("db => connect(host, port)"), ["db"]);
        assert_eq!(parse_parameters("async db => db.query('x')"), ["db"]);
        assert_eq!(parse_parameters("(a, b) => connect(a)"), ["a", "b"]);
    }

    #[test]
    fn test_rust_types() {
        let text = "fn f(mut cache: HashMap<String, Vec<u8>>, cb: impl Fn(u8, u8) -> u8, done: bool)";
        assert_eq!(parse_parameters(text), ["cache", "cb", "done"]);
    }

    #[test]
    fn test_receivers_skipped() {
        assert_eq!(parse_parameters("fn f(&mut self, a: u8)"), ["a"]);
        assert_eq!(parse_parameters("fn f(&'a self)"), Vec::<String>::new());
        assert_eq!(parse_parameters("fn f(self_ref)"), ["self_ref"]);
    }

    #[test]
    fn test_no_list() {
        assert!(parse_parameters("fn broken(a, b").is_empty());
        assert!(parse_parameters("").is_empty());
        assert!(parse_parameters("fn f()").is_empty());
    }

    #[test]
    fn test_constructor_list() {
        let text = "impl Svc { fn describe(&self, verbose: bool) {} fn new(ref1: Entry, other) -> Self {} }";
        assert_eq!(constructor_parameters(text), ["ref1", "other"]);

        let js = "class ServiceClass { constructor(ref1) { this.ref1 = ref1; } f2() {} }";
        assert_eq!(constructor_parameters(js), ["ref1"]);

        assert!(constructor_parameters("struct Unit; fn newest(a)").is_empty());
        assert!(constructor_parameters("// fn new(a)\nstruct Unit;").is_empty());
    }

    struct WithSignature;

    impl Construct for WithSignature {
        fn signature() -> Option<&'static str> {
            Some("fn helper(x) {} fn new(first, second) {}")
        }

        fn construct(_args: &Args) -> Result<Self> {
            Ok(WithSignature)
        }
    }

    #[test]
    fn test_dependency_names() {
        let explicit = Factory::function("f", |_: &Args| None::<Produced>)
            .with_dependencies(["x"])
            .with_signature("fn f(a, b)");
        assert_eq!(dependency_names(&explicit), ["x"]);

        let from_text = Factory::function("f", |_: &Args| None::<Produced>).with_signature("fn f(a, b)");
        assert_eq!(dependency_names(&from_text), ["a", "b"]);

        let bare = Factory::function("f", |_: &Args| None::<Produced>);
        assert!(dependency_names(&bare).is_empty());

        let ctor = Factory::constructor::<WithSignature>();
        assert_eq!(dependency_names(&ctor), ["first", "second"]);
    }
}
