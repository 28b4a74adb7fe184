use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

pub const DEFAULT_MAX_NESTING: usize = 64;

/// Classes that exist in every PHP runtime, so a string naming one can be
/// emitted as a `::class` constant without loading any user code.
const PHP_BUILTIN_CLASSES: &[&str] = &[
    "stdClass",
    "ArrayObject",
    "ArrayIterator",
    "AppendIterator",
    "CachingIterator",
    "EmptyIterator",
    "InfiniteIterator",
    "LimitIterator",
    "NoRewindIterator",
    "SplDoublyLinkedList",
    "SplFixedArray",
    "SplHeap",
    "SplMaxHeap",
    "SplMinHeap",
    "SplObjectStorage",
    "SplPriorityQueue",
    "SplQueue",
    "SplStack",
    "SplFileInfo",
    "SplFileObject",
    "SplTempFileObject",
    "DateTime",
    "DateTimeImmutable",
    "DateTimeZone",
    "DateInterval",
    "DatePeriod",
    "Closure",
    "Generator",
    "WeakMap",
    "WeakReference",
    "Exception",
    "ErrorException",
    "Error",
    "TypeError",
    "ValueError",
    "ArithmeticError",
    "DivisionByZeroError",
    "ArgumentCountError",
    "JsonException",
    "LogicException",
    "BadFunctionCallException",
    "BadMethodCallException",
    "DomainException",
    "InvalidArgumentException",
    "LengthException",
    "OutOfRangeException",
    "RuntimeException",
    "OutOfBoundsException",
    "OverflowException",
    "RangeException",
    "UnderflowException",
    "UnexpectedValueException",
    "ReflectionClass",
    "ReflectionMethod",
    "ReflectionObject",
    "PDO",
];

/// Case-insensitive registry of class names that resolve in the target
/// runtime. Matching strings become `\Name::class`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownClasses {
    names: BTreeSet<String>,
}

impl KnownClasses {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn php_builtins() -> Self {
        let mut known = Self::empty();
        for name in PHP_BUILTIN_CLASSES {
            known.insert(name);
        }
        known
    }

    pub fn insert(&mut self, name: &str) {
        let normalized = normalize(name);
        if !normalized.is_empty() {
            self.names.insert(normalized);
        }
    }

    /// Reads one class name per line; blank lines and `#` comments are skipped.
    pub fn extend_from_list(&mut self, source: &str) {
        for line in source.lines() {
            let entry = line.split('#').next().unwrap_or_default().trim();
            if !entry.is_empty() {
                self.insert(entry);
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns `raw` when it is a registered class name written without a
    /// leading `\`. A leading `\` is part of the string value and `::class`
    /// would drop it.
    pub fn resolve<'a>(&self, raw: &'a str) -> Option<&'a str> {
        if !class_name_regex().is_match(raw) || !self.contains(raw) {
            return None;
        }
        Some(raw)
    }
}

fn normalize(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_prefix('\\')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

fn class_name_regex() -> &'static Regex {
    static CLASS_NAME: OnceLock<Regex> = OnceLock::new();
    CLASS_NAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\\[A-Za-z_][A-Za-z0-9_]*)*$")
            .expect("class name regex must compile")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub known_classes: KnownClasses,
    /// Deepest argument/collection nesting accepted before failing.
    pub max_nesting: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            known_classes: KnownClasses::php_builtins(),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn builtins_resolve_case_insensitively() {
        let known = KnownClasses::php_builtins();
        assert_eq!(known.resolve("stdClass"), Some("stdClass"));
        assert_eq!(known.resolve("STDCLASS"), Some("STDCLASS"));
        assert_eq!(known.resolve("App\\Mailer"), None);
    }

    #[test]
    fn leading_backslash_is_never_resolved() {
        let known = KnownClasses::php_builtins();
        assert!(known.contains("\\ArrayObject"));
        assert_eq!(known.resolve("\\ArrayObject"), None);
        assert_eq!(known.resolve("\\STDCLASS"), None);
    }

    #[test]
    fn resolve_requires_identifier_shape() {
        let mut known = KnownClasses::empty();
        known.insert("App\\Mailer");
        assert_eq!(known.resolve("App\\Mailer"), Some("App\\Mailer"));
        assert_eq!(known.resolve("App\\\\Mailer"), None);
        assert_eq!(known.resolve("App\\Mailer "), None);
        assert_eq!(known.resolve("1App"), None);
    }

    #[test]
    fn extend_from_list_skips_comments_and_blank_lines() {
        let mut known = KnownClasses::empty();
        known.extend_from_list("# project classes\nApp\\Mailer\n\n\\App\\Transport # legacy\n");
        assert_eq!(known.len(), 2);
        assert!(known.contains("app\\mailer"));
        assert!(known.contains("App\\Transport"));
    }

    #[test]
    fn default_options_use_builtins() {
        let options = TranslateOptions::default();
        assert_eq!(options.max_nesting, DEFAULT_MAX_NESTING);
        assert!(options.known_classes.contains("DateTimeImmutable"));
        assert!(KnownClasses::default().is_empty());
    }
}
