//! Variable resolution for `@NAME@` placeholders.
//!
//! A [`Registry`] is an ordered list of resolvers built once per run. The first resolver
//! whose key fits the requested name answers for it, even when the answer is "unset".
//! Besides plain values, three built-in resolvers rewrite names:
//!
//! * `PROJECT_*` reflects the placeholder back, so it survives into the output;
//! * `QUOTABLE_NAME` escapes `\` and `"` in `NAME` when its resolver allows quoting;
//! * `QUOTED_NAME` wraps `QUOTABLE_NAME` in double quotes.
//!
//! Each built-in forwards to a single fixed successor with a strictly shorter name
//! (`QUOTED_` to `QUOTABLE_` to the bare name), so resolution always terminates.

use crate::constants::{MARKER, QUOTABLE_PREFIX, QUOTED_PREFIX, REFLECT_PREFIX};
use chrono::{Datelike, Local};
use indexmap::IndexMap;

/// What a resolver does once its key matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverKind {
    /// Constant value.
    Value(String),
    /// Returns the requested placeholder unchanged, markers included.
    Reflect,
    /// Resolves the name without the key and escapes the result.
    Quotable,
    /// Resolves `QUOTABLE_` + the name without the key and quotes the result.
    Quoted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    pub key: String,
    pub is_prefix: bool,
    pub is_quotable: bool,
    pub kind: ResolverKind,
}

impl Resolver {
    /// Plain value resolver for exactly `key`.
    pub fn value<K: Into<String>, V: Into<String>>(key: K, value: V, is_quotable: bool) -> Self {
        Self { key: key.into(), is_prefix: false, is_quotable, kind: ResolverKind::Value(value.into()) }
    }

    pub fn reflect<K: Into<String>>(prefix: K) -> Self {
        Self { key: prefix.into(), is_prefix: true, is_quotable: false, kind: ResolverKind::Reflect }
    }

    pub fn quotable() -> Self {
        Self {
            key: QUOTABLE_PREFIX.to_string(),
            is_prefix: true,
            is_quotable: false,
            kind: ResolverKind::Quotable,
        }
    }

    pub fn quoted() -> Self {
        Self {
            key: QUOTED_PREFIX.to_string(),
            is_prefix: true,
            is_quotable: false,
            kind: ResolverKind::Quoted,
        }
    }

    fn accepts(&self, name: &str) -> bool {
        if self.is_prefix {
            name.starts_with(self.key.as_str())
        } else {
            name == self.key
        }
    }

    fn resolve(&self, name: &str, registry: &Registry) -> Option<String> {
        match &self.kind {
            ResolverKind::Value(value) => Some(value.clone()),
            ResolverKind::Reflect => {
                let marker = char::from(MARKER);
                Some(format!("{marker}{name}{marker}"))
            }
            ResolverKind::Quotable => {
                let (value, resolver) = registry.resolve_with_provenance(self.strip(name));
                match resolver {
                    Some(resolver) if resolver.is_quotable => value.map(|value| quote_string(&value)),
                    _ => value,
                }
            }
            ResolverKind::Quoted => {
                let quotable = format!("{QUOTABLE_PREFIX}{}", self.strip(name));
                registry.resolve(&quotable).map(|value| format!("\"{value}\""))
            }
        }
    }

    fn strip<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.key.as_str()).unwrap_or(name)
    }
}

/// Escapes backslashes and double quotes for use inside a double-quoted string.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted
}

/// Ordered, read-only set of resolvers.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    resolvers: Vec<Resolver>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the quoting resolvers and reflecting `PROJECT_` plus `reflect`.
    pub fn with_builtins<S: AsRef<str>>(reflect: &[S]) -> Self {
        let mut registry = Self::new();
        registry.add(Resolver::quotable());
        registry.add(Resolver::quoted());
        registry.add(Resolver::reflect(REFLECT_PREFIX));
        for prefix in reflect {
            if prefix.as_ref() != REFLECT_PREFIX {
                registry.add(Resolver::reflect(prefix.as_ref()));
            }
        }
        registry
    }

    /// Appends a resolver; earlier resolvers shadow later ones.
    pub fn add(&mut self, resolver: Resolver) {
        self.resolvers.push(resolver);
    }

    /// Resolves `name`, also returning the resolver that answered.
    pub fn resolve_with_provenance(&self, name: &str) -> (Option<String>, Option<&Resolver>) {
        match self.resolvers.iter().find(|resolver| resolver.accepts(name)) {
            Some(resolver) => (resolver.resolve(name, self), Some(resolver)),
            None => (None, None),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<String> {
        self.resolve_with_provenance(name).0
    }
}

/// Registry for one run: the built-ins, `YEAR`, then each variable that has a value.
///
/// Supplied variables are quotable; `YEAR` is not.
pub fn create_registry<S: AsRef<str>>(vars: &IndexMap<String, Option<String>>, reflect: &[S]) -> Registry {
    let mut registry = Registry::with_builtins(reflect);
    registry.add(Resolver::value("YEAR", Local::now().year().to_string(), false));
    for (key, value) in vars {
        if let Some(value) = value {
            registry.add(Resolver::value(key.as_str(), value.as_str(), true));
        }
    }
    registry
}
