//! Per-document prefix declarations.

use crate::vocab;

/// A declared prefix: short name, namespace IRI and declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixBinding {
    /// Short name without the trailing colon (empty for `:`).
    pub name: String,
    /// Namespace IRI.
    pub namespace: String,
    /// 1-based line of the declaration.
    pub line: usize,
}

/// Prefixes declared by one document, in declaration order.
///
/// Redeclaring a name replaces its namespace from that point on, as Turtle
/// allows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    bindings: Vec<PrefixBinding>,
}

impl PrefixTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a declaration.
    pub fn declare(&mut self, name: impl Into<String>, namespace: impl Into<String>, line: usize) {
        let name = name.into();
        let namespace = namespace.into();
        match self.bindings.iter_mut().find(|b| b.name == name) {
            Some(binding) => {
                binding.namespace = namespace;
                binding.line = line;
            }
            None => self.bindings.push(PrefixBinding {
                name,
                namespace,
                line,
            }),
        }
    }

    /// Returns the namespace bound to `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.namespace.as_str())
    }

    /// Returns true if `name` has been declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Iterates `(name, namespace)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|b| (b.name.as_str(), b.namespace.as_str()))
    }

    /// All bindings with their declaration lines.
    #[must_use]
    pub fn bindings(&self) -> &[PrefixBinding] {
        &self.bindings
    }

    /// Number of declared prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns true if `iri` lies inside one of the declared namespaces.
    #[must_use]
    pub fn covers(&self, iri: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| !b.namespace.is_empty() && iri.starts_with(&b.namespace))
    }

    /// Shortens `iri` to `prefix:local` using the longest matching namespace,
    /// falling back to the implied `rdf`/`rdfs`/`owl`/`xsd` prefixes.
    #[must_use]
    pub fn compact(&self, iri: &str) -> Option<String> {
        let declared = self.iter();
        let implied = vocab::IMPLIED_PREFIXES
            .iter()
            .filter(|(name, _)| !self.contains(name))
            .map(|(name, ns)| (*name, *ns));
        declared
            .chain(implied)
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns))
            .max_by_key(|(_, ns)| ns.len())
            .and_then(|(name, ns)| {
                let local = &iri[ns.len()..];
                is_plain_local(local).then(|| format!("{name}:{local}"))
            })
    }
}

/// Local names that can be written without escapes.
fn is_plain_local(local: &str) -> bool {
    !local.ends_with('.')
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_replaces_namespace() {
        let mut table = PrefixTable::new();
        table.declare("ex", "http://a.example/", 1);
        table.declare("ex", "http://b.example/", 4);
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("ex"), Some("http://b.example/"));
        assert_eq!(table.bindings()[0].line, 4);
    }

    #[test]
    fn compact_prefers_longest_namespace() {
        let mut table = PrefixTable::new();
        table.declare("ex", "http://example.org/", 1);
        table.declare("ant", "http://example.org/antigone#", 2);
        assert_eq!(
            table.compact("http://example.org/antigone#Creon").as_deref(),
            Some("ant:Creon")
        );
        assert_eq!(
            table.compact(vocab::RDF_TYPE).as_deref(),
            Some("rdf:type")
        );
        assert_eq!(table.compact("urn:isbn:123"), None);
    }

    #[test]
    fn covers_checks_namespace_prefix() {
        let mut table = PrefixTable::new();
        table.declare("", "http://example.org/antigone#", 1);
        assert!(table.covers("http://example.org/antigone#Haemon"));
        assert!(!table.covers("http://example.org/antigon#Haemon"));
    }
}
