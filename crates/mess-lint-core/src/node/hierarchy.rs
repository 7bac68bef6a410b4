//! Ancestor chain resolution.

use std::collections::{HashSet, VecDeque};
use tracing::trace;

use crate::ast::{lookup_key, Codebase, TypeDecl, TypeKind};

use super::{MethodNode, TypeNode};

/// Walks superclasses, interfaces, and traits of a type.
///
/// Names that don't resolve in the [`Codebase`] (library types outside the
/// analyzed tree) are skipped. Every ancestor is visited at most once, keyed
/// by its fully qualified name, so diamonds and cyclic `extends` clauses
/// still produce a finite chain.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyResolver<'a> {
    codebase: &'a Codebase,
}

impl<'a> HierarchyResolver<'a> {
    /// Creates a resolver over a codebase.
    #[must_use]
    pub fn new(codebase: &'a Codebase) -> Self {
        Self { codebase }
    }

    /// Returns the type itself, then its superclass chain nearest first,
    /// then implemented and extended interfaces, then composed traits.
    #[must_use]
    pub fn ancestor_chain(&self, ty: &TypeNode<'a>) -> Vec<TypeNode<'a>> {
        let root = ty.as_raw();
        let mut visited = HashSet::new();
        visited.insert(lookup_key(&root.qualified_name()));

        let mut lineage = vec![root];
        if root.kind == TypeKind::Class {
            let mut current = root;
            while let Some(parent) = current.extends.first() {
                let Some(decl) = self.resolve(parent, &mut visited) else {
                    break;
                };
                lineage.push(decl);
                current = decl;
            }
        }

        let interface_seeds = lineage.iter().copied().flat_map(|decl| match decl.kind {
            TypeKind::Class => decl.implements.iter(),
            TypeKind::Interface => decl.extends.iter(),
            TypeKind::Trait => std::slice::Iter::default(),
        });
        let interfaces = self.breadth_first(interface_seeds, &mut visited, |decl| &decl.extends);

        let trait_seeds = lineage.iter().copied().flat_map(|decl| decl.traits.iter());
        let traits = self.breadth_first(trait_seeds, &mut visited, |decl| &decl.traits);

        lineage
            .into_iter()
            .chain(interfaces)
            .chain(traits)
            .map(|decl| TypeNode::new(decl, self.codebase))
            .collect()
    }

    /// Names referenced by the type or its resolved ancestors (as `extends`,
    /// `implements` or `use`) that aren't declared in the codebase, sorted
    /// and deduplicated by lookup key.
    #[must_use]
    pub fn unresolved_ancestors(&self, ty: &TypeNode<'a>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut missing: Vec<String> = self
            .ancestor_chain(ty)
            .iter()
            .flat_map(|ancestor| {
                let decl = ancestor.as_raw();
                decl.extends.iter().chain(&decl.implements).chain(&decl.traits)
            })
            .filter(|name| self.codebase.get(name).is_none())
            .filter(|name| seen.insert(lookup_key(name)))
            .map(|name| name.trim_start_matches('\\').to_string())
            .collect();
        missing.sort();
        missing
    }

    /// Finds the method on `ancestor` with the same (case-insensitive) name as `member`.
    #[must_use]
    pub fn corresponding_ancestor_member(
        &self,
        member: &MethodNode<'a>,
        ancestor: &TypeNode<'a>,
    ) -> Option<MethodNode<'a>> {
        let decl = ancestor.as_raw();
        decl.find_method(member.name())
            .map(|m| MethodNode::new(m, decl, self.codebase))
    }

    fn breadth_first<'n>(
        &self,
        seeds: impl Iterator<Item = &'n String>,
        visited: &mut HashSet<String>,
        next: impl Fn(&'a TypeDecl) -> &'a Vec<String>,
    ) -> Vec<&'a TypeDecl> {
        let mut queue: VecDeque<String> = seeds.cloned().collect();
        let mut found = Vec::new();
        while let Some(name) = queue.pop_front() {
            if let Some(decl) = self.resolve(&name, visited) {
                queue.extend(next(decl).iter().cloned());
                found.push(decl);
            }
        }
        found
    }

    fn resolve(&self, name: &str, visited: &mut HashSet<String>) -> Option<&'a TypeDecl> {
        let key = lookup_key(name);
        if visited.contains(&key) {
            trace!("Already visited {name}");
            return None;
        }
        let decl = self.codebase.get(name);
        if decl.is_none() {
            trace!("Unresolved ancestor {name}");
        }
        visited.insert(key);
        decl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::MethodDecl;

    fn names(chain: &[TypeNode<'_>]) -> Vec<String> {
        chain
            .iter()
            .map(|t| t.fully_qualified_name().to_string())
            .collect()
    }

    #[test]
    fn chain_orders_superclasses_then_interfaces_then_traits() {
        let codebase = Codebase::from_types([
            TypeDecl::class("App", "Child")
                .extends("App\\Base")
                .implements("App\\Runs")
                .uses("App\\Logs"),
            TypeDecl::class("App", "Base").extends("App\\Root").implements("App\\Named"),
            TypeDecl::class("App", "Root"),
            TypeDecl::interface("App", "Runs").extends("App\\Named"),
            TypeDecl::interface("App", "Named"),
            TypeDecl::trait_decl("App", "Logs").uses("App\\Formats"),
            TypeDecl::trait_decl("App", "Formats"),
        ]);
        let child = TypeNode::new(codebase.get("App\\Child").expect("declared"), &codebase);
        let chain = HierarchyResolver::new(&codebase).ancestor_chain(&child);

        assert_eq!(
            names(&chain),
            vec![
                "App\\Child",
                "App\\Base",
                "App\\Root",
                "App\\Runs",
                "App\\Named",
                "App\\Logs",
                "App\\Formats",
            ]
        );
    }

    #[test]
    fn diamond_interfaces_are_visited_once() {
        let codebase = Codebase::from_types([
            TypeDecl::interface("", "Top"),
            TypeDecl::interface("", "Left").extends("Top"),
            TypeDecl::interface("", "Right").extends("Top"),
            TypeDecl::class("", "Impl").implements("Left").implements("Right"),
        ]);
        let ty = TypeNode::new(codebase.get("Impl").expect("declared"), &codebase);
        let chain = HierarchyResolver::new(&codebase).ancestor_chain(&ty);
        assert_eq!(names(&chain), vec!["Impl", "Left", "Right", "Top"]);
    }

    #[test]
    fn cyclic_extends_terminates() {
        let codebase = Codebase::from_types([
            TypeDecl::class("", "A").extends("B"),
            TypeDecl::class("", "B").extends("C"),
            TypeDecl::class("", "C").extends("a"),
            TypeDecl::interface("", "I").extends("J"),
            TypeDecl::interface("", "J").extends("I"),
        ]);
        let resolver = HierarchyResolver::new(&codebase);

        let a = TypeNode::new(codebase.get("A").expect("declared"), &codebase);
        assert_eq!(names(&resolver.ancestor_chain(&a)), vec!["A", "B", "C"]);

        let i = TypeNode::new(codebase.get("I").expect("declared"), &codebase);
        assert_eq!(names(&resolver.ancestor_chain(&i)), vec!["I", "J"]);
    }

    #[test]
    fn self_referencing_trait_terminates() {
        let codebase = Codebase::from_types([
            TypeDecl::trait_decl("", "T").uses("T"),
            TypeDecl::class("", "K").uses("T"),
        ]);
        let k = TypeNode::new(codebase.get("K").expect("declared"), &codebase);
        assert_eq!(
            names(&HierarchyResolver::new(&codebase).ancestor_chain(&k)),
            vec!["K", "T"]
        );
    }

    #[test]
    fn unresolved_ancestors_are_skipped() {
        let codebase = Codebase::from_types([TypeDecl::class("", "Widget")
            .extends("Vendor\\Base")
            .implements("Countable")]);
        let ty = TypeNode::new(codebase.get("Widget").expect("declared"), &codebase);
        assert_eq!(
            names(&HierarchyResolver::new(&codebase).ancestor_chain(&ty)),
            vec!["Widget"]
        );
    }

    #[test]
    fn unresolved_names_are_reported_across_the_chain() {
        let codebase = Codebase::from_types([
            TypeDecl::class("App", "Base").implements("\\Countable"),
            TypeDecl::class("App", "Widget")
                .extends("App\\Base")
                .implements("Vendor\\Renders")
                .uses("Vendor\\Logs"),
        ]);
        let ty = TypeNode::new(codebase.get("App\\Widget").expect("declared"), &codebase);
        assert_eq!(
            HierarchyResolver::new(&codebase).unresolved_ancestors(&ty),
            vec!["Countable", "Vendor\\Logs", "Vendor\\Renders"]
        );
    }

    #[test]
    fn corresponding_member_matches_name_case_insensitively() {
        let codebase = Codebase::from_types([
            TypeDecl::interface("", "Runs").method(MethodDecl::new("run").signature_only()),
            TypeDecl::class("", "Job")
                .implements("Runs")
                .method(MethodDecl::new("Run")),
        ]);
        let resolver = HierarchyResolver::new(&codebase);
        let job = TypeNode::new(codebase.get("Job").expect("declared"), &codebase);
        let runs = TypeNode::new(codebase.get("Runs").expect("declared"), &codebase);
        let method = job.methods().into_iter().next().expect("one method");

        let found = resolver
            .corresponding_ancestor_member(&method, &runs)
            .expect("interface declares run");
        assert_eq!(found.fully_qualified_name(), "Runs::run()");
        assert!(matches!(found.parent_type(), TypeNode::Interface(_)));
    }
}
