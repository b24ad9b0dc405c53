//! Class table: every non-entry class by name
//!
//! Built in one forward pass before anything is checked, so a class may refer
//! to classes declared after it. The first declaration of a name wins; later
//! ones are kept aside for diagnostics. Every walk up an `extends` chain
//! carries a visited set, so cyclic hierarchies terminate.

use std::collections::{HashMap, HashSet};

use crate::ast::{ClassDecl, MethodDecl, Program, Type, VarDecl};

/// Outcome of a method lookup along an inheritance chain
#[derive(Debug, Clone)]
pub enum MethodLookup<'ast> {
    Found {
        method: &'ast MethodDecl,
        owner: &'ast ClassDecl,
    },
    /// Class names visited, starting at the receiver class
    NotFound { path: Vec<String> },
}

#[derive(Debug, Default)]
pub struct ClassTable<'ast> {
    classes: HashMap<&'ast str, &'ast ClassDecl>,
    order: Vec<&'ast ClassDecl>,
    duplicates: Vec<&'ast ClassDecl>,
}

impl<'ast> ClassTable<'ast> {
    pub fn build(program: &'ast Program) -> Self {
        let mut table = Self::default();
        for class in &program.classes {
            if table.classes.contains_key(class.name.as_str()) {
                log::debug!("class table: duplicate '{}' at line {}", class.name, class.line);
                table.duplicates.push(class);
                continue;
            }
            table.classes.insert(class.name.as_str(), class);
            table.order.push(class);
        }
        log::debug!("class table: {} classes", table.classes.len());
        table
    }

    pub fn get(&self, name: &str) -> Option<&'ast ClassDecl> {
        self.classes.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Registered classes in declaration order
    pub fn classes(&self) -> impl Iterator<Item = &'ast ClassDecl> + '_ {
        self.order.iter().copied()
    }

    /// Declarations that lost to an earlier class of the same name
    pub fn duplicates(&self) -> &[&'ast ClassDecl] {
        &self.duplicates
    }

    /// `name` followed by its registered ancestors, stopping at an unknown
    /// parent or at the first repeated class
    pub fn ancestry(&self, name: &str) -> Vec<&'ast ClassDecl> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.get(name);
        while let Some(class) = current {
            if !visited.insert(class.name.as_str()) {
                break;
            }
            chain.push(class);
            current = class.parent.as_ref().and_then(|p| self.get(p.as_str()));
        }
        chain
    }

    /// Names on the cycle reachable from `name`, closed by the repeated class
    pub fn inheritance_cycle(&self, name: &str) -> Option<Vec<String>> {
        let mut path: Vec<&str> = Vec::new();
        let mut current = self.get(name);
        while let Some(class) = current {
            let class_name = class.name.as_str();
            if let Some(start) = path.iter().position(|n| *n == class_name) {
                let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(class_name.to_string());
                return Some(cycle);
            }
            path.push(class_name);
            current = class.parent.as_ref().and_then(|p| self.get(p.as_str()));
        }
        None
    }

    pub fn find_method(&self, class: &str, method: &str) -> MethodLookup<'ast> {
        let chain = self.ancestry(class);
        for owner in chain.iter().copied() {
            if let Some(found) = owner.method(method) {
                return MethodLookup::Found { method: found, owner };
            }
        }
        let mut path: Vec<String> = chain.iter().map(|c| c.name.name.clone()).collect();
        if path.is_empty() {
            path.push(class.to_string());
        }
        MethodLookup::NotFound { path }
    }

    pub fn find_field(&self, class: &str, field: &str) -> Option<(&'ast VarDecl, &'ast ClassDecl)> {
        self.ancestry(class)
            .into_iter()
            .find_map(|owner| owner.field(field).map(|f| (f, owner)))
    }

    /// Whether `sub` is `sup` or inherits from it
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        self.ancestry(sub).iter().any(|c| c.name.as_str() == sup)
    }

    /// Whether a value of type `from` may be stored where `to` is expected
    pub fn is_subtype(&self, from: &Type, to: &Type) -> bool {
        match (from, to) {
            (Type::Int, Type::Int) | (Type::IntArray, Type::IntArray) => true,
            (Type::Class(sub), Type::Class(sup)) => self.is_subclass(sub, sup),
            _ => false,
        }
    }
}
