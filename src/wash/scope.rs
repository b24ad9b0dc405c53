//! Lexical scope stack
//!
//! Symbols borrow their declaring identifier and initializer from the tree
//! being walked, so a `ScopeStack<'ast>` lives for one traversal.

use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{Expr, Identifier, Type};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("'{name}' already declared in this scope")]
    Duplicate { name: String },
    #[error("no active scope to declare '{name}' in")]
    NoActiveScope { name: String },
}

#[derive(Debug, Clone)]
pub struct Symbol<'ast> {
    pub ty: Type,
    pub ident: &'ast Identifier,
    pub init: Option<&'ast Expr>,
    /// Read at least once
    pub used: bool,
    /// Declared with an initializer
    pub initialized: bool,
}

impl<'ast> Symbol<'ast> {
    pub fn name(&self) -> &'ast str {
        &self.ident.name
    }

    pub fn line(&self) -> usize {
        self.ident.line
    }
}

/// One lexical level; keeps declaration order
#[derive(Debug, Default)]
struct Scope<'ast> {
    symbols: Vec<Symbol<'ast>>,
    index: HashMap<String, usize>,
}

impl<'ast> Scope<'ast> {
    fn get(&self, name: &str) -> Option<&Symbol<'ast>> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Symbol<'ast>> {
        match self.index.get(name) {
            Some(&i) => self.symbols.get_mut(i),
            None => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScopeStack<'ast> {
    scopes: Vec<Scope<'ast>>,
}

impl<'ast> ScopeStack<'ast> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope; a no-op when none is open
    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declare `ident` in the innermost scope. Outer declarations may be shadowed.
    pub fn declare(
        &mut self,
        ty: Type,
        ident: &'ast Identifier,
        init: Option<&'ast Expr>,
    ) -> Result<(), ScopeError> {
        let scope = self.scopes.last_mut().ok_or_else(|| ScopeError::NoActiveScope {
            name: ident.name.clone(),
        })?;
        if scope.index.contains_key(&ident.name) {
            return Err(ScopeError::Duplicate { name: ident.name.clone() });
        }
        scope.index.insert(ident.name.clone(), scope.symbols.len());
        scope.symbols.push(Symbol {
            ty,
            ident,
            init,
            used: false,
            initialized: init.is_some(),
        });
        Ok(())
    }

    /// Innermost declaration of `name`
    pub fn lookup(&self, name: &str) -> Option<&Symbol<'ast>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol<'ast>> {
        self.scopes.iter_mut().rev().find_map(|scope| scope.get_mut(name))
    }

    /// Flag the innermost declaration of `name` as read; false if undeclared
    pub fn mark_used(&mut self, name: &str) -> bool {
        match self.lookup_mut(name) {
            Some(symbol) => {
                symbol.used = true;
                true
            }
            None => false,
        }
    }

    /// Mark every symbol of the innermost scope as read
    pub fn mark_all_used_in_current(&mut self) {
        if let Some(scope) = self.scopes.last_mut() {
            for symbol in &mut scope.symbols {
                symbol.used = true;
            }
        }
    }

    /// Never-read symbols of the innermost scope, in declaration order
    pub fn current_scope_unused_symbols(&self) -> impl Iterator<Item = &Symbol<'ast>> + '_ {
        self.scopes
            .last()
            .into_iter()
            .flat_map(|scope| scope.symbols.iter())
            .filter(|symbol| !symbol.used)
    }
}
