//! Dead-variable elimination
//!
//! A second, independent walk with its own scope stack. Whenever the entry
//! routine, a class or a method scope closes, declarations that were never
//! read are scheduled for removal. Once the walk is over the owning lists are
//! rebuilt with only the survivors. Assignments to a removed variable are left
//! alone; attribution reports such variables as unused, so code generation
//! never runs on them.
//!
//! What counts as a read matches attribution: every identifier appearing in an
//! expression, and the target of an element store. A plain assignment target
//! is not a read. Parameters are always considered read.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::ast::*;
use crate::consts::{ENTRY_ARGS_TYPE, ENTRY_METHOD};

use super::scope::ScopeStack;

/// Declaration list a removal applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclOwner {
    /// Locals of the entry routine
    Main,
    /// Fields of the class at this index
    Fields(usize),
    /// Locals of method `.1` of class `.0`
    Locals(usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedVariable {
    /// Where the declaration lived, e.g. `Fac.ComputeFac`
    pub scope: String,
    pub name: String,
    pub ty: Type,
    pub line: usize,
}

impl fmt::Display for RemovedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} in {} (line {})", self.ty, self.name, self.scope, self.line)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizationReport {
    pub removed: Vec<RemovedVariable>,
}

impl OptimizationReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    pub fn removed_names(&self) -> Vec<&str> {
        self.removed.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Removes declarations whose value is never read
#[derive(Debug, Default)]
pub struct DeadVarOptimizer;

impl DeadVarOptimizer {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, program: &mut Program) -> OptimizationReport {
        let (plan, removed) = {
            let mut walker = UsageWalker::default();
            walker.visit_program(&*program);
            (walker.plan, walker.removed)
        };

        let mut removals: HashMap<DeclOwner, HashSet<usize>> = HashMap::new();
        for (owner, index) in plan {
            removals.entry(owner).or_default().insert(index);
        }
        for (owner, indices) in &removals {
            let list = match *owner {
                DeclOwner::Main => Some(&mut program.main.vars),
                DeclOwner::Fields(c) => program.classes.get_mut(c).map(|class| &mut class.fields),
                DeclOwner::Locals(c, m) => program
                    .classes
                    .get_mut(c)
                    .and_then(|class| class.methods.get_mut(m))
                    .map(|method| &mut method.vars),
            };
            if let Some(list) = list {
                retain_survivors(list, indices);
            }
        }

        for variable in &removed {
            log::info!("optimizer: removed unused variable {}", variable);
        }
        log::debug!("optimizer complete: {} declaration(s) removed", removed.len());
        OptimizationReport { removed }
    }
}

/// Rebuild `list` without the entries at `removed`
fn retain_survivors(list: &mut Vec<VarDecl>, removed: &HashSet<usize>) {
    let old = std::mem::take(list);
    *list = old
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !removed.contains(index))
        .map(|(_, var)| var)
        .collect();
}

#[derive(Default)]
struct UsageWalker<'ast> {
    scopes: ScopeStack<'ast>,
    plan: Vec<(DeclOwner, usize)>,
    removed: Vec<RemovedVariable>,
    class_index: usize,
    method_index: usize,
    class_name: String,
    scope_name: String,
}

impl<'ast> UsageWalker<'ast> {
    fn declare(&mut self, ty: Type, ident: &'ast Identifier, init: Option<&'ast Expr>) {
        // A duplicate keeps the first declaration; attribution reports it
        let _ = self.scopes.declare(ty, ident, init);
    }

    /// Schedule the unread entries of `vars`, then close the scope
    fn close_scope(&mut self, owner: DeclOwner, vars: &'ast [VarDecl]) {
        let unused: HashSet<&str> = self.scopes.current_scope_unused_symbols().map(|s| s.name()).collect();
        for (index, var) in vars.iter().enumerate() {
            if unused.contains(var.name.as_str()) {
                self.plan.push((owner, index));
                self.removed.push(RemovedVariable {
                    scope: self.scope_name.clone(),
                    name: var.name.name.clone(),
                    ty: var.ty.clone(),
                    line: var.line,
                });
            }
        }
        self.scopes.pop();
    }
}

impl<'ast> AstVisitor<'ast> for UsageWalker<'ast> {
    type Output = ();

    fn visit_program(&mut self, program: &'ast Program) {
        self.visit_main_class(&program.main);
        for (index, class) in program.classes.iter().enumerate() {
            self.class_index = index;
            self.visit_class_decl(class);
        }
    }

    fn visit_main_class(&mut self, main: &'ast MainClass) {
        self.scopes.push();
        self.declare(Type::class(ENTRY_ARGS_TYPE), &main.args, None);
        self.scopes.mark_used(main.args.as_str());
        for var in &main.vars {
            self.visit_var_decl(var);
        }
        for stmt in &main.body {
            self.visit_stmt(stmt);
        }
        self.scope_name = format!("{}.{}", main.name, ENTRY_METHOD);
        self.close_scope(DeclOwner::Main, &main.vars);
    }

    fn visit_class_decl(&mut self, class: &'ast ClassDecl) {
        self.class_name = class.name.name.clone();
        self.scopes.push();
        for field in &class.fields {
            self.visit_var_decl(field);
        }
        for (index, method) in class.methods.iter().enumerate() {
            self.method_index = index;
            self.visit_method_decl(method);
        }
        self.scope_name = class.name.name.clone();
        self.close_scope(DeclOwner::Fields(self.class_index), &class.fields);
    }

    fn visit_var_decl(&mut self, var: &'ast VarDecl) {
        if let Some(init) = &var.init {
            self.visit_expr(init);
        }
        self.declare(var.ty.clone(), &var.name, var.init.as_ref());
    }

    fn visit_method_decl(&mut self, method: &'ast MethodDecl) {
        self.scopes.push();
        for param in &method.params {
            self.visit_param(param);
        }
        self.scopes.mark_all_used_in_current();
        for var in &method.vars {
            self.visit_var_decl(var);
        }
        for stmt in &method.body {
            self.visit_stmt(stmt);
        }
        self.visit_expr(&method.return_expr);

        self.scope_name = format!("{}.{}", self.class_name, method.name);
        self.close_scope(DeclOwner::Locals(self.class_index, self.method_index), &method.vars);
    }

    fn visit_param(&mut self, param: &'ast Param) {
        self.declare(param.ty.clone(), &param.name, None);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Block(block) => {
                for s in &block.statements {
                    self.visit_stmt(s);
                }
            }
            Stmt::If(s) => {
                self.visit_expr(&s.condition);
                self.visit_stmt(&s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            Stmt::While(s) => {
                self.visit_expr(&s.condition);
                self.visit_stmt(&s.body);
            }
            Stmt::Print(s) => self.visit_expr(&s.value),
            Stmt::Assign(s) => self.visit_expr(&s.value),
            Stmt::ArrayAssign(s) => {
                self.scopes.mark_used(s.target.as_str());
                self.visit_expr(&s.index);
                self.visit_expr(&s.value);
            }
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match expr {
            Expr::Identifier(id) => {
                self.scopes.mark_used(id.as_str());
            }
            Expr::Binary(b) => {
                self.visit_expr(&b.left);
                self.visit_expr(&b.right);
            }
            Expr::ArrayLookup(e) => {
                self.visit_expr(&e.array);
                self.visit_expr(&e.index);
            }
            Expr::ArrayLength(e) => self.visit_expr(&e.array),
            Expr::Call(call) => {
                self.visit_expr(&call.receiver);
                for arg in &call.args {
                    self.visit_expr(arg);
                }
            }
            Expr::NewArray(e) => self.visit_expr(&e.size),
            Expr::IntLiteral(_) | Expr::This(_) | Expr::NewObject(_) => {}
        }
    }
}
