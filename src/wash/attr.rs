//! Attribution: type checking and name resolution in one walk
//!
//! Expression checking and expression typing are the same recursive call.
//! [`Attr::check_expr`] returns `None` only after it has reported an error for
//! that subexpression, and callers skip further checks on `None`, so one
//! mistake yields one diagnostic.

use crate::ast::*;
use crate::consts::{ENTRY_ARGS_TYPE, HIERARCHY_SEPARATOR};

use super::enter::{ClassTable, MethodLookup};
use super::error::{SemanticError, SemanticErrorKind};
use super::scope::{ScopeError, ScopeStack};

pub struct Attr<'a, 'ast> {
    classes: &'a ClassTable<'ast>,
    scopes: ScopeStack<'ast>,
    errors: Vec<SemanticError>,
    /// Class whose instance `this` denotes; `None` outside every class body
    current_class: Option<&'ast str>,
    /// Name of the entry class, which has no table entry and no callable methods
    entry_class: Option<&'ast str>,
}

impl<'a, 'ast> Attr<'a, 'ast> {
    pub fn new(classes: &'a ClassTable<'ast>) -> Self {
        Self {
            classes,
            scopes: ScopeStack::new(),
            errors: Vec::new(),
            current_class: None,
            entry_class: None,
        }
    }

    pub fn into_errors(self) -> Vec<SemanticError> {
        self.errors
    }

    fn report(&mut self, line: usize, kind: SemanticErrorKind) {
        log::trace!("attr: line {}: {}", line, kind);
        self.errors.push(SemanticError::new(line, kind));
    }

    fn declare(&mut self, ty: Type, ident: &'ast Identifier, init: Option<&'ast Expr>) {
        match self.scopes.declare(ty, ident, init) {
            Ok(()) => {}
            Err(ScopeError::Duplicate { name }) => {
                self.report(ident.line, SemanticErrorKind::DuplicateVariable { name })
            }
            Err(err @ ScopeError::NoActiveScope { .. }) => log::warn!("attr: {}", err),
        }
    }

    /// Report every never-read symbol of the innermost scope, then close it
    fn close_scope(&mut self) {
        let unused: Vec<(usize, String)> = self
            .scopes
            .current_scope_unused_symbols()
            .map(|symbol| (symbol.line(), symbol.name().to_string()))
            .collect();
        for (line, name) in unused {
            self.report(line, SemanticErrorKind::UnusedVariable { name });
        }
        self.scopes.pop();
    }

    fn check_class_hierarchy(&mut self, class: &'ast ClassDecl) {
        if let Some(parent) = &class.parent {
            if !self.classes.contains(parent.as_str()) {
                self.report(
                    parent.line,
                    SemanticErrorKind::ParentClassNotFound {
                        class: class.name.name.clone(),
                        parent: parent.name.clone(),
                    },
                );
            }
        }
        let registered = self
            .classes
            .get(class.name.as_str())
            .map_or(false, |c| std::ptr::eq(c, class));
        if registered {
            if let Some(cycle) = self.classes.inheritance_cycle(class.name.as_str()) {
                if cycle.first().map(String::as_str) == Some(class.name.as_str()) {
                    self.report(
                        class.line,
                        SemanticErrorKind::CyclicInheritance {
                            path: cycle.join(HIERARCHY_SEPARATOR),
                        },
                    );
                }
            }
        }
    }

    /// Type of `name`, marking its innermost declaration as read
    fn read_variable(&mut self, name: &str) -> Option<Type> {
        self.scopes.lookup_mut(name).map(|symbol| {
            symbol.used = true;
            symbol.ty.clone()
        })
    }

    fn expect_int(&mut self, expr: &'ast Expr, kind: impl FnOnce(Type) -> SemanticErrorKind) {
        if let Some(ty) = self.check_expr(expr) {
            if ty != Type::Int {
                self.report(expr.line(), kind(ty));
            }
        }
    }

    /// Check an expression and compute its static type
    pub fn check_expr(&mut self, expr: &'ast Expr) -> Option<Type> {
        match expr {
            Expr::IntLiteral(_) => Some(Type::Int),
            Expr::Identifier(id) => {
                let ty = self.read_variable(id.as_str());
                if ty.is_none() {
                    self.report(id.line, SemanticErrorKind::UndeclaredVariable { name: id.name.clone() });
                }
                ty
            }
            Expr::This(this) => match self.current_class {
                Some(class) => Some(Type::class(class)),
                None => {
                    self.report(this.line, SemanticErrorKind::ThisOutsideClass);
                    None
                }
            },
            Expr::NewArray(e) => {
                self.expect_int(&e.size, |found| SemanticErrorKind::ArraySizeNotInt { found });
                Some(Type::IntArray)
            }
            Expr::NewObject(e) => {
                if !self.classes.contains(e.class.as_str()) {
                    self.report(e.class.line, SemanticErrorKind::ClassNotFound { name: e.class.name.clone() });
                    return None;
                }
                Some(Type::class(e.class.as_str()))
            }
            Expr::ArrayLookup(e) => {
                if let Some(found) = self.check_expr(&e.array) {
                    if found != Type::IntArray {
                        self.report(e.array.line(), SemanticErrorKind::IndexedNonArray { found });
                    }
                }
                self.expect_int(&e.index, |found| SemanticErrorKind::ArrayIndexNotInt { found });
                Some(Type::Int)
            }
            Expr::ArrayLength(e) => {
                if let Some(found) = self.check_expr(&e.array) {
                    if found != Type::IntArray {
                        self.report(e.array.line(), SemanticErrorKind::LengthOfNonArray { found });
                    }
                }
                Some(Type::Int)
            }
            Expr::Binary(b) => self.check_binary(b),
            Expr::Call(call) => self.check_call(call),
        }
    }

    fn check_binary(&mut self, b: &'ast BinaryExpr) -> Option<Type> {
        let left = self.check_expr(&b.left);
        let right = self.check_expr(&b.right);

        if let (Some(left), Some(right)) = (left, right) {
            if b.operator.is_equality() {
                // Either side may be the subtype
                if !self.classes.is_subtype(&left, &right) && !self.classes.is_subtype(&right, &left) {
                    self.report(
                        b.line,
                        SemanticErrorKind::IncomparableOperands { op: b.operator, left, right },
                    );
                }
            } else if left != Type::Int || right != Type::Int {
                self.report(b.line, SemanticErrorKind::OperandMismatch { op: b.operator, left, right });
            }
        }

        if b.operator == BinaryOp::Div && b.right.is_zero_literal() {
            self.report(b.right.line(), SemanticErrorKind::DivisionByZero);
        }

        Some(Type::Int)
    }

    fn check_call(&mut self, call: &'ast CallExpr) -> Option<Type> {
        let receiver = self.check_expr(&call.receiver);
        let args: Vec<Option<Type>> = call.args.iter().map(|arg| self.check_expr(arg)).collect();

        let class_name = match receiver? {
            Type::Class(name) => name,
            found => {
                self.report(call.line, SemanticErrorKind::CallOnNonObject { found });
                return None;
            }
        };
        if self.entry_class == Some(class_name.as_str()) {
            self.report(
                call.method.line,
                SemanticErrorKind::MethodNotFound { method: call.method.name.clone(), path: class_name },
            );
            return None;
        }
        if !self.classes.contains(&class_name) {
            self.report(call.line, SemanticErrorKind::ClassNotFound { name: class_name });
            return None;
        }

        let method = match self.classes.find_method(&class_name, call.method.as_str()) {
            MethodLookup::Found { method, .. } => method,
            MethodLookup::NotFound { path } => {
                self.report(
                    call.method.line,
                    SemanticErrorKind::MethodNotFound {
                        method: call.method.name.clone(),
                        path: path.join(HIERARCHY_SEPARATOR),
                    },
                );
                return None;
            }
        };

        if args.len() != method.params.len() {
            self.report(
                call.line,
                SemanticErrorKind::ArgumentCount {
                    method: call.method.name.clone(),
                    expected: method.params.len(),
                    found: args.len(),
                },
            );
        } else {
            for (index, ((arg, found), param)) in call.args.iter().zip(args).zip(&method.params).enumerate() {
                let Some(found) = found else { continue };
                if !self.classes.is_subtype(&found, &param.ty) {
                    self.report(
                        arg.line(),
                        SemanticErrorKind::ArgumentType {
                            method: call.method.name.clone(),
                            index: index + 1,
                            expected: param.ty.clone(),
                            found,
                        },
                    );
                }
            }
        }

        Some(method.return_type.clone())
    }
}

impl<'a, 'ast> AstVisitor<'ast> for Attr<'a, 'ast> {
    type Output = ();

    fn visit_program(&mut self, program: &'ast Program) {
        for duplicate in self.classes.duplicates() {
            self.report(
                duplicate.name.line,
                SemanticErrorKind::DuplicateClass { name: duplicate.name.name.clone() },
            );
        }
        self.entry_class = Some(program.main.name.as_str());
        // The entry class never enters the table, so a clash with it is checked here
        for class in &program.classes {
            let registered = self
                .classes
                .get(class.name.as_str())
                .map_or(false, |c| std::ptr::eq(c, class));
            if registered && class.name.name == program.main.name.name {
                self.report(
                    class.name.line,
                    SemanticErrorKind::DuplicateClass { name: class.name.name.clone() },
                );
            }
        }
        self.visit_main_class(&program.main);
        for class in &program.classes {
            self.visit_class_decl(class);
        }
    }

    fn visit_main_class(&mut self, main: &'ast MainClass) {
        let saved_class = self.current_class.replace(main.name.as_str());
        self.scopes.push();

        self.declare(Type::class(ENTRY_ARGS_TYPE), &main.args, None);
        self.scopes.mark_used(main.args.as_str());
        for var in &main.vars {
            self.visit_var_decl(var);
        }
        for stmt in &main.body {
            self.visit_stmt(stmt);
        }

        self.close_scope();
        self.current_class = saved_class;
    }

    fn visit_class_decl(&mut self, class: &'ast ClassDecl) {
        self.check_class_hierarchy(class);

        let saved_class = self.current_class.replace(class.name.as_str());
        self.scopes.push();

        for field in &class.fields {
            self.visit_var_decl(field);
        }
        for method in &class.methods {
            self.visit_method_decl(method);
        }

        self.close_scope();
        self.current_class = saved_class;
    }

    fn visit_var_decl(&mut self, var: &'ast VarDecl) {
        if let Some(init) = &var.init {
            if let Some(found) = self.check_expr(init) {
                if !self.classes.is_subtype(&found, &var.ty) {
                    self.report(
                        init.line(),
                        SemanticErrorKind::InitializerMismatch {
                            name: var.name.name.clone(),
                            expected: var.ty.clone(),
                            found,
                        },
                    );
                }
            }
        }
        self.declare(var.ty.clone(), &var.name, var.init.as_ref());
    }

    fn visit_method_decl(&mut self, method: &'ast MethodDecl) {
        self.scopes.push();

        for param in &method.params {
            self.visit_param(param);
        }
        // Parameters are part of the signature and never reported as unused
        self.scopes.mark_all_used_in_current();

        for var in &method.vars {
            self.visit_var_decl(var);
        }
        for stmt in &method.body {
            self.visit_stmt(stmt);
        }

        if let Some(found) = self.check_expr(&method.return_expr) {
            if !self.classes.is_subtype(&found, &method.return_type) {
                self.report(
                    method.return_expr.line(),
                    SemanticErrorKind::ReturnMismatch {
                        method: method.name.name.clone(),
                        expected: method.return_type.clone(),
                        found,
                    },
                );
            }
        }

        self.close_scope();
    }

    fn visit_param(&mut self, param: &'ast Param) {
        self.declare(param.ty.clone(), &param.name, None);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Block(block) => {
                self.scopes.push();
                for s in &block.statements {
                    self.visit_stmt(s);
                }
                self.close_scope();
            }
            Stmt::If(s) => {
                self.expect_int(&s.condition, |found| SemanticErrorKind::ConditionNotInt { found });
                self.visit_stmt(&s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.visit_stmt(else_branch);
                }
            }
            Stmt::While(s) => {
                self.expect_int(&s.condition, |found| SemanticErrorKind::ConditionNotInt { found });
                self.visit_stmt(&s.body);
            }
            Stmt::Print(s) => {
                self.expect_int(&s.value, |found| SemanticErrorKind::PrintNotInt { found });
            }
            Stmt::Assign(s) => {
                // Writing a variable does not count as reading it
                let Some(expected) = self.scopes.lookup(s.target.as_str()).map(|symbol| symbol.ty.clone()) else {
                    self.report(
                        s.target.line,
                        SemanticErrorKind::UndeclaredVariable { name: s.target.name.clone() },
                    );
                    return;
                };
                if let Some(found) = self.check_expr(&s.value) {
                    if !self.classes.is_subtype(&found, &expected) {
                        self.report(
                            s.value.line(),
                            SemanticErrorKind::AssignMismatch {
                                name: s.target.name.clone(),
                                expected,
                                found,
                            },
                        );
                    }
                }
            }
            Stmt::ArrayAssign(s) => {
                // Storing into an element is a write, not a read
                match self.scopes.lookup(s.target.as_str()).map(|symbol| symbol.ty.clone()) {
                    Some(Type::IntArray) => {}
                    Some(_) => self.report(
                        s.target.line,
                        SemanticErrorKind::NotAnArray { name: s.target.name.clone() },
                    ),
                    None => self.report(
                        s.target.line,
                        SemanticErrorKind::UndeclaredVariable { name: s.target.name.clone() },
                    ),
                }
                self.expect_int(&s.index, |found| SemanticErrorKind::ArrayIndexNotInt { found });
                self.expect_int(&s.value, |found| SemanticErrorKind::ArrayElementNotInt { found });
            }
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        self.check_expr(expr);
    }
}
