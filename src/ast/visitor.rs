use super::*;

/// AST visitor trait for traversing and processing AST nodes
///
/// The `'ast` lifetime lets a visitor keep references into the tree it walks,
/// which the scope-based passes rely on.
pub trait AstVisitor<'ast> {
    type Output;

    // Compilation unit
    fn visit_program(&mut self, program: &'ast Program) -> Self::Output;

    // Type declarations
    fn visit_main_class(&mut self, main: &'ast MainClass) -> Self::Output;
    fn visit_class_decl(&mut self, class: &'ast ClassDecl) -> Self::Output;

    // Class members
    fn visit_var_decl(&mut self, var: &'ast VarDecl) -> Self::Output;
    fn visit_method_decl(&mut self, method: &'ast MethodDecl) -> Self::Output;
    fn visit_param(&mut self, param: &'ast Param) -> Self::Output;

    // Statements and expressions
    fn visit_stmt(&mut self, stmt: &'ast Stmt) -> Self::Output;
    fn visit_expr(&mut self, expr: &'ast Expr) -> Self::Output;
}
