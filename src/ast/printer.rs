use super::nodes::*;
use super::visitor::AstVisitor;

/// Indented tree dump of a program, one node per line with its source line
pub struct AstPrinter {
    indent_level: usize,
    output: String,
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            output: String::new(),
        }
    }

    pub fn print(&mut self, program: &Program) -> String {
        self.output.clear();
        self.indent_level = 0;
        self.visit_program(program);
        std::mem::take(&mut self.output)
    }

    fn indent(&mut self) {
        self.indent_level += 2;
    }

    fn dedent(&mut self) {
        if self.indent_level >= 2 {
            self.indent_level -= 2;
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
    }

    fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn nested<F: FnOnce(&mut Self)>(&mut self, header: &str, body: F) {
        self.writeln(header);
        self.indent();
        body(self);
        self.dedent();
    }
}

impl<'ast> AstVisitor<'ast> for AstPrinter {
    type Output = ();

    fn visit_program(&mut self, program: &'ast Program) {
        self.nested("Program", |p| {
            p.visit_main_class(&program.main);
            for class in &program.classes {
                p.visit_class_decl(class);
            }
        });
    }

    fn visit_main_class(&mut self, main: &'ast MainClass) {
        let header = format!("MainClass {} (args: {}) @{}", main.name, main.args, main.line);
        self.nested(&header, |p| {
            for var in &main.vars {
                p.visit_var_decl(var);
            }
            for stmt in &main.body {
                p.visit_stmt(stmt);
            }
        });
    }

    fn visit_class_decl(&mut self, class: &'ast ClassDecl) {
        let header = match &class.parent {
            Some(parent) => format!("Class {} extends {} @{}", class.name, parent, class.line),
            None => format!("Class {} @{}", class.name, class.line),
        };
        self.nested(&header, |p| {
            for field in &class.fields {
                p.visit_var_decl(field);
            }
            for method in &class.methods {
                p.visit_method_decl(method);
            }
        });
    }

    fn visit_var_decl(&mut self, var: &'ast VarDecl) {
        let header = format!("Var {}: {} @{}", var.name, var.ty, var.line);
        match &var.init {
            Some(init) => self.nested(&header, |p| p.visit_expr(init)),
            None => self.writeln(&header),
        }
    }

    fn visit_method_decl(&mut self, method: &'ast MethodDecl) {
        let header = format!("Method {}: {} @{}", method.name, method.return_type, method.line);
        self.nested(&header, |p| {
            for param in &method.params {
                p.visit_param(param);
            }
            for var in &method.vars {
                p.visit_var_decl(var);
            }
            for stmt in &method.body {
                p.visit_stmt(stmt);
            }
            p.nested("Return", |p| p.visit_expr(&method.return_expr));
        });
    }

    fn visit_param(&mut self, param: &'ast Param) {
        self.writeln(&format!("Param {}: {} @{}", param.name, param.ty, param.line));
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Block(block) => self.nested(&format!("Block @{}", block.line), |p| {
                for s in &block.statements {
                    p.visit_stmt(s);
                }
            }),
            Stmt::If(s) => self.nested(&format!("If @{}", s.line), |p| {
                p.visit_expr(&s.condition);
                p.nested("Then", |p| p.visit_stmt(&s.then_branch));
                if let Some(else_branch) = &s.else_branch {
                    p.nested("Else", |p| p.visit_stmt(else_branch));
                }
            }),
            Stmt::While(s) => self.nested(&format!("While @{}", s.line), |p| {
                p.visit_expr(&s.condition);
                p.visit_stmt(&s.body);
            }),
            Stmt::Print(s) => self.nested(&format!("Print @{}", s.line), |p| p.visit_expr(&s.value)),
            Stmt::Assign(s) => self.nested(&format!("Assign {} @{}", s.target, s.line), |p| {
                p.visit_expr(&s.value)
            }),
            Stmt::ArrayAssign(s) => {
                self.nested(&format!("ArrayAssign {} @{}", s.target, s.line), |p| {
                    p.visit_expr(&s.index);
                    p.visit_expr(&s.value);
                })
            }
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match expr {
            Expr::Binary(b) => self.nested(&format!("Binary {} @{}", b.operator, b.line), |p| {
                p.visit_expr(&b.left);
                p.visit_expr(&b.right);
            }),
            Expr::ArrayLookup(e) => self.nested(&format!("ArrayLookup @{}", e.line), |p| {
                p.visit_expr(&e.array);
                p.visit_expr(&e.index);
            }),
            Expr::ArrayLength(e) => {
                self.nested(&format!("ArrayLength @{}", e.line), |p| p.visit_expr(&e.array))
            }
            Expr::Call(call) => self.nested(&format!("Call {} @{}", call.method, call.line), |p| {
                p.visit_expr(&call.receiver);
                for arg in &call.args {
                    p.visit_expr(arg);
                }
            }),
            Expr::IntLiteral(lit) => self.writeln(&format!("Int {} @{}", lit.value, lit.line)),
            Expr::Identifier(id) => self.writeln(&format!("Identifier {} @{}", id, id.line)),
            Expr::This(e) => self.writeln(&format!("This @{}", e.line)),
            Expr::NewArray(e) => {
                self.nested(&format!("NewArray @{}", e.line), |p| p.visit_expr(&e.size))
            }
            Expr::NewObject(e) => self.writeln(&format!("NewObject {} @{}", e.class, e.line)),
        }
    }
}
