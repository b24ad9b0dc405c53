use super::{AstNode, AstVisitor, Identifier};
use std::fmt;

/// Static type of a MiniJ value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    IntArray,
    /// Reference to a class by simple name
    Class(String),
}

impl Type {
    pub fn class(name: impl Into<String>) -> Self {
        Type::Class(name.into())
    }

    /// Whether values of this type live in reference slots
    pub fn is_reference(&self) -> bool {
        !matches!(self, Type::Int)
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::IntArray => write!(f, "int[]"),
            Type::Class(name) => write!(f, "{}", name),
        }
    }
}

/// Root of a compilation unit: the entry class followed by the other classes
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub main: MainClass,
    pub classes: Vec<ClassDecl>,
}

/// Class holding the static entry routine
#[derive(Debug, Clone, PartialEq)]
pub struct MainClass {
    pub name: Identifier,
    /// Name of the `String[]` parameter of `main`
    pub args: Identifier,
    pub vars: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Identifier,
    pub parent: Option<Identifier>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
    pub line: usize,
}

impl ClassDecl {
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&VarDecl> {
        self.fields.iter().find(|f| f.name.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub return_type: Type,
    pub name: Identifier,
    pub params: Vec<Param>,
    pub vars: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    pub return_expr: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Type,
    pub name: Identifier,
    pub line: usize,
}

/// Field or local declaration, optionally with an initializer
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ty: Type,
    pub name: Identifier,
    pub init: Option<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(BlockStmt),
    If(IfStmt),
    While(WhileStmt),
    Print(PrintStmt),
    Assign(AssignStmt),
    ArrayAssign(ArrayAssignStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub value: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Identifier,
    pub value: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAssignStmt {
    pub target: Identifier,
    pub index: Expr,
    pub value: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary(BinaryExpr),
    ArrayLookup(ArrayLookupExpr),
    ArrayLength(ArrayLengthExpr),
    Call(CallExpr),
    IntLiteral(IntLiteral),
    Identifier(Identifier),
    This(ThisExpr),
    NewArray(NewArrayExpr),
    NewObject(NewObjectExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Lt,
    Gt,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// `==` and `!=`, which accept any pair of identical types
    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Gt)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLookupExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLengthExpr {
    pub array: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub receiver: Box<Expr>,
    pub method: Identifier,
    pub args: Vec<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub value: i32,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpr {
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArrayExpr {
    pub size: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewObjectExpr {
    pub class: Identifier,
    pub line: usize,
}

impl Expr {
    /// Literal zero, the only divisor rejected statically
    pub fn is_zero_literal(&self) -> bool {
        matches!(self, Expr::IntLiteral(IntLiteral { value: 0, .. }))
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expr::Identifier(id) => Some(id),
            _ => None,
        }
    }
}

impl AstNode for Program {
    fn line(&self) -> usize {
        self.main.line
    }

    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output {
        visitor.visit_program(self)
    }
}

impl AstNode for MainClass {
    fn line(&self) -> usize {
        self.line
    }

    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output {
        visitor.visit_main_class(self)
    }
}

impl AstNode for ClassDecl {
    fn line(&self) -> usize {
        self.line
    }

    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output {
        visitor.visit_class_decl(self)
    }
}

impl AstNode for MethodDecl {
    fn line(&self) -> usize {
        self.line
    }

    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output {
        visitor.visit_method_decl(self)
    }
}

impl AstNode for VarDecl {
    fn line(&self) -> usize {
        self.line
    }

    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output {
        visitor.visit_var_decl(self)
    }
}

impl AstNode for Param {
    fn line(&self) -> usize {
        self.line
    }

    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output {
        visitor.visit_param(self)
    }
}

impl AstNode for Stmt {
    fn line(&self) -> usize {
        match self {
            Stmt::Block(s) => s.line,
            Stmt::If(s) => s.line,
            Stmt::While(s) => s.line,
            Stmt::Print(s) => s.line,
            Stmt::Assign(s) => s.line,
            Stmt::ArrayAssign(s) => s.line,
        }
    }

    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output {
        visitor.visit_stmt(self)
    }
}

impl AstNode for Expr {
    fn line(&self) -> usize {
        match self {
            Expr::Binary(e) => e.line,
            Expr::ArrayLookup(e) => e.line,
            Expr::ArrayLength(e) => e.line,
            Expr::Call(e) => e.line,
            Expr::IntLiteral(e) => e.line,
            Expr::Identifier(id) => id.line,
            Expr::This(e) => e.line,
            Expr::NewArray(e) => e.line,
            Expr::NewObject(e) => e.line,
        }
    }

    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output {
        visitor.visit_expr(self)
    }
}

// Source echo. Nested binary operands are parenthesized so the output
// reparses to the same tree.

const INDENT: &str = "    ";

fn pad(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::Block(block) => {
            pad(f, depth)?;
            writeln!(f, "{{")?;
            for s in &block.statements {
                write_stmt(f, s, depth + 1)?;
            }
            pad(f, depth)?;
            writeln!(f, "}}")
        }
        Stmt::If(s) => {
            pad(f, depth)?;
            writeln!(f, "if ({})", s.condition)?;
            write_stmt(f, &s.then_branch, depth + 1)?;
            if let Some(else_branch) = &s.else_branch {
                pad(f, depth)?;
                writeln!(f, "else")?;
                write_stmt(f, else_branch, depth + 1)?;
            }
            Ok(())
        }
        Stmt::While(s) => {
            pad(f, depth)?;
            writeln!(f, "while ({})", s.condition)?;
            write_stmt(f, &s.body, depth + 1)
        }
        Stmt::Print(s) => {
            pad(f, depth)?;
            writeln!(f, "System.out.println({});", s.value)
        }
        Stmt::Assign(s) => {
            pad(f, depth)?;
            writeln!(f, "{} = {};", s.target, s.value)
        }
        Stmt::ArrayAssign(s) => {
            pad(f, depth)?;
            writeln!(f, "{}[{}] = {};", s.target, s.index, s.value)
        }
    }
}

fn write_var(f: &mut fmt::Formatter<'_>, var: &VarDecl, depth: usize) -> fmt::Result {
    pad(f, depth)?;
    writeln!(f, "{}", var)
}

impl fmt::Display for VarDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.init {
            Some(init) => write!(f, "{} {} = {};", self.ty, self.name, init),
            None => write!(f, "{} {};", self.ty, self.name),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary(b) => {
                write_operand(f, &b.left)?;
                write!(f, " {} ", b.operator)?;
                write_operand(f, &b.right)
            }
            Expr::ArrayLookup(e) => {
                write_operand(f, &e.array)?;
                write!(f, "[{}]", e.index)
            }
            Expr::ArrayLength(e) => {
                write_operand(f, &e.array)?;
                write!(f, ".length")
            }
            Expr::Call(call) => {
                write_operand(f, &call.receiver)?;
                write!(f, ".{}(", call.method)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::IntLiteral(lit) => write!(f, "{}", lit.value),
            Expr::Identifier(id) => write!(f, "{}", id),
            Expr::This(_) => write!(f, "this"),
            Expr::NewArray(e) => write!(f, "new int[{}]", e.size),
            Expr::NewObject(e) => write!(f, "new {}()", e.class),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if matches!(expr, Expr::Binary(_)) {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_method(f, self, 0)
    }
}

fn write_method(f: &mut fmt::Formatter<'_>, method: &MethodDecl, depth: usize) -> fmt::Result {
    pad(f, depth)?;
    write!(f, "public {} {}(", method.return_type, method.name)?;
    for (i, param) in method.params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", param)?;
    }
    writeln!(f, ") {{")?;
    for var in &method.vars {
        write_var(f, var, depth + 1)?;
    }
    for stmt in &method.body {
        write_stmt(f, stmt, depth + 1)?;
    }
    pad(f, depth + 1)?;
    writeln!(f, "return {};", method.return_expr)?;
    pad(f, depth)?;
    writeln!(f, "}}")
}

impl fmt::Display for ClassDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => writeln!(f, "class {} extends {} {{", self.name, parent)?,
            None => writeln!(f, "class {} {{", self.name)?,
        }
        for field in &self.fields {
            write_var(f, field, 1)?;
        }
        for method in &self.methods {
            write_method(f, method, 1)?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for MainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "class {} {{", self.name)?;
        writeln!(f, "{}public static void main(String[] {}) {{", INDENT, self.args)?;
        for var in &self.vars {
            write_var(f, var, 2)?;
        }
        for stmt in &self.body {
            write_stmt(f, stmt, 2)?;
        }
        writeln!(f, "{}}}", INDENT)?;
        writeln!(f, "}}")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.main)?;
        for class in &self.classes {
            writeln!(f)?;
            write!(f, "{}", class)?;
        }
        Ok(())
    }
}
