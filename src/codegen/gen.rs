//! AST to instruction lowering
//!
//! One `Gen` walks the whole program and produces a [`ClassFile`] per class.
//! It keeps its own [`ClassTable`] so receiver classes and call signatures can
//! be recovered without analysis results. Code generation only runs on
//! programs that passed attribution; the fallbacks below are there for direct
//! library callers and are logged when taken.

use crate::ast::*;
use crate::consts::*;
use crate::wash::enter::{ClassTable, MethodLookup};

use super::class::{ClassFile, FieldInfo, MethodInfo};
use super::code::Code;
use super::descriptor::{fallback_method_descriptor, method_descriptor, type_to_descriptor};
use super::opcodes::{Cond, Instruction, MemberRef};
use super::register_alloc::LocalTable;

/// Slot assumed for an identifier that resolves to nothing
const FALLBACK_SLOT: u16 = 1;

/// Where a name lives at the current program point
enum VarRef {
    Local { slot: u16, ty: Type },
    Field { owner: String, ty: Type },
    Unresolved,
}

pub struct Gen<'a, 'ast> {
    classes: &'a ClassTable<'ast>,
    output: Vec<ClassFile>,

    // Per-class state
    class: Option<ClassFile>,
    /// Class `this` refers to; `None` inside the entry routine
    this_class: Option<String>,
    label_counter: usize,

    // Per-routine state
    locals: LocalTable,
    code: Code,
}

impl<'a, 'ast> Gen<'a, 'ast> {
    pub fn new(classes: &'a ClassTable<'ast>) -> Self {
        Self {
            classes,
            output: Vec::new(),
            class: None,
            this_class: None,
            label_counter: 0,
            locals: LocalTable::for_instance(),
            code: Code::new(),
        }
    }

    pub fn into_class_files(self) -> Vec<ClassFile> {
        self.output
    }

    fn emit(&mut self, instruction: Instruction) {
        self.code.emit(instruction);
    }

    /// Fresh label names sharing one numeric suffix, unique within the class
    fn labels<const N: usize>(&mut self, prefixes: [&str; N]) -> [String; N] {
        let n = self.label_counter;
        self.label_counter += 1;
        prefixes.map(|p| format!("{}{}", p, n))
    }

    fn begin_routine(&mut self, locals: LocalTable) {
        self.locals = locals;
        self.code = Code::new();
    }

    fn finish_routine(&mut self, name: &str, descriptor: String, is_static: bool) {
        let code = std::mem::take(&mut self.code);
        let method = MethodInfo {
            name: name.to_string(),
            descriptor,
            is_static,
            max_stack: code.max_stack(),
            max_locals: self.locals.max_locals(),
            code: code.into_instructions(),
        };
        log::trace!(
            "gen: {}{} stack={} locals={}",
            method.name,
            method.descriptor,
            method.max_stack,
            method.max_locals
        );
        if let Some(class) = self.class.as_mut() {
            class.methods.push(method);
        }
    }

    /// `<init>`: chain to the superclass, then run field initializers
    fn gen_initializer(&mut self, super_name: &str, fields: &'ast [VarDecl]) {
        self.begin_routine(LocalTable::for_instance());
        self.emit(Instruction::ALoad(0));
        self.emit(Instruction::InvokeSpecial(MemberRef::new(super_name, INIT_METHOD, INIT_DESCRIPTOR)));
        if let Some(owner) = self.this_class.clone() {
            for field in fields {
                if let Some(init) = &field.init {
                    self.emit(Instruction::ALoad(0));
                    self.gen_expr(init);
                    let member = MemberRef::new(owner.as_str(), field.name.as_str(), type_to_descriptor(&field.ty));
                    self.emit(Instruction::PutField(member));
                }
            }
        }
        self.emit(Instruction::Return);
        self.finish_routine(INIT_METHOD, INIT_DESCRIPTOR.to_string(), false);
    }

    fn resolve(&self, name: &str) -> VarRef {
        if let Some(local) = self.locals.get(name) {
            return VarRef::Local { slot: local.slot, ty: local.ty.clone() };
        }
        if let Some(class) = &self.this_class {
            if let Some((field, owner)) = self.classes.find_field(class, name) {
                return VarRef::Field { owner: owner.name.name.clone(), ty: field.ty.clone() };
            }
        }
        VarRef::Unresolved
    }

    /// Static type of `expr`, when it can be recovered from declarations
    fn type_of(&self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::IntLiteral(_) | Expr::Binary(_) | Expr::ArrayLookup(_) | Expr::ArrayLength(_) => Some(Type::Int),
            Expr::NewArray(_) => Some(Type::IntArray),
            Expr::NewObject(e) => Some(Type::class(e.class.as_str())),
            Expr::This(_) => self.this_class.as_deref().map(Type::class),
            Expr::Identifier(id) => match self.resolve(id.as_str()) {
                VarRef::Local { ty, .. } | VarRef::Field { ty, .. } => Some(ty),
                VarRef::Unresolved => None,
            },
            Expr::Call(call) => {
                let receiver = self.type_of(&call.receiver)?;
                match self.classes.find_method(receiver.class_name()?, call.method.as_str()) {
                    MethodLookup::Found { method, .. } => Some(method.return_type.clone()),
                    MethodLookup::NotFound { .. } => None,
                }
            }
        }
    }

    fn load(&mut self, name: &str) {
        match self.resolve(name) {
            VarRef::Local { slot, ty } if ty.is_reference() => self.emit(Instruction::ALoad(slot)),
            VarRef::Local { slot, .. } => self.emit(Instruction::ILoad(slot)),
            VarRef::Field { owner, ty } => {
                self.emit(Instruction::ALoad(0));
                self.emit(Instruction::GetField(MemberRef::new(owner, name, type_to_descriptor(&ty))));
            }
            VarRef::Unresolved => {
                log::warn!("gen: '{}' does not resolve, loading slot {}", name, FALLBACK_SLOT);
                self.locals.touch(FALLBACK_SLOT);
                self.emit(Instruction::ILoad(FALLBACK_SLOT));
            }
        }
    }

    fn store(&mut self, name: &str, value: &'ast Expr) {
        match self.resolve(name) {
            VarRef::Local { slot, ty } => {
                self.gen_expr(value);
                if ty.is_reference() {
                    self.emit(Instruction::AStore(slot));
                } else {
                    self.emit(Instruction::IStore(slot));
                }
            }
            VarRef::Field { owner, ty } => {
                self.emit(Instruction::ALoad(0));
                self.gen_expr(value);
                self.emit(Instruction::PutField(MemberRef::new(owner, name, type_to_descriptor(&ty))));
            }
            VarRef::Unresolved => {
                log::warn!("gen: '{}' does not resolve, storing to slot {}", name, FALLBACK_SLOT);
                self.gen_expr(value);
                self.locals.touch(FALLBACK_SLOT);
                self.emit(Instruction::IStore(FALLBACK_SLOT));
            }
        }
    }

    /// Allocate a local and store its initializer, if any
    fn declare_local(&mut self, var: &'ast VarDecl) {
        let slot = self.locals.allocate(var.name.as_str(), var.ty.clone());
        if let Some(init) = &var.init {
            self.gen_expr(init);
            if var.ty.is_reference() {
                self.emit(Instruction::AStore(slot));
            } else {
                self.emit(Instruction::IStore(slot));
            }
        }
    }

    pub fn gen_expr(&mut self, expr: &'ast Expr) {
        match expr {
            Expr::IntLiteral(lit) => self.emit(Instruction::Ldc(lit.value)),
            Expr::Identifier(id) => self.load(id.as_str()),
            Expr::This(_) => self.emit(Instruction::ALoad(0)),
            Expr::NewArray(e) => {
                self.gen_expr(&e.size);
                self.emit(Instruction::NewIntArray);
            }
            Expr::NewObject(e) => {
                let class = e.class.name.clone();
                self.emit(Instruction::New(class.clone()));
                self.emit(Instruction::Dup);
                self.emit(Instruction::InvokeSpecial(MemberRef::new(class, INIT_METHOD, INIT_DESCRIPTOR)));
            }
            Expr::ArrayLookup(e) => {
                self.gen_expr(&e.array);
                self.gen_expr(&e.index);
                self.emit(Instruction::IALoad);
            }
            Expr::ArrayLength(e) => {
                self.gen_expr(&e.array);
                self.emit(Instruction::ArrayLength);
            }
            Expr::Binary(b) => self.gen_binary(b),
            Expr::Call(call) => self.gen_call(call),
        }
    }

    fn gen_binary(&mut self, b: &'ast BinaryExpr) {
        match b.operator {
            BinaryOp::And => {
                let [false_label, end] = self.labels(["AndFalse", "AndEnd"]);
                self.gen_expr(&b.left);
                self.emit(Instruction::IfEq(false_label.clone()));
                self.gen_expr(&b.right);
                self.emit(Instruction::IfEq(false_label.clone()));
                self.emit(Instruction::Ldc(1));
                self.emit(Instruction::Goto(end.clone()));
                self.code.place_label(&false_label);
                self.emit(Instruction::Ldc(0));
                self.code.place_label(&end);
            }
            BinaryOp::Or => {
                let [true_label, end] = self.labels(["OrTrue", "OrEnd"]);
                self.gen_expr(&b.left);
                self.emit(Instruction::IfNe(true_label.clone()));
                self.gen_expr(&b.right);
                self.emit(Instruction::IfNe(true_label.clone()));
                self.emit(Instruction::Ldc(0));
                self.emit(Instruction::Goto(end.clone()));
                self.code.place_label(&true_label);
                self.emit(Instruction::Ldc(1));
                self.code.place_label(&end);
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Eq | BinaryOp::Ne => {
                let cond = match b.operator {
                    BinaryOp::Lt => Cond::Lt,
                    BinaryOp::Gt => Cond::Gt,
                    BinaryOp::Eq => Cond::Eq,
                    _ => Cond::Ne,
                };
                let by_reference = b.operator.is_equality()
                    && self.type_of(&b.left).map_or(false, |ty| ty.is_reference());
                let [true_label, end] = self.labels(["CmpTrue", "CmpEnd"]);
                self.gen_expr(&b.left);
                self.gen_expr(&b.right);
                if by_reference {
                    self.emit(Instruction::IfACmp(cond, true_label.clone()));
                } else {
                    self.emit(Instruction::IfICmp(cond, true_label.clone()));
                }
                self.emit(Instruction::Ldc(0));
                self.emit(Instruction::Goto(end.clone()));
                self.code.place_label(&true_label);
                self.emit(Instruction::Ldc(1));
                self.code.place_label(&end);
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                self.gen_expr(&b.left);
                self.gen_expr(&b.right);
                self.emit(match b.operator {
                    BinaryOp::Add => Instruction::IAdd,
                    BinaryOp::Sub => Instruction::ISub,
                    BinaryOp::Mul => Instruction::IMul,
                    _ => Instruction::IDiv,
                });
            }
        }
    }

    fn gen_call(&mut self, call: &'ast CallExpr) {
        let receiver_class = self
            .type_of(&call.receiver)
            .and_then(|ty| ty.class_name().map(str::to_string));

        let resolved = receiver_class.as_deref().and_then(|class| {
            match self.classes.find_method(class, call.method.as_str()) {
                MethodLookup::Found { method, .. } => Some(method),
                MethodLookup::NotFound { .. } => None,
            }
        });
        let descriptor = match resolved {
            Some(method) => method_descriptor(method.params.iter().map(|p| &p.ty), &method.return_type),
            None => {
                log::warn!(
                    "gen: call to '{}' at line {} does not resolve, assuming int signature",
                    call.method,
                    call.line
                );
                fallback_method_descriptor(call.args.len())
            }
        };
        let owner = receiver_class.unwrap_or_else(|| UNRESOLVED_CLASS.to_string());

        self.gen_expr(&call.receiver);
        for arg in &call.args {
            self.gen_expr(arg);
        }
        self.emit(Instruction::InvokeVirtual(MemberRef::new(owner, call.method.as_str(), descriptor)));
    }

    fn gen_print(&mut self, value: &'ast Expr) {
        let descriptor = match self.type_of(value) {
            Some(ty) if ty.is_reference() => PRINTLN_OBJECT_DESCRIPTOR,
            _ => PRINTLN_INT_DESCRIPTOR,
        };
        self.emit(Instruction::GetStatic(MemberRef::new(SYSTEM_CLASS, OUT_FIELD, PRINT_STREAM_DESCRIPTOR)));
        self.gen_expr(value);
        self.emit(Instruction::InvokeVirtual(MemberRef::new(PRINT_STREAM_CLASS, PRINTLN_METHOD, descriptor)));
    }
}

impl<'a, 'ast> AstVisitor<'ast> for Gen<'a, 'ast> {
    type Output = ();

    fn visit_program(&mut self, program: &'ast Program) {
        self.visit_main_class(&program.main);
        for class in &program.classes {
            self.visit_class_decl(class);
        }
        log::debug!("gen complete: {} class file(s)", self.output.len());
    }

    fn visit_main_class(&mut self, main: &'ast MainClass) {
        self.class = Some(ClassFile::new(main.name.as_str(), OBJECT_CLASS));
        self.label_counter = 0;
        self.this_class = Some(main.name.name.clone());
        self.gen_initializer(OBJECT_CLASS, &[]);

        // The entry routine is static: no receiver, slot 0 holds the arguments
        self.this_class = None;
        let mut locals = LocalTable::for_static();
        locals.allocate(main.args.as_str(), Type::class(ENTRY_ARGS_TYPE));
        self.begin_routine(locals);
        for var in &main.vars {
            self.visit_var_decl(var);
        }
        for stmt in &main.body {
            self.visit_stmt(stmt);
        }
        self.emit(Instruction::Return);
        self.finish_routine(ENTRY_METHOD, ENTRY_DESCRIPTOR.to_string(), true);

        if let Some(class) = self.class.take() {
            self.output.push(class);
        }
    }

    fn visit_class_decl(&mut self, class: &'ast ClassDecl) {
        let super_name = class
            .parent
            .as_ref()
            .map_or_else(|| OBJECT_CLASS.to_string(), |p| p.name.clone());
        let mut file = ClassFile::new(class.name.as_str(), super_name.as_str());
        file.fields = class
            .fields
            .iter()
            .map(|f| FieldInfo {
                name: f.name.name.clone(),
                descriptor: type_to_descriptor(&f.ty),
            })
            .collect();
        self.class = Some(file);
        self.label_counter = 0;
        self.this_class = Some(class.name.name.clone());

        self.gen_initializer(&super_name, &class.fields);
        for method in &class.methods {
            self.visit_method_decl(method);
        }

        self.this_class = None;
        if let Some(file) = self.class.take() {
            self.output.push(file);
        }
    }

    fn visit_var_decl(&mut self, var: &'ast VarDecl) {
        self.declare_local(var);
    }

    fn visit_method_decl(&mut self, method: &'ast MethodDecl) {
        self.begin_routine(LocalTable::for_instance());
        for param in &method.params {
            self.visit_param(param);
        }
        for var in &method.vars {
            self.visit_var_decl(var);
        }
        for stmt in &method.body {
            self.visit_stmt(stmt);
        }
        self.gen_expr(&method.return_expr);
        if method.return_type.is_reference() {
            self.emit(Instruction::AReturn);
        } else {
            self.emit(Instruction::IReturn);
        }

        let descriptor = method_descriptor(method.params.iter().map(|p| &p.ty), &method.return_type);
        self.finish_routine(method.name.as_str(), descriptor, false);
    }

    fn visit_param(&mut self, param: &'ast Param) {
        self.locals.allocate(param.name.as_str(), param.ty.clone());
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Block(block) => {
                for s in &block.statements {
                    self.visit_stmt(s);
                }
            }
            Stmt::If(s) => {
                let [else_label, end] = self.labels(["Else", "EndIf"]);
                self.gen_expr(&s.condition);
                self.emit(Instruction::IfEq(else_label.clone()));
                self.visit_stmt(&s.then_branch);
                self.emit(Instruction::Goto(end.clone()));
                self.code.place_label(&else_label);
                if let Some(else_branch) = &s.else_branch {
                    self.visit_stmt(else_branch);
                }
                self.code.place_label(&end);
            }
            Stmt::While(s) => {
                let [start, end] = self.labels(["While", "EndWhile"]);
                self.code.place_label(&start);
                self.gen_expr(&s.condition);
                self.emit(Instruction::IfEq(end.clone()));
                self.visit_stmt(&s.body);
                self.emit(Instruction::Goto(start));
                self.code.place_label(&end);
            }
            Stmt::Print(s) => self.gen_print(&s.value),
            Stmt::Assign(s) => self.store(s.target.as_str(), &s.value),
            Stmt::ArrayAssign(s) => {
                self.load(s.target.as_str());
                self.gen_expr(&s.index);
                self.gen_expr(&s.value);
                self.emit(Instruction::IAStore);
            }
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        self.gen_expr(expr);
    }
}
