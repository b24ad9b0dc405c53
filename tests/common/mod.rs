// Common test utilities: MiniJ fixtures and a small interpreter for
// generated class files.
#![allow(dead_code)]

use std::collections::HashMap;

use minijc::codegen::descriptor::parse_method_descriptor;
use minijc::codegen::{ClassFile, Cond, Instruction, MethodInfo};
use minijc::consts::{INIT_METHOD, OBJECT_CLASS, PRINT_STREAM_CLASS};
use minijc::Config;

pub const FACTORIAL: &str = r#"
class Factorial {
    public static void main(String[] a) {
        System.out.println(new Fac().ComputeFac(10));
    }
}

class Fac {
    public int ComputeFac(int num) {
        int num_aux;
        if (num < 1)
            num_aux = 1;
        else
            num_aux = num * (this.ComputeFac(num - 1));
        return num_aux;
    }
}
"#;

/// Factorial with the argument supplied by the caller
pub fn factorial_of(n: i32) -> String {
    FACTORIAL.replace("ComputeFac(10)", &format!("ComputeFac({})", n))
}

/// Sums the first `n` squares with a loop over an array
pub const ARRAY_SUM: &str = r#"
class ArraySum {
    public static void main(String[] a) {
        System.out.println(new Summer().Run(5));
    }
}

class Summer {
    int[] data;

    public int Run(int n) {
        int i;
        int total;
        data = new int[n];
        i = 0;
        while (i < data.length) {
            data[i] = i * i;
            i = i + 1;
        }
        total = 0;
        i = 0;
        while (i < n) {
            total = total + data[i];
            i = i + 1;
        }
        return total;
    }
}
"#;

/// Counter with a field shared across calls and an inherited method
pub const INHERITANCE: &str = r#"
class Main {
    public static void main(String[] a) {
        System.out.println(new Child().Twice(21));
    }
}

class Base {
    int count;

    public int Bump(int by) {
        count = count + by;
        return count;
    }
}

class Child extends Base {
    public int Twice(int x) {
        int first;
        first = this.Bump(x);
        return first + this.Bump(x);
    }
}
"#;

pub fn compile(source: &str) -> Vec<ClassFile> {
    minijc::compile(source, &Config::default()).expect("program should compile")
}

pub fn compile_unoptimized(source: &str) -> Vec<ClassFile> {
    minijc::compile(source, &Config::default().with_optimize(false)).expect("program should compile")
}

pub fn find_class<'a>(classes: &'a [ClassFile], name: &str) -> &'a ClassFile {
    classes
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("class {} not generated", name))
}

pub fn find_method<'a>(classes: &'a [ClassFile], class: &str, method: &str) -> &'a MethodInfo {
    find_class(classes, class)
        .method(method)
        .unwrap_or_else(|| panic!("method {}.{} not generated", class, method))
}

/// Rendered instructions of a routine, labels included
pub fn listing(method: &MethodInfo) -> Vec<String> {
    method.code.iter().map(|i| i.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Ref(usize),
    Null,
}

impl Value {
    fn int(&self) -> Result<i32, String> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(format!("expected int, found {:?}", other)),
        }
    }

    fn reference(&self) -> Result<usize, String> {
        match self {
            Value::Ref(r) => Ok(*r),
            other => Err(format!("expected reference, found {:?}", other)),
        }
    }
}

#[derive(Debug)]
enum HeapObject {
    Object { class: String, fields: HashMap<String, Value> },
    Array(Vec<i32>),
}

/// Executes generated routines directly from the instruction model
pub struct Machine<'a> {
    classes: HashMap<&'a str, &'a ClassFile>,
    heap: Vec<HeapObject>,
    /// Values passed to println, in order
    pub output: Vec<Value>,
    /// Invocation count per method name
    pub calls: HashMap<String, usize>,
    steps: usize,
}

const STEP_LIMIT: usize = 1_000_000;

impl<'a> Machine<'a> {
    pub fn new(class_files: &'a [ClassFile]) -> Self {
        Self {
            classes: class_files.iter().map(|c| (c.name.as_str(), c)).collect(),
            heap: Vec::new(),
            output: Vec::new(),
            calls: HashMap::new(),
            steps: 0,
        }
    }

    /// Run `main` of `class` and return the printed ints
    pub fn run_main(&mut self, class: &str) -> Result<Vec<i32>, String> {
        let method = self.lookup(class, "main")?;
        self.execute(method, vec![Value::Null])?;
        self.output.iter().map(Value::int).collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.get(method).copied().unwrap_or(0)
    }

    /// Instantiate `class` (running its initializer) and invoke `method`
    pub fn invoke(&mut self, class: &str, method: &str, args: Vec<Value>) -> Result<Option<Value>, String> {
        let receiver = self.instantiate(class)?;
        let init = self.lookup(class, INIT_METHOD)?;
        self.execute(init, vec![receiver.clone()])?;
        let target = self.lookup(class, method)?;
        *self.calls.entry(method.to_string()).or_default() += 1;
        let mut locals = vec![receiver];
        locals.extend(args);
        self.execute(target, locals)
    }

    fn lookup(&self, class: &str, method: &str) -> Result<&'a MethodInfo, String> {
        let mut current = class;
        loop {
            let file: &'a ClassFile = *self
                .classes
                .get(current)
                .ok_or_else(|| format!("unknown class {}", current))?;
            if let Some(m) = file.method(method) {
                return Ok(m);
            }
            if file.super_name == OBJECT_CLASS {
                return Err(format!("no method {} in {}", method, class));
            }
            current = file.super_name.as_str();
        }
    }

    fn instantiate(&mut self, class: &str) -> Result<Value, String> {
        let mut fields = HashMap::new();
        let mut current = class;
        while current != OBJECT_CLASS {
            let file: &'a ClassFile = *self
                .classes
                .get(current)
                .ok_or_else(|| format!("unknown class {}", current))?;
            for field in &file.fields {
                let initial = if field.descriptor == "I" { Value::Int(0) } else { Value::Null };
                fields.entry(field.name.clone()).or_insert(initial);
            }
            current = file.super_name.as_str();
        }
        self.heap.push(HeapObject::Object {
            class: class.to_string(),
            fields,
        });
        Ok(Value::Ref(self.heap.len() - 1))
    }

    fn array(&mut self, value: &Value) -> Result<&mut Vec<i32>, String> {
        match self.heap.get_mut(value.reference()?) {
            Some(HeapObject::Array(items)) => Ok(items),
            other => Err(format!("expected array, found {:?}", other)),
        }
    }

    fn fields(&mut self, value: &Value) -> Result<&mut HashMap<String, Value>, String> {
        match self.heap.get_mut(value.reference()?) {
            Some(HeapObject::Object { fields, .. }) => Ok(fields),
            other => Err(format!("expected object, found {:?}", other)),
        }
    }

    fn class_of(&self, value: &Value) -> Result<String, String> {
        match self.heap.get(value.reference()?) {
            Some(HeapObject::Object { class, .. }) => Ok(class.clone()),
            other => Err(format!("expected object, found {:?}", other)),
        }
    }

    fn execute(&mut self, method: &'a MethodInfo, args: Vec<Value>) -> Result<Option<Value>, String> {
        let labels: HashMap<&str, usize> = method
            .code
            .iter()
            .enumerate()
            .filter_map(|(i, ins)| match ins {
                Instruction::Label(l) => Some((l.as_str(), i)),
                _ => None,
            })
            .collect();

        let mut locals = args;
        locals.resize(usize::from(method.max_locals).max(locals.len()), Value::Null);
        let mut stack: Vec<Value> = Vec::new();
        let mut pc = 0;

        macro_rules! pop {
            () => {
                stack.pop().ok_or_else(|| format!("stack underflow in {}", method.name))?
            };
        }
        macro_rules! jump {
            ($label:expr) => {{
                pc = *labels.get($label.as_str()).ok_or_else(|| format!("no label {}", $label))?;
                continue;
            }};
        }

        loop {
            self.steps += 1;
            if self.steps > STEP_LIMIT {
                return Err("step limit exceeded".into());
            }
            let instruction = method
                .code
                .get(pc)
                .ok_or_else(|| format!("fell off the end of {}", method.name))?;
            pc += 1;

            match instruction {
                Instruction::Label(_) => {}
                Instruction::Ldc(v) => stack.push(Value::Int(*v)),
                Instruction::ILoad(n) | Instruction::ALoad(n) => stack.push(locals[usize::from(*n)].clone()),
                Instruction::IStore(n) | Instruction::AStore(n) => locals[usize::from(*n)] = pop!(),
                Instruction::IALoad => {
                    let index = pop!().int()?;
                    let array = pop!();
                    let items = self.array(&array)?;
                    let value = *items.get(index as usize).ok_or("array index out of bounds")?;
                    stack.push(Value::Int(value));
                }
                Instruction::IAStore => {
                    let value = pop!().int()?;
                    let index = pop!().int()?;
                    let array = pop!();
                    let items = self.array(&array)?;
                    *items.get_mut(index as usize).ok_or("array index out of bounds")? = value;
                }
                Instruction::IAdd | Instruction::ISub | Instruction::IMul | Instruction::IDiv => {
                    let right = pop!().int()?;
                    let left = pop!().int()?;
                    let result = match instruction {
                        Instruction::IAdd => left.wrapping_add(right),
                        Instruction::ISub => left.wrapping_sub(right),
                        Instruction::IMul => left.wrapping_mul(right),
                        _ => left.checked_div(right).ok_or("division by zero")?,
                    };
                    stack.push(Value::Int(result));
                }
                Instruction::ArrayLength => {
                    let array = pop!();
                    let len = self.array(&array)?.len();
                    stack.push(Value::Int(len as i32));
                }
                Instruction::NewIntArray => {
                    let size = pop!().int()?;
                    self.heap.push(HeapObject::Array(vec![0; size.max(0) as usize]));
                    stack.push(Value::Ref(self.heap.len() - 1));
                }
                Instruction::New(class) => {
                    let object = self.instantiate(class)?;
                    stack.push(object);
                }
                Instruction::Dup => {
                    let top = stack.last().cloned().ok_or("dup on empty stack")?;
                    stack.push(top);
                }
                Instruction::Pop => {
                    pop!();
                }
                Instruction::GetStatic(_) => stack.push(Value::Null),
                Instruction::GetField(m) => {
                    let object = pop!();
                    let value = self
                        .fields(&object)?
                        .get(&m.name)
                        .cloned()
                        .ok_or_else(|| format!("no field {}", m.name))?;
                    stack.push(value);
                }
                Instruction::PutField(m) => {
                    let value = pop!();
                    let object = pop!();
                    self.fields(&object)?.insert(m.name.clone(), value);
                }
                Instruction::InvokeVirtual(m) if m.owner == PRINT_STREAM_CLASS => {
                    let value = pop!();
                    pop!();
                    self.output.push(value);
                }
                Instruction::InvokeVirtual(m) => {
                    let shape = parse_method_descriptor(&m.descriptor).ok_or("bad descriptor")?;
                    let split = stack.len().checked_sub(shape.arg_count + 1).ok_or("stack underflow at call")?;
                    let mut frame = stack.split_off(split);
                    let class = self.class_of(&frame[0])?;
                    let target = self.lookup(&class, &m.name)?;
                    *self.calls.entry(m.name.clone()).or_default() += 1;
                    if let Some(result) = self.execute(target, frame)? {
                        stack.push(result);
                    }
                }
                Instruction::InvokeSpecial(m) => {
                    let receiver = pop!();
                    if m.owner != OBJECT_CLASS && m.name == INIT_METHOD {
                        let init = self.lookup(&m.owner, INIT_METHOD)?;
                        self.execute(init, vec![receiver])?;
                    }
                }
                Instruction::IfEq(label) => {
                    if pop!().int()? == 0 {
                        jump!(label);
                    }
                }
                Instruction::IfNe(label) => {
                    if pop!().int()? != 0 {
                        jump!(label);
                    }
                }
                Instruction::IfICmp(cond, label) => {
                    let right = pop!().int()?;
                    let left = pop!().int()?;
                    let taken = match cond {
                        Cond::Eq => left == right,
                        Cond::Ne => left != right,
                        Cond::Lt => left < right,
                        Cond::Gt => left > right,
                    };
                    if taken {
                        jump!(label);
                    }
                }
                Instruction::IfACmp(cond, label) => {
                    let right = pop!();
                    let left = pop!();
                    let taken = match cond {
                        Cond::Eq => left == right,
                        _ => left != right,
                    };
                    if taken {
                        jump!(label);
                    }
                }
                Instruction::Goto(label) => jump!(label),
                Instruction::IReturn | Instruction::AReturn => return Ok(Some(pop!())),
                Instruction::Return => return Ok(None),
            }
        }
    }
}

/// Compile `source` and run the main class, returning the printed ints
pub fn run(source: &str, main_class: &str) -> Vec<i32> {
    let classes = compile(source);
    let mut machine = Machine::new(&classes);
    machine.run_main(main_class).expect("program should run")
}
