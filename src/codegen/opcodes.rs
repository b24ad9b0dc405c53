//! Instruction model for the generated assembly
//!
//! Only the opcodes the generator emits exist here, plus a `Label`
//! pseudo-instruction. `Display` renders the Jasmin spelling.

use std::fmt;

use super::descriptor::parse_method_descriptor;

/// Owner, name and descriptor of a field or method operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl MemberRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Eq,
    Ne,
    Lt,
    Gt,
}

impl Cond {
    fn suffix(&self) -> &'static str {
        match self {
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Lt => "lt",
            Cond::Gt => "gt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Push an int constant
    Ldc(i32),
    ILoad(u16),
    ALoad(u16),
    IStore(u16),
    AStore(u16),
    IALoad,
    IAStore,
    IAdd,
    ISub,
    IMul,
    IDiv,
    ArrayLength,
    /// `newarray int`
    NewIntArray,
    New(String),
    Dup,
    Pop,
    GetStatic(MemberRef),
    GetField(MemberRef),
    PutField(MemberRef),
    InvokeVirtual(MemberRef),
    InvokeSpecial(MemberRef),
    /// Jump when the popped int is zero
    IfEq(String),
    /// Jump when the popped int is non-zero
    IfNe(String),
    IfICmp(Cond, String),
    IfACmp(Cond, String),
    Goto(String),
    Label(String),
    IReturn,
    AReturn,
    Return,
}

/// Operand-stack words consumed and produced by one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackEffect {
    pub pops: u16,
    pub pushes: u16,
}

impl StackEffect {
    const fn new(pops: u16, pushes: u16) -> Self {
        Self { pops, pushes }
    }
}

impl Instruction {
    /// Stack effect, or `None` when an invoke carries a malformed descriptor
    pub fn stack_effect(&self) -> Option<StackEffect> {
        use Instruction::*;
        let effect = match self {
            Ldc(_) | ILoad(_) | ALoad(_) | New(_) | Dup | GetStatic(_) => StackEffect::new(0, 1),
            IStore(_) | AStore(_) | Pop | IfEq(_) | IfNe(_) | IReturn | AReturn => StackEffect::new(1, 0),
            IALoad | IAdd | ISub | IMul | IDiv => StackEffect::new(2, 1),
            IAStore => StackEffect::new(3, 0),
            ArrayLength | NewIntArray | GetField(_) => StackEffect::new(1, 1),
            PutField(_) | IfICmp(..) | IfACmp(..) => StackEffect::new(2, 0),
            Goto(_) | Label(_) | Return => StackEffect::new(0, 0),
            InvokeVirtual(member) | InvokeSpecial(member) => {
                let shape = parse_method_descriptor(&member.descriptor)?;
                let args = u16::try_from(shape.arg_count).ok()?;
                StackEffect::new(args + 1, u16::from(shape.returns_value))
            }
        };
        Some(effect)
    }

    /// Target label of a jump
    pub fn branch_target(&self) -> Option<&str> {
        match self {
            Instruction::IfEq(l)
            | Instruction::IfNe(l)
            | Instruction::IfICmp(_, l)
            | Instruction::IfACmp(_, l)
            | Instruction::Goto(l) => Some(l),
            _ => None,
        }
    }

    /// Whether control never continues to the next instruction
    pub fn ends_flow(&self) -> bool {
        matches!(
            self,
            Instruction::Goto(_) | Instruction::IReturn | Instruction::AReturn | Instruction::Return
        )
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Instruction::IReturn | Instruction::AReturn | Instruction::Return)
    }

    /// Local slot read or written
    pub fn local_slot(&self) -> Option<u16> {
        match self {
            Instruction::ILoad(n) | Instruction::ALoad(n) | Instruction::IStore(n) | Instruction::AStore(n) => {
                Some(*n)
            }
            _ => None,
        }
    }
}

fn write_local(f: &mut fmt::Formatter<'_>, op: &str, slot: u16) -> fmt::Result {
    if slot <= 3 {
        write!(f, "{}_{}", op, slot)
    } else {
        write!(f, "{} {}", op, slot)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match self {
            Ldc(value) => write!(f, "ldc {}", value),
            ILoad(n) => write_local(f, "iload", *n),
            ALoad(n) => write_local(f, "aload", *n),
            IStore(n) => write_local(f, "istore", *n),
            AStore(n) => write_local(f, "astore", *n),
            IALoad => write!(f, "iaload"),
            IAStore => write!(f, "iastore"),
            IAdd => write!(f, "iadd"),
            ISub => write!(f, "isub"),
            IMul => write!(f, "imul"),
            IDiv => write!(f, "idiv"),
            ArrayLength => write!(f, "arraylength"),
            NewIntArray => write!(f, "newarray int"),
            New(class) => write!(f, "new {}", class),
            Dup => write!(f, "dup"),
            Pop => write!(f, "pop"),
            GetStatic(m) => write!(f, "getstatic {}/{} {}", m.owner, m.name, m.descriptor),
            GetField(m) => write!(f, "getfield {}/{} {}", m.owner, m.name, m.descriptor),
            PutField(m) => write!(f, "putfield {}/{} {}", m.owner, m.name, m.descriptor),
            InvokeVirtual(m) => write!(f, "invokevirtual {}/{}{}", m.owner, m.name, m.descriptor),
            InvokeSpecial(m) => write!(f, "invokespecial {}/{}{}", m.owner, m.name, m.descriptor),
            IfEq(l) => write!(f, "ifeq {}", l),
            IfNe(l) => write!(f, "ifne {}", l),
            IfICmp(cond, l) => write!(f, "if_icmp{} {}", cond.suffix(), l),
            IfACmp(cond, l) => write!(f, "if_acmp{} {}", cond.suffix(), l),
            Goto(l) => write!(f, "goto {}", l),
            Label(l) => write!(f, "{}:", l),
            IReturn => write!(f, "ireturn"),
            AReturn => write!(f, "areturn"),
            Return => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_short_and_long_local_forms() {
        assert_eq!(Instruction::ILoad(3).to_string(), "iload_3");
        assert_eq!(Instruction::ILoad(4).to_string(), "iload 4");
        assert_eq!(Instruction::AStore(0).to_string(), "astore_0");
        assert_eq!(Instruction::IStore(12).to_string(), "istore 12");
    }

    #[test]
    fn renders_member_operands() {
        let print = MemberRef::new("java/io/PrintStream", "println", "(I)V");
        assert_eq!(
            Instruction::InvokeVirtual(print).to_string(),
            "invokevirtual java/io/PrintStream/println(I)V"
        );
        let out = MemberRef::new("java/lang/System", "out", "Ljava/io/PrintStream;");
        assert_eq!(
            Instruction::GetStatic(out).to_string(),
            "getstatic java/lang/System/out Ljava/io/PrintStream;"
        );
        assert_eq!(Instruction::IfICmp(Cond::Lt, "T0".into()).to_string(), "if_icmplt T0");
        assert_eq!(Instruction::Label("End1".into()).to_string(), "End1:");
    }

    #[test]
    fn invoke_effects_follow_descriptor() {
        let call = Instruction::InvokeVirtual(MemberRef::new("Fac", "ComputeFac", "(I)I"));
        assert_eq!(call.stack_effect(), Some(StackEffect { pops: 2, pushes: 1 }));
        let init = Instruction::InvokeSpecial(MemberRef::new("A", "<init>", "()V"));
        assert_eq!(init.stack_effect(), Some(StackEffect { pops: 1, pushes: 0 }));
        let broken = Instruction::InvokeVirtual(MemberRef::new("A", "m", "(I"));
        assert_eq!(broken.stack_effect(), None);
    }
}
