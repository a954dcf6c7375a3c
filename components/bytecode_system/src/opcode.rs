//! Bytecode opcodes for the stack machine
//!
//! The opcode set is closed and version-pinned: byte values are fixed by
//! the module format, and the decoder rejects anything outside the table.

use std::fmt;

/// Shape of the operand that follows an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// No operand
    None,
    /// Signed 32-bit integer
    Int32,
    /// IEEE-754 double
    Float64,
    /// One unsigned 16-bit value
    UInt16,
    /// Two unsigned 16-bit values
    TwoUInt16,
}

impl OperandKind {
    /// Encoded size in bytes.
    pub fn size(self) -> usize {
        match self {
            OperandKind::None => 0,
            OperandKind::UInt16 => 2,
            OperandKind::Int32 | OperandKind::TwoUInt16 => 4,
            OperandKind::Float64 => 8,
        }
    }
}

/// Bytecode opcodes
///
/// Stack effects are written `[before] -> [after]`, top of stack last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Does nothing
    Nop = 0,

    // Literals
    /// `[] -> [int]`, operand: i32
    LoadInt = 1,
    /// `[] -> [double]`, operand: f64
    LoadDouble = 2,
    /// `[] -> [string]`, operand: string index
    LoadString = 3,
    /// `[] -> [undefined]`
    LoadUndefined = 4,
    /// `[] -> [null]`
    LoadNull = 5,
    /// `[] -> [true]`
    LoadTrue = 6,
    /// `[] -> [false]`
    LoadFalse = 7,
    /// `[] -> [this]` of the current call frame
    LoadThis = 8,

    // Arithmetic
    /// `[a, b] -> [a + b]` (numeric addition or string concatenation)
    Add = 9,
    /// `[a, b] -> [a - b]`
    Sub = 10,
    /// `[a, b] -> [a * b]`
    Mul = 11,
    /// `[a, b] -> [a / b]`
    Div = 12,
    /// `[a, b] -> [a % b]`
    Mod = 13,

    // Bitwise
    /// `[a, b] -> [a & b]`
    BitAnd = 14,
    /// `[a, b] -> [a | b]`
    BitOr = 15,
    /// `[a, b] -> [a ^ b]`
    BitXor = 16,
    /// `[a, b] -> [a << b]`
    Shl = 17,
    /// `[a, b] -> [a >> b]`
    Shr = 18,
    /// `[a, b] -> [a >>> b]`
    UShr = 19,
    /// `[a] -> [~a]`
    BitNot = 20,

    // Unary
    /// `[a] -> [!a]`
    Not = 21,
    /// `[a] -> [-a]`
    Negate = 22,
    /// `[a] -> [typeof a]`
    TypeOf = 23,

    // Comparison
    /// `[a, b] -> [a == b]`
    Eq = 24,
    /// `[a, b] -> [a != b]`
    Ne = 25,
    /// `[a, b] -> [a === b]`
    StrictEq = 26,
    /// `[a, b] -> [a !== b]`
    StrictNe = 27,
    /// `[a, b] -> [a > b]`
    Gt = 28,
    /// `[a, b] -> [a >= b]`
    Ge = 29,
    /// `[a, b] -> [a < b]`
    Lt = 30,
    /// `[a, b] -> [a <= b]`
    Le = 31,

    // Stack shuffling
    /// `[a] -> []`
    Pop = 32,
    /// `[a] -> [a, a]`
    Dup = 33,
    /// `[a, b] -> [b, a]`
    Swap = 34,

    // Bindings
    /// `[value] -> []`, declares the named binding in the current scope
    AllocLocal = 35,
    /// `[value] -> []`, assigns the nearest existing binding
    StoreLocal = 36,
    /// `[] -> [value]`, resolves a binding through the scope chain
    LoadLocal = 37,
    /// `[] -> [arg]`, operand: argument index
    LoadArg = 38,

    // Functions
    /// `[] -> [function]` over the next `size` instructions, also bound
    /// under its name in the current scope. Operands: name index, body size.
    FuncDecl = 39,
    /// `[] -> [function]` over the next `size` instructions. Operand: body size.
    FuncDeclExpr = 40,
    /// `[argN-1 .. arg0, callee] -> [result]`, operand: argument count
    Call = 41,

    // Objects
    /// `[] -> [array]`
    ArrAlloc = 42,
    /// `[] -> [object]`
    ObjAlloc = 43,
    /// `[obj, value] -> []`, operand: key string index
    ObjStore = 44,
    /// `[obj] -> [obj.key]`, operand: key string index
    ObjLoad = 45,
    /// `[obj, key] -> [obj[key]]`
    ObjLoadComputed = 46,
    /// `[value, obj, key] -> []`
    ObjStoreComputed = 47,

    // Control flow
    /// Ends the current function or module body
    Return = 48,
    /// Enters a block scope
    PushScope = 49,
    /// Leaves a block scope
    PopScope = 50,
    /// Jumps to an absolute instruction index
    Jump = 51,
    /// `[test] -> []`, jumps if `test` is falsy
    JumpIfFalse = 52,
    /// `[test] -> []`, jumps if `test` is truthy
    JumpIfTrue = 53,

    // Modules
    /// `[value] -> []`, writes `exports[name]`, operand: name string index
    Export = 54,

    // Symbol-keyed access and method calls
    /// `[obj, symbol] -> [obj[symbol]]`
    ObjLoadSymbol = 55,
    /// `[value, obj, symbol] -> []`
    ObjStoreSymbol = 56,
    /// `[argN-1 .. arg0, this, callee] -> [result]`, operand: argument count
    CallMethod = 57,
}

impl Opcode {
    /// Number of opcodes; also the size of the interpreter's dispatch table.
    pub const COUNT: usize = 58;

    /// Every opcode, in byte order.
    pub const ALL: [Opcode; Opcode::COUNT] = [
        Opcode::Nop,
        Opcode::LoadInt,
        Opcode::LoadDouble,
        Opcode::LoadString,
        Opcode::LoadUndefined,
        Opcode::LoadNull,
        Opcode::LoadTrue,
        Opcode::LoadFalse,
        Opcode::LoadThis,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::BitAnd,
        Opcode::BitOr,
        Opcode::BitXor,
        Opcode::Shl,
        Opcode::Shr,
        Opcode::UShr,
        Opcode::BitNot,
        Opcode::Not,
        Opcode::Negate,
        Opcode::TypeOf,
        Opcode::Eq,
        Opcode::Ne,
        Opcode::StrictEq,
        Opcode::StrictNe,
        Opcode::Gt,
        Opcode::Ge,
        Opcode::Lt,
        Opcode::Le,
        Opcode::Pop,
        Opcode::Dup,
        Opcode::Swap,
        Opcode::AllocLocal,
        Opcode::StoreLocal,
        Opcode::LoadLocal,
        Opcode::LoadArg,
        Opcode::FuncDecl,
        Opcode::FuncDeclExpr,
        Opcode::Call,
        Opcode::ArrAlloc,
        Opcode::ObjAlloc,
        Opcode::ObjStore,
        Opcode::ObjLoad,
        Opcode::ObjLoadComputed,
        Opcode::ObjStoreComputed,
        Opcode::Return,
        Opcode::PushScope,
        Opcode::PopScope,
        Opcode::Jump,
        Opcode::JumpIfFalse,
        Opcode::JumpIfTrue,
        Opcode::Export,
        Opcode::ObjLoadSymbol,
        Opcode::ObjStoreSymbol,
        Opcode::CallMethod,
    ];

    /// The encoded byte.
    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Decodes an opcode byte.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        Opcode::ALL.get(byte as usize).copied()
    }

    /// The operand shape that follows this opcode.
    pub fn operand_kind(self) -> OperandKind {
        match self {
            Opcode::LoadInt => OperandKind::Int32,
            Opcode::LoadDouble => OperandKind::Float64,
            Opcode::LoadString
            | Opcode::AllocLocal
            | Opcode::StoreLocal
            | Opcode::LoadLocal
            | Opcode::LoadArg
            | Opcode::FuncDeclExpr
            | Opcode::Call
            | Opcode::CallMethod
            | Opcode::ObjStore
            | Opcode::ObjLoad
            | Opcode::Jump
            | Opcode::JumpIfFalse
            | Opcode::JumpIfTrue
            | Opcode::Export => OperandKind::UInt16,
            Opcode::FuncDecl => OperandKind::TwoUInt16,
            _ => OperandKind::None,
        }
    }

    /// True if the (first) u16 operand indexes the string table.
    pub fn takes_string_operand(self) -> bool {
        matches!(
            self,
            Opcode::LoadString
                | Opcode::AllocLocal
                | Opcode::StoreLocal
                | Opcode::LoadLocal
                | Opcode::ObjStore
                | Opcode::ObjLoad
                | Opcode::Export
                | Opcode::FuncDecl
        )
    }

    /// True for jumps, whose operand is an absolute instruction index.
    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpIfFalse | Opcode::JumpIfTrue)
    }

    /// True for function declarations, which carry a body size.
    pub fn is_function_decl(self) -> bool {
        matches!(self, Opcode::FuncDecl | Opcode::FuncDeclExpr)
    }

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::LoadInt => "LD_INT",
            Opcode::LoadDouble => "LD_DOUBLE",
            Opcode::LoadString => "LD_STRING",
            Opcode::LoadUndefined => "LD_UNDF",
            Opcode::LoadNull => "LD_NULL",
            Opcode::LoadTrue => "LD_TRUE",
            Opcode::LoadFalse => "LD_FALSE",
            Opcode::LoadThis => "LD_THIS",
            Opcode::Add => "ADD",
            Opcode::Sub => "MINUS",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::BitAnd => "BINARY_AND",
            Opcode::BitOr => "BINARY_OR",
            Opcode::BitXor => "BINARY_XOR",
            Opcode::Shl => "BINARY_LSHFT",
            Opcode::Shr => "BINARY_RSHFT",
            Opcode::UShr => "BINARY_ZRSHFT",
            Opcode::BitNot => "BINARY_NOT",
            Opcode::Not => "NOT",
            Opcode::Negate => "NEGATE",
            Opcode::TypeOf => "TYPEOF",
            Opcode::Eq => "EQ",
            Opcode::Ne => "NEQ",
            Opcode::StrictEq => "TEQ",
            Opcode::StrictNe => "NTEQ",
            Opcode::Gt => "GT",
            Opcode::Ge => "GEQ",
            Opcode::Lt => "LT",
            Opcode::Le => "LEQ",
            Opcode::Pop => "POP",
            Opcode::Dup => "DUP",
            Opcode::Swap => "SWAP",
            Opcode::AllocLocal => "ALLOC_LOCAL",
            Opcode::StoreLocal => "STORE_LOCAL",
            Opcode::LoadLocal => "LOAD_LOCAL",
            Opcode::LoadArg => "LOAD_ARG",
            Opcode::FuncDecl => "FUNC_DECL",
            Opcode::FuncDeclExpr => "FUNC_DECL_E",
            Opcode::Call => "CALL",
            Opcode::ArrAlloc => "ARR_ALLOC",
            Opcode::ObjAlloc => "OBJ_ALLOC",
            Opcode::ObjStore => "OBJ_STORE",
            Opcode::ObjLoad => "OBJ_LOAD",
            Opcode::ObjLoadComputed => "OBJ_CLOAD",
            Opcode::ObjStoreComputed => "OBJ_CSTORE",
            Opcode::Return => "RETURN",
            Opcode::PushScope => "PUSH_SCOPE",
            Opcode::PopScope => "POP_SCOPE",
            Opcode::Jump => "JMP",
            Opcode::JumpIfFalse => "JMP_F",
            Opcode::JumpIfTrue => "JMP_T",
            Opcode::Export => "EXPORT",
            Opcode::ObjLoadSymbol => "OBJ_SLOAD",
            Opcode::ObjStoreSymbol => "OBJ_SSTORE",
            Opcode::CallMethod => "CALL_METHOD",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::from_byte(byte).ok_or(byte)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
