use std::fmt;

// Tokens of the textual IR
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'src> {
    Num(i64),
    Str(&'src str),
    Ident(&'src str),
    Op(&'src str),
    Ctrl(char),
    // Keywords
    Import,
    Extends,
    Public,
    Private,
    Protected,
    Static,
    If,
    Goto,
    Ret,
    New,
    InvokeStatic,
    InvokeVirtual,
    InvokeSpecial,
    GetField,
    PutField,
    ArrayLength,
    This,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Op(s) => write!(f, "{s}"),
            Token::Ctrl(c) => write!(f, "{c}"),
            Token::Import => write!(f, "import"),
            Token::Extends => write!(f, "extends"),
            Token::Public => write!(f, "public"),
            Token::Private => write!(f, "private"),
            Token::Protected => write!(f, "protected"),
            Token::Static => write!(f, "static"),
            Token::If => write!(f, "if"),
            Token::Goto => write!(f, "goto"),
            Token::Ret => write!(f, "ret"),
            Token::New => write!(f, "new"),
            Token::InvokeStatic => write!(f, "invokestatic"),
            Token::InvokeVirtual => write!(f, "invokevirtual"),
            Token::InvokeSpecial => write!(f, "invokespecial"),
            Token::GetField => write!(f, "getfield"),
            Token::PutField => write!(f, "putfield"),
            Token::ArrayLength => write!(f, "arraylength"),
            Token::This => write!(f, "this"),
        }
    }
}
