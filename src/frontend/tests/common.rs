use crate::common::span::Spanned;
use crate::common::token::Token;
use crate::frontend::lexer::lexer;
use chumsky::prelude::*;

pub fn parse_tokens(src: &str) -> Vec<Spanned<Token<'_>>> {
    lexer().parse(src).into_result().unwrap()
}

/// The example class used across the reader tests
pub const SIMPLE: &str = r#"
import io;
import a.b.Base;

Simple extends Base {
    .field public a.i32;
    .field private flags.array.bool;

    .construct Simple().V {
        invokespecial(this, "<init>").V;
    }

    .method public static main(args.array.String).V {
        x.i32 :=.i32 1.i32;
        if (x.i32 <.bool 0.i32) goto L1;
        x.i32 :=.i32 x.i32 +.i32 5.i32;
    L1:
        invokestatic(io, "println", x.i32).V;
        ret.V;
    }

    .method get(i.i32).i32 {
        t.i32 :=.i32 getfield(this, a.i32).i32;
        r.i32 :=.i32 t.i32 *.i32 i.i32;
        ret.i32 r.i32;
    }
}
"#;
