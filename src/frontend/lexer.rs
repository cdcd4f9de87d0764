use crate::common::span::{Span, Spanned};
use crate::common::token::Token;
use chumsky::prelude::*;

// Lexer
pub fn lexer<'src>()
-> impl Parser<'src, &'src str, Vec<Spanned<Token<'src>>>, extra::Err<Rich<'src, char, Span>>> {
    // A parser for numbers; the sign is a separate token
    let num = text::int(10).to_slice().try_map(|digits: &str, span| {
        digits
            .parse::<i64>()
            .map(Token::Num)
            .map_err(|_| Rich::custom(span, "integer literal is too large"))
    });

    // A parser for string literals (method names in calls)
    let string = just('"')
        .ignore_then(none_of("\"\n").repeated().to_slice())
        .then_ignore(just('"'))
        .map(Token::Str);

    // A parser for operators
    let op = choice((
        just(":="),
        just("=="),
        just("!="),
        just("<="),
        just(">="),
        just("&&"),
        just("||"),
        just("<"),
        just(">"),
        just("+"),
        just("-"),
        just("*"),
        just("/"),
        just("!"),
    ))
    .map(Token::Op);

    // A parser for control characters
    let ctrl = one_of("(){}[];,:.").map(Token::Ctrl);

    // Identifiers may contain digits and `$` after the first character
    let ident = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_' || *c == '$')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
                .repeated(),
        )
        .to_slice()
        .map(|ident: &str| match ident {
            "import" => Token::Import,
            "extends" => Token::Extends,
            "public" => Token::Public,
            "private" => Token::Private,
            "protected" => Token::Protected,
            "static" => Token::Static,
            "if" => Token::If,
            "goto" => Token::Goto,
            "ret" => Token::Ret,
            "new" => Token::New,
            "invokestatic" => Token::InvokeStatic,
            "invokevirtual" => Token::InvokeVirtual,
            "invokespecial" => Token::InvokeSpecial,
            "getfield" => Token::GetField,
            "putfield" => Token::PutField,
            "arraylength" => Token::ArrayLength,
            "this" => Token::This,
            _ => Token::Ident(ident),
        });

    let token = num.or(string).or(op).or(ctrl).or(ident);

    let comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .padded();

    token
        .map_with(|tok, e| (tok, e.span()))
        .padded_by(comment.repeated())
        .padded()
        // If we encounter an error, skip and attempt to lex the next character as a token instead
        .recover_with(skip_then_retry_until(any().ignored(), end()))
        .repeated()
        .collect()
}
