use crate::common::span::Span;
use crate::common::token::Token;
use crate::common::types::Type;
use chumsky::{input::ValueInput, prelude::*};

// Type suffix parser: `.i32`, `.bool`, `.V`, `.array.<type>` or `.<ClassName>`
pub fn type_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Type, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    recursive(|ty| {
        let array_type = just(Token::Ident("array"))
            .ignore_then(ty)
            .map(Type::array_of);

        let named_type = select! {
            Token::Ident("i32") => Type::Int32,
            Token::Ident("bool") => Type::Boolean,
            Token::Ident("V") => Type::Void,
            Token::Ident(name) => Type::class(name),
        };

        just(Token::Ctrl('.'))
            .ignore_then(array_type.or(named_type))
            .labelled("type")
    })
    .boxed()
}
