use super::stmt::{BodyItem, stmt_parser};
use super::types::type_parser;
use crate::backend::error::BackendResult;
use crate::backend::ir::{AccessModifier, ClassUnit, Field, Method, MethodBuilder, Param};
use crate::common::span::{Span, Spanned};
use crate::common::token::Token;
use crate::common::types::Type;
use chumsky::{input::ValueInput, prelude::*};

/// A method as written, before its control flow and descriptor table exist
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub access: AccessModifier,
    pub is_static: bool,
    pub is_constructor: bool,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Vec<Spanned<BodyItem>>,
    pub span: Span,
}

impl MethodDecl {
    /// Lay the body out as an instruction list and derive the CFG and slots
    pub fn build(self, class: &str) -> BackendResult<Method> {
        let mut builder = MethodBuilder::new(class, self.name)
            .access(self.access)
            .returns(self.return_type);
        if self.is_static {
            builder = builder.static_method();
        }
        if self.is_constructor {
            builder = builder.constructor();
        }
        for param in self.params {
            builder = builder.param(param.name, param.ty);
        }

        for (item, _) in self.body {
            match item {
                BodyItem::Label(label) => {
                    builder.label(label);
                }
                BodyItem::Instr(instr) => {
                    builder.push(instr);
                }
            }
        }

        builder.build()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Member {
    Field(Field),
    Method(MethodDecl),
}

fn directive<'tokens, 'src: 'tokens, I>(
    name: &'static str,
) -> impl Parser<'tokens, I, (), extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    just(Token::Ctrl('.'))
        .ignore_then(just(Token::Ident(name)))
        .ignored()
}

fn access_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, AccessModifier, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    select! {
        Token::Public => AccessModifier::Public,
        Token::Private => AccessModifier::Private,
        Token::Protected => AccessModifier::Protected,
    }
    .or_not()
    .map(Option::unwrap_or_default)
}

// Method parser: `.method` and `.construct` declarations
pub fn method_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, MethodDecl, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    let ty = type_parser();
    let name = select! { Token::Ident(name) => name.to_string() };

    // Parse a single parameter: name.type
    let parameter = name
        .clone()
        .then(ty.clone())
        .map(|(name, ty)| Param { name, ty });

    let parameters = parameter
        .separated_by(just(Token::Ctrl(',')))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::Ctrl('(')), just(Token::Ctrl(')')));

    let body = stmt_parser()
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::Ctrl('{')), just(Token::Ctrl('}')));

    let kind = directive("method")
        .to(false)
        .or(directive("construct").to(true));

    kind.then(access_parser())
        .then(just(Token::Static).or_not())
        .then(name)
        .then(parameters)
        .then(ty)
        .then(body)
        .map_with(
            |((((((is_constructor, access), is_static), name), params), return_type), body), e| {
                MethodDecl {
                    name,
                    access,
                    is_static: is_static.is_some(),
                    is_constructor,
                    params,
                    return_type,
                    body,
                    span: e.span(),
                }
            },
        )
        .labelled("method")
        .boxed()
}

// Field parser: `.field public a.i32;`
fn class_field_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Field, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    directive("field")
        .ignore_then(access_parser())
        .then(select! { Token::Ident(name) => name.to_string() })
        .then(type_parser())
        .then_ignore(just(Token::Ctrl(';')))
        .map(|((access, name), ty)| Field { name, ty, access })
        .labelled("field declaration")
}

// Class parser: imports, the class header and its members
pub fn class_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, ClassUnit, extra::Err<Rich<'tokens, Token<'src>, Span>>>
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    let name = select! { Token::Ident(name) => name.to_string() };

    // a.b.C
    let path = name
        .clone()
        .separated_by(just(Token::Ctrl('.')))
        .at_least(1)
        .collect::<Vec<_>>()
        .map(|parts| parts.join("."));

    let import = just(Token::Import)
        .ignore_then(path.clone())
        .then_ignore(just(Token::Ctrl(';')));

    let member = class_field_parser()
        .map(Member::Field)
        .or(method_parser().map(Member::Method));

    import
        .repeated()
        .collect::<Vec<_>>()
        .then(name)
        .then(just(Token::Extends).ignore_then(path).or_not())
        .then(
            member
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::Ctrl('{')), just(Token::Ctrl('}'))),
        )
        .then_ignore(end())
        .try_map(|(((imports, name), super_class), members), _| {
            let mut class = ClassUnit::new(name);
            class.imports = imports;
            class.super_class = super_class;

            for member in members {
                match member {
                    Member::Field(field) => class.fields.push(field),
                    Member::Method(decl) => {
                        let span = decl.span;
                        let method = decl
                            .build(&class.name)
                            .map_err(|e| Rich::custom(span, e.to_string()))?;
                        class.methods.push(method);
                    }
                }
            }

            Ok(class)
        })
        .boxed()
}
