use super::expr::{expr_parser, field_parser, operand_parser};
use super::types::type_parser;
use crate::backend::ir::Instruction;
use crate::common::span::{Span, Spanned};
use crate::common::token::Token;
use chumsky::{input::ValueInput, prelude::*};

/// One line of a method body
#[derive(Clone, Debug, PartialEq)]
pub enum BodyItem {
    /// `L1:` marks the next instruction
    Label(String),
    Instr(Instruction),
}

// Statement parser
pub fn stmt_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Spanned<BodyItem>, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    let expr = expr_parser();
    let operand = operand_parser();
    let ty = type_parser();
    let semi = just(Token::Ctrl(';'));
    let comma = just(Token::Ctrl(','));
    let label_name = select! { Token::Ident(name) => name.to_string() };

    let label = label_name
        .clone()
        .then_ignore(just(Token::Ctrl(':')))
        .map(BodyItem::Label);

    // dest.T :=.T rhs;
    let assign = operand
        .clone()
        .then_ignore(just(Token::Op(":=")))
        .then(ty.clone())
        .then(expr.clone())
        .then_ignore(semi.clone())
        .map(|((dest, ty), rhs)| {
            BodyItem::Instr(Instruction::Assign {
                dest,
                ty,
                rhs: Box::new(rhs),
            })
        });

    // if (cond) goto L;
    let branch = just(Token::If)
        .ignore_then(
            expr.clone()
                .delimited_by(just(Token::Ctrl('(')), just(Token::Ctrl(')'))),
        )
        .then_ignore(just(Token::Goto))
        .then(label_name.clone())
        .then_ignore(semi.clone())
        .map(|(cond, label)| BodyItem::Instr(Instruction::branch(cond, label)));

    let goto = just(Token::Goto)
        .ignore_then(label_name)
        .then_ignore(semi.clone())
        .map(|label| BodyItem::Instr(Instruction::goto(label)));

    // ret.T value; or ret.V;
    let ret = just(Token::Ret)
        .ignore_then(ty.clone())
        .then(operand.clone().or_not())
        .then_ignore(semi.clone())
        .map(|(ty, value)| BodyItem::Instr(Instruction::Return { value, ty }));

    // putfield(object, name.T, value).V;
    let putfield = just(Token::PutField)
        .ignore_then(
            operand
                .clone()
                .then_ignore(comma.clone())
                .then(field_parser())
                .then_ignore(comma)
                .then(operand)
                .delimited_by(just(Token::Ctrl('(')), just(Token::Ctrl(')'))),
        )
        .then_ignore(ty)
        .then_ignore(semi.clone())
        .map(|((object, field), value)| {
            BodyItem::Instr(Instruction::PutField {
                object,
                field,
                value,
            })
        });

    // A call (or any expression) whose value is dropped
    let expr_stmt = expr.then_ignore(semi).map(BodyItem::Instr);

    choice((label, branch, goto, ret, putfield, assign, expr_stmt))
        .map_with(|item, e| (item, e.span()))
        .labelled("statement")
        .boxed()
}
