use super::types::type_parser;
use crate::backend::ir::{BinaryOp, CallKind, FieldRef, Instruction, NewTarget, Operand, UnaryOp};
use crate::common::span::Span;
use crate::common::token::Token;
use chumsky::{input::ValueInput, prelude::*};

// Operand parser: literals, variables, array elements and `this`
pub fn operand_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Operand, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    let ty = type_parser();

    recursive(|operand| {
        // The sign is lexed on its own, so `-1.i32` is `-`, `1`, `.i32`
        let literal = just(Token::Op("-"))
            .or_not()
            .then(select! { Token::Num(n) => n })
            .then(ty.clone())
            .try_map(|((sign, n), ty), span| {
                let value = if sign.is_some() { -n } else { n };
                i32::try_from(value)
                    .map(|value| Operand::Literal { value, ty })
                    .map_err(|_| {
                        Rich::custom(span, format!("literal `{}` does not fit in 32 bits", value))
                    })
            });

        // `this`, optionally annotated with the class type
        let this = just(Token::This)
            .ignore_then(ty.clone().or_not())
            .to(Operand::This);

        // a.i32 or a[i.i32].i32
        let index = operand.delimited_by(just(Token::Ctrl('[')), just(Token::Ctrl(']')));
        let variable = select! { Token::Ident(name) => name }
            .then(index.or_not())
            .then(ty)
            .map(|((name, index), ty)| Operand::Variable {
                name: name.to_string(),
                ty,
                index: index.map(Box::new),
            });

        choice((literal, this, variable)).labelled("operand")
    })
    .boxed()
}

// Field reference parser: `name.type`
pub fn field_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, FieldRef, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    select! { Token::Ident(name) => name.to_string() }
        .then(type_parser())
        .map(|(name, ty)| FieldRef { name, ty })
        .labelled("field")
}

// Expression parser: anything that may stand on the right of `:=`
pub fn expr_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Instruction, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    let operand = operand_parser();
    let ty = type_parser();
    let comma = just(Token::Ctrl(','));
    let open = just(Token::Ctrl('('));
    let close = just(Token::Ctrl(')'));
    let name = select! { Token::Ident(name) => name.to_string() };
    let method_name = select! { Token::Str(name) => name.to_string() };

    // Trailing call arguments: `, a.i32, b.i32`
    let args = comma
        .clone()
        .ignore_then(operand.clone())
        .repeated()
        .collect::<Vec<_>>();

    // invokestatic(Class, "name", args...).ret
    let static_call = just(Token::InvokeStatic)
        .ignore_then(
            name.clone()
                .then_ignore(comma.clone())
                .then(method_name.clone())
                .then(args.clone())
                .delimited_by(open.clone(), close.clone()),
        )
        .then(ty.clone())
        .map(|(((class, method), args), return_type)| Instruction::Call {
            kind: CallKind::Static { class },
            receiver: None,
            method,
            args,
            return_type,
        });

    // invokevirtual(receiver, "name", args...).ret and invokespecial
    let instance_call = select! {
        Token::InvokeVirtual => CallKind::Virtual,
        Token::InvokeSpecial => CallKind::Special,
    }
    .then(
        operand
            .clone()
            .then_ignore(comma.clone())
            .then(method_name)
            .then(args)
            .delimited_by(open.clone(), close.clone()),
    )
    .then(ty.clone())
    .map(
        |((kind, ((receiver, method), args)), return_type)| Instruction::Call {
            kind,
            receiver: Some(receiver),
            method,
            args,
            return_type,
        },
    );

    // new(array, size).array.T and new(Class).Class
    let new_array = just(Token::Ident("array"))
        .ignore_then(comma.clone())
        .ignore_then(operand.clone())
        .delimited_by(open.clone(), close.clone())
        .then(ty.clone())
        .try_map(|(size, ty), span| {
            let element = ty
                .element()
                .cloned()
                .ok_or_else(|| {
                    Rich::custom(span, format!("`new(array, ..)` of non-array type `{}`", ty))
                })?;
            Ok(Instruction::New {
                target: NewTarget::Array { element, size },
                ty,
            })
        });
    let new_object = name
        .delimited_by(open.clone(), close.clone())
        .then(ty.clone())
        .map(|(class, ty)| Instruction::New {
            target: NewTarget::Object { class },
            ty,
        });
    let new = just(Token::New).ignore_then(new_array.or(new_object));

    // getfield(object, name.T).T
    let getfield = just(Token::GetField)
        .ignore_then(
            operand
                .clone()
                .then_ignore(comma.clone())
                .then(field_parser())
                .delimited_by(open.clone(), close.clone()),
        )
        .then_ignore(ty.clone())
        .map(|(object, field)| Instruction::GetField { object, field });

    // arraylength(a.array.T).i32
    let arraylength = just(Token::ArrayLength)
        .ignore_then(operand.clone().delimited_by(open, close))
        .then_ignore(ty.clone())
        .map(|array| Instruction::ArrayLength { array });

    // !.bool a.bool and -.i32 x.i32
    let unary = select! {
        Token::Op("!") => UnaryOp::Not,
        Token::Op("-") => UnaryOp::Neg,
    }
    .then(ty.clone())
    .then(operand.clone())
    .map(|((op, ty), operand)| Instruction::UnaryOp { op, operand, ty });

    let binary_op = select! {
        Token::Op("+") => BinaryOp::Add,
        Token::Op("-") => BinaryOp::Sub,
        Token::Op("*") => BinaryOp::Mul,
        Token::Op("/") => BinaryOp::Div,
        Token::Op("<") => BinaryOp::Lt,
        Token::Op("<=") => BinaryOp::Le,
        Token::Op(">") => BinaryOp::Gt,
        Token::Op(">=") => BinaryOp::Ge,
        Token::Op("==") => BinaryOp::Eq,
        Token::Op("!=") => BinaryOp::Ne,
        Token::Op("&&") => BinaryOp::And,
        Token::Op("||") => BinaryOp::Or,
    };

    // lhs op.T rhs, or a lone operand
    let binary = operand
        .clone()
        .then(binary_op.then(ty).then(operand).or_not())
        .map(|(lhs, rest)| match rest {
            Some(((op, ty), rhs)) => Instruction::BinaryOp { op, lhs, rhs, ty },
            None => Instruction::SingleOperand(lhs),
        });

    choice((
        static_call,
        instance_call,
        new,
        getfield,
        arraylength,
        unary,
        binary,
    ))
    .labelled("expression")
    .boxed()
}
