use crate::error::Error;
use crate::grammar::{Action, TokenKind};
use crate::lexer::Token;
use crate::registry::Resolver;
use crate::types::Value;

/// Entries of the evaluation stack.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Value(Value),
    /// Argument separator of the call at this position.
    Comma(Option<usize>),
    HasArgs(bool),
}

fn pop_value(stack: &mut Vec<Operand>) -> Result<Value, Error> {
    match stack.pop() {
        Some(Operand::Value(v)) => Ok(v),
        _ => Err(Error::calculation()),
    }
}

/// Run an RPN sequence on a stack machine.
pub fn evaluate_rpn(rpn: &[Token], resolver: &Resolver<'_>) -> Result<Value, Error> {
    if rpn.is_empty() {
        return Err(Error::empty_expression());
    }

    let mut stack: Vec<Operand> = Vec::new();
    for element in rpn {
        match (element.kind, element.kind.action()) {
            (_, Action::Literal(parse)) => stack.push(Operand::Value(parse(&element.text)?)),
            (TokenKind::Const, _) => {
                stack.push(Operand::Value(resolver.resolve_constant(element.name())?))
            }
            (TokenKind::Comma, _) => stack.push(Operand::Comma(element.call)),
            (_, Action::Flag) => stack.push(Operand::HasArgs(element.text == "true")),
            (TokenKind::Func, _) => {
                let args = collect_args(&mut stack, element.position)?;
                let result = resolver.call(element.name(), args)?;
                stack.push(Operand::Value(result));
            }
            (_, Action::Unary(op)) => {
                let operand = pop_value(&mut stack)?;
                stack.push(Operand::Value(op(operand)?));
            }
            (_, Action::Binary(op)) => {
                let right = pop_value(&mut stack)?;
                let left = pop_value(&mut stack)?;
                stack.push(Operand::Value(op(left, right)?));
            }
            _ => return Err(Error::calculation()),
        }
    }

    let result = pop_value(&mut stack)?;
    if !stack.is_empty() {
        return Err(Error::calculation());
    }
    Ok(result)
}

/// Pop the arguments of the call at `position`, left to right.
fn collect_args(stack: &mut Vec<Operand>, position: usize) -> Result<Vec<Value>, Error> {
    let has_args = match stack.pop() {
        Some(Operand::HasArgs(b)) => b,
        _ => return Err(Error::calculation()),
    };

    let mut args = Vec::new();
    if has_args {
        args.push(pop_value(stack)?);
        while let Some(Operand::Comma(call)) = stack.last() {
            if *call != Some(position) {
                break;
            }
            stack.pop();
            args.push(pop_value(stack)?);
        }
    }
    args.reverse();
    Ok(args)
}
