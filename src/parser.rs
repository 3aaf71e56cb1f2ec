//! Infix to postfix conversion (shunting-yard).

use crate::error::Error;
use crate::grammar::TokenKind;
use crate::lexer::Token;

/// Reorder `tokens` into Reverse Polish Notation.
///
/// Function calls come out as `args... ARGS FUNC`, where the `ARGS` marker
/// records whether the call had any argument at all. Commas stay in the
/// output to separate arguments, tagged with the call they belong to so
/// nested calls can't steal each other's arguments.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, Error> {
    let mut stack: Vec<Token> = Vec::new();
    let mut queue: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut have_args: Vec<bool> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            kind if kind.is_operand() => queue.push(token.clone()),
            TokenKind::Func => {
                stack.push(token.clone());
                // an empty call is followed directly by its closing parenthesis
                let next = tokens.get(i + 1).map(|t| t.kind);
                have_args.push(next != Some(TokenKind::RParent));
            }
            TokenKind::LParent => stack.push(token.clone()),
            TokenKind::Comma => {
                let call = loop {
                    match stack.last() {
                        Some(top) if top.kind == TokenKind::Func => break top.position,
                        Some(top) if top.kind == TokenKind::LParent => {
                            return Err(Error::Parentheses(
                                "Comma outside of function call".to_string(),
                            ))
                        }
                        Some(_) => queue.extend(stack.pop()),
                        None => {
                            return Err(Error::Parentheses(
                                "Comma outside of function call".to_string(),
                            ))
                        }
                    }
                };
                queue.push(token.clone().bound_to(call));
            }
            TokenKind::RParent => close_group(&mut stack, &mut queue, &mut have_args)?,
            kind => {
                if let Some(top) = stack.last() {
                    // a sign right after `^` belongs to the exponent
                    let signed_exponent = kind.is_unary() && top.kind == TokenKind::Power;
                    let right_assoc =
                        kind.is_right_associative() && kind.precedence() == top.precedence();
                    if !signed_exponent && !right_assoc {
                        while let Some(top) = stack.last() {
                            if kind.precedence() <= top.precedence() {
                                queue.extend(stack.pop());
                            } else {
                                break;
                            }
                        }
                    }
                }
                stack.push(token.clone());
            }
        }
    }

    while let Some(token) = stack.pop() {
        if matches!(token.kind, TokenKind::LParent | TokenKind::Func) {
            return Err(Error::Parentheses("Unbalanced parentheses".to_string()));
        }
        queue.push(token);
    }
    Ok(queue)
}

/// Pop operators back to the matching `(` or call.
fn close_group(
    stack: &mut Vec<Token>,
    queue: &mut Vec<Token>,
    have_args: &mut Vec<bool>,
) -> Result<(), Error> {
    loop {
        let top = stack
            .pop()
            .ok_or_else(|| Error::Parentheses("Unbalanced parentheses".to_string()))?;
        match top.kind {
            TokenKind::LParent => return Ok(()),
            TokenKind::Func => {
                let has_args = have_args.pop().unwrap_or(true);
                let marker = Token::new(top.position, TokenKind::Args, has_args.to_string());
                queue.push(marker.bound_to(top.position));
                queue.push(top);
                return Ok(());
            }
            _ => queue.push(top),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{render, rewrite_unary, tokenize};
    use crate::preprocess::preprocess;
    use crate::registry::Registry;

    fn rpn(expr: &str) -> Result<String, Error> {
        let registry = Registry::standard();
        let resolver = registry.resolver::<&str>(&[])?;
        let mut tokens = tokenize(&preprocess(expr), &resolver)?;
        rewrite_unary(&mut tokens);
        let queue = to_postfix(&tokens)?;
        Ok(queue.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" "))
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(rpn("2+3*4").unwrap(), "2 3 4 * +");
        assert_eq!(rpn("(2+3)*4").unwrap(), "2 3 + 4 *");
        assert_eq!(rpn("1-2-3").unwrap(), "1 2 - 3 -");
        assert_eq!(rpn("1<2==3>4").unwrap(), "1 2 < 3 4 > ==");
    }

    #[test]
    fn right_associative_operators() {
        assert_eq!(rpn("2^3^2").unwrap(), "2 3 2 ^ ^");
        assert_eq!(rpn("--1").unwrap(), "1 - -");
        assert_eq!(rpn("-3^2").unwrap(), "3 2 ^ -");
        assert_eq!(rpn("2^-1").unwrap(), "2 1 - ^");
    }

    #[test]
    fn function_calls_emit_marker_then_function() {
        assert_eq!(rpn("max(1,2)").unwrap(), "1 , 2 true max(");
        assert_eq!(rpn("int()").unwrap(), "false int(");
        assert_eq!(rpn("sin(1+2)").unwrap(), "1 2 + true sin(");
    }

    #[test]
    fn commas_are_bound_to_their_call() {
        let registry = Registry::standard();
        let resolver = registry.resolver::<&str>(&[]).unwrap();
        let tokens = tokenize("max(1,min(2,3))", &resolver).unwrap();
        let queue = to_postfix(&tokens).unwrap();
        let commas: Vec<Option<usize>> = queue
            .iter()
            .filter(|t| t.kind == TokenKind::Comma)
            .map(|t| t.call)
            .collect();
        assert_eq!(commas, vec![Some(0), Some(3)]);
        assert_eq!(render(&queue[..2]), "1:INTEGER  ,:COMMA");
    }

    #[test]
    fn unbalanced_parentheses() {
        assert!(matches!(rpn("(1+2"), Err(Error::Parentheses(_))));
        assert!(matches!(rpn("1+2)"), Err(Error::Parentheses(_))));
        assert!(matches!(rpn("max(1,2"), Err(Error::Parentheses(_))));
        assert!(matches!(rpn(")"), Err(Error::Parentheses(_))));
    }

    #[test]
    fn stray_commas() {
        assert!(matches!(rpn("1,2"), Err(Error::Parentheses(_))));
        assert!(matches!(rpn("(1,2)"), Err(Error::Parentheses(_))));
    }
}
