use crate::error::Error;
use crate::grammar::{rules, TokenKind};
use crate::registry::Resolver;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Index in tokenizer output order; unchanged by later stages.
    pub position: usize,
    pub kind: TokenKind,
    pub text: String,
    /// For commas and argument markers in RPN output: position of the call they belong to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<usize>,
}

impl Token {
    pub fn new<T: Into<String>>(position: usize, kind: TokenKind, text: T) -> Self {
        Self { position, kind, text: text.into(), call: None }
    }

    pub fn precedence(&self) -> u8 {
        self.kind.precedence()
    }

    /// Name a function token refers to, without the call's opening parenthesis.
    pub fn name(&self) -> &str {
        self.text.strip_suffix('(').unwrap_or(&self.text)
    }

    pub(crate) fn bound_to(mut self, call: usize) -> Self {
        self.call = Some(call);
        self
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.text, self.kind.name())
    }
}

/// `text:KIND` pairs separated by two spaces, as printed by `--verbose`.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>().join("  ")
}

/// Cut `expr` into tokens, first matching grammar rule wins.
///
/// Function and constant names are checked against `resolver` here so an
/// unknown name fails before any evaluation happens.
pub fn tokenize(expr: &str, resolver: &Resolver<'_>) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < expr.len() {
        let rest = &expr[offset..];
        let (kind, len) = rules()
            .iter()
            .find_map(|rule| rule.match_len(rest).map(|len| (rule.kind, len)))
            .ok_or(Error::Tokenize { position: offset })?;

        if kind != TokenKind::Space {
            let token = Token::new(tokens.len(), kind, &rest[..len]);
            match kind {
                TokenKind::Func => {
                    resolver.resolve_function(token.name())?;
                }
                TokenKind::Const => {
                    resolver.resolve_constant(token.name())?;
                }
                _ => {}
            }
            tokens.push(token);
        }
        offset += len;
    }
    Ok(tokens)
}

/// Reclassify `+`/`-` as unary when they cannot be binary.
///
/// A sign is unary at the start of the expression or when the token before
/// it is not a number, a constant or a closing parenthesis.
pub fn rewrite_unary(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        let unary = match tokens[i].kind {
            TokenKind::Plus => TokenKind::UPlus,
            TokenKind::Minus => TokenKind::UMinus,
            _ => continue,
        };
        let after_value = i > 0
            && (tokens[i - 1].kind.is_operand() || tokens[i - 1].kind == TokenKind::RParent);
        if !after_value {
            tokens[i].kind = unary;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use TokenKind::*;

    fn kinds(expr: &str) -> Result<Vec<TokenKind>, Error> {
        let registry = Registry::standard();
        let resolver = registry.resolver::<&str>(&[])?;
        let mut tokens = tokenize(expr, &resolver)?;
        rewrite_unary(&mut tokens);
        Ok(tokens.into_iter().map(|t| t.kind).collect())
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(kinds("1 2.5 .5 3j 4J").unwrap(), vec![Integer, Float, Float, Complex, Complex]);
    }

    #[test]
    fn two_character_operators_win() {
        assert_eq!(
            kinds("1**2//3<=4>=5==6!=7").unwrap(),
            vec![Integer, Power, Integer, FDivide, Integer, Le, Integer, Ge, Integer, Equals, Integer, Ne, Integer]
        );
    }

    #[test]
    fn functions_keep_their_parenthesis() {
        let registry = Registry::standard();
        let resolver = registry.resolver::<&str>(&[]).unwrap();
        let tokens = tokenize("max(pi, math.e)", &resolver).unwrap();
        assert_eq!(tokens[0].text, "max(");
        assert_eq!(tokens[0].name(), "max");
        assert_eq!(tokens[1].kind, Const);
        assert_eq!(tokens[3].text, "math.e");
        assert_eq!(render(&tokens), "max(:FUNC  pi:CONST  ,:COMMA  math.e:CONST  ):RPARENT");
    }

    #[test]
    fn positions_follow_token_order_and_skip_spaces() {
        let registry = Registry::standard();
        let resolver = registry.resolver::<&str>(&[]).unwrap();
        let tokens = tokenize(" 1 +  2", &resolver).unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn unknown_names_fail_early() {
        assert_eq!(kinds("foo(1)"), Err(Error::UnknownSymbol("foo".to_string())));
        assert_eq!(kinds("1 + bar"), Err(Error::UnknownSymbol("bar".to_string())));
    }

    #[test]
    fn unmatched_input_reports_offset() {
        assert_eq!(kinds("1 + !"), Err(Error::Tokenize { position: 4 }));
    }

    #[test]
    fn unary_detection() {
        assert_eq!(kinds("-3+5").unwrap(), vec![UMinus, Integer, Plus, Integer]);
        assert_eq!(kinds("3*-2").unwrap(), vec![Integer, Times, UMinus, Integer]);
        assert_eq!(kinds("(-2)-1").unwrap(), vec![LParent, UMinus, Integer, RParent, Minus, Integer]);
        assert_eq!(kinds("max(1,+2)").unwrap(), vec![Func, Integer, Comma, UPlus, Integer, RParent]);
        assert_eq!(kinds("pi - -1").unwrap(), vec![Const, Minus, UMinus, Integer]);
    }
}
