use regex::Regex;

lazy_static::lazy_static! {
    static ref UNSUPPORTED: Regex = Regex::new(r"[^\w\s+\-*/^%<>=,.!()]").expect("valid regex");
    static ref TRAILING_COMMA: Regex = Regex::new(r",\s*\)").expect("valid regex");
}

/// Characters after which a number followed by `(` means multiplication.
fn is_boundary(c: char) -> bool {
    c.is_whitespace() || "+-*/^%<>=,(".contains(c)
}

/// Sanitize raw input before tokenizing.
///
/// Unsupported characters are dropped silently, implicit multiplication is
/// made explicit (`2(3)` and `(2)(3)` become `2*(3)` and `(2)*(3)`), and a
/// trailing comma inside a call is removed. Never fails.
pub fn preprocess(raw: &str) -> String {
    let cleaned = UNSUPPORTED.replace_all(raw, "");
    let explicit = insert_implicit_multiplication(&cleaned);
    TRAILING_COMMA.replace_all(&explicit, ")").into_owned()
}

fn insert_implicit_multiplication(expr: &str) -> String {
    let chars: Vec<char> = expr.chars().collect();
    let mut out = String::with_capacity(expr.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '(' && multiplies(&chars[..i]) {
            out.push('*');
        }
        out.push(c);
    }
    out
}

/// Whether the text before a `(` ends with a bare number or a closing parenthesis.
fn multiplies(before: &[char]) -> bool {
    if let Some(&last) = before.iter().rev().find(|c| !c.is_whitespace()) {
        if last == ')' {
            return true;
        }
    }

    let run = before
        .iter()
        .rev()
        .take_while(|c| c.is_ascii_digit() || **c == '.')
        .count();
    if run == 0 || !before[before.len() - run..].iter().any(|c| c.is_ascii_digit()) {
        return false;
    }
    match before.len().checked_sub(run + 1) {
        None => true,
        Some(j) => is_boundary(before[j]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_unsupported_characters() {
        assert_eq!(preprocess("2 $+ 3#"), "2 + 3");
        assert_eq!(preprocess("'\"@"), "");
    }

    #[test]
    fn implicit_multiplication_before_parenthesis() {
        assert_eq!(preprocess("2(3+4)"), "2*(3+4)");
        assert_eq!(preprocess("1+10(2)"), "1+10*(2)");
        assert_eq!(preprocess("max(1, 2(3))"), "max(1, 2*(3))");
        assert_eq!(preprocess("2(3(4))"), "2*(3*(4))");
        assert_eq!(preprocess("1.5(2)"), "1.5*(2)");
        assert_eq!(preprocess("(2)(3)"), "(2)*(3)");
        assert_eq!(preprocess("(2) (3)"), "(2) *(3)");
    }

    #[test]
    fn names_ending_in_digits_are_left_alone() {
        assert_eq!(preprocess("log2(8)"), "log2(8)");
        assert_eq!(preprocess("atan2(1,1)"), "atan2(1,1)");
    }

    #[test]
    fn trailing_comma_is_removed() {
        assert_eq!(preprocess("max(1,2,)"), "max(1,2)");
        assert_eq!(preprocess("max(1,2, )"), "max(1,2)");
    }
}
