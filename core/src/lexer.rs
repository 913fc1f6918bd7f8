use std::fmt;

use crate::error::{PuppyError, Result};

// ============================================================================
// Tokens
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Number(f64),
    Symbol(String),
}

impl Token {
    fn symbol(name: &str) -> Self {
        Token::Symbol(name.to_string())
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Token::LParen | Token::RParen | Token::LBracket | Token::RBracket
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Symbol(s) => f.write_str(s),
        }
    }
}

// ============================================================================
// Lexer
// ============================================================================

const LAMBDA_ARROW: &str = "->";
const COMMENT: &str = ";";

/// Split source text into tokens.
///
/// `x ->` is rewritten to `lambda x`, and everything between a pair of `;`
/// tokens is dropped. Numbers are read as integers first, then floats; any
/// other word is a symbol.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let padded = input
        .replace('(', " ( ")
        .replace(')', " ) ")
        .replace('[', " [ ")
        .replace(']', " ] ");

    let mut tokens = Vec::new();
    let mut in_comment = false;

    for word in padded.split_whitespace() {
        if in_comment {
            in_comment = word != COMMENT;
            continue;
        }

        match word {
            COMMENT => in_comment = true,
            LAMBDA_ARROW => {
                let param = match tokens.pop() {
                    Some(token) if !Token::is_structural(&token) => token,
                    _ => {
                        return Err(PuppyError::syntax(
                            "'->' must follow a parameter name",
                        ));
                    }
                };
                tokens.push(Token::symbol("lambda"));
                tokens.push(param);
            }
            "(" => tokens.push(Token::LParen),
            ")" => tokens.push(Token::RParen),
            "[" => tokens.push(Token::LBracket),
            "]" => tokens.push(Token::RBracket),
            _ => tokens.push(classify(word)),
        }
    }

    Ok(tokens)
}

fn classify(word: &str) -> Token {
    // Rust's float parser also accepts words like `inf` and `NaN`; those
    // stay symbols.
    if !word.bytes().any(|b| b.is_ascii_digit()) {
        return Token::symbol(word);
    }

    if let Ok(n) = word.parse::<i64>() {
        Token::Number(n as f64)
    } else if let Ok(f) = word.parse::<f64>() {
        Token::Number(f)
    } else {
        Token::symbol(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Token {
        Token::Symbol(s.to_string())
    }

    #[test]
    fn test_brackets() {
        assert_eq!(
            tokenize("(())").unwrap(),
            vec![Token::LParen, Token::LParen, Token::RParen, Token::RParen]
        );
        assert_eq!(
            tokenize("([()])").unwrap(),
            vec![
                Token::LParen,
                Token::LBracket,
                Token::LParen,
                Token::RParen,
                Token::RBracket,
                Token::RParen
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("1 0.5 .3 2.").unwrap(),
            vec![
                Token::Number(1.0),
                Token::Number(0.5),
                Token::Number(0.3),
                Token::Number(2.0)
            ]
        );
        assert_eq!(tokenize("-7").unwrap(), vec![Token::Number(-7.0)]);
        assert_eq!(tokenize("1e3").unwrap(), vec![Token::Number(1000.0)]);
    }

    #[test]
    fn test_non_numeric_words_are_symbols() {
        assert_eq!(
            tokenize("inf nan - + f0o").unwrap(),
            vec![sym("inf"), sym("nan"), sym("-"), sym("+"), sym("f0o")]
        );
    }

    #[test]
    fn test_lambda_arrow() {
        assert_eq!(
            tokenize("x -> (+ x 1)").unwrap(),
            tokenize("lambda x ( + x 1 )").unwrap()
        );
    }

    #[test]
    fn test_dangling_arrow_is_syntax_error() {
        assert!(tokenize("-> x").is_err());
        assert!(tokenize("( -> x)").is_err());
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            tokenize("1 ; ignored (stuff) ; 2").unwrap(),
            vec![Token::Number(1.0), Token::Number(2.0)]
        );
        assert_eq!(tokenize("1 ; never closed").unwrap(), vec![Token::Number(1.0)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   \n\t").unwrap().is_empty());
    }
}
