use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semicolon,

    #[token("*")]
    Star,

    #[token("=")]
    Assign,

    #[token("<=")]
    #[token("<")]
    #[token(">=")]
    #[token(">")]
    #[token("==")]
    #[token("!=")]
    Compare,

    // Decimal or hex, optionally with an element width suffix.
    #[regex(r"[+-]?(0x[0-9a-fA-F]+|[0-9]+)(u8|u16|u32|u64)?")]
    Number,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

/// Bracket nesting at the end of `buffer`, or `None` when it contains
/// something the lexer does not recognize.
pub fn calculate_depth(buffer: &str) -> Option<usize> {
    let mut depth: isize = 0;

    for token in Token::lexer(buffer) {
        match token {
            Ok(Token::LBracket) => depth += 1,
            Ok(Token::RBracket) => depth -= 1,
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    Some(depth.max(0) as usize)
}
