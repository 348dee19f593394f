use logos::Logos;
use nanoseed::emitter::Register;
use nu_ansi_term::{Color, Style};
use reedline::{StyledText, ValidationResult, Validator};

use crate::lexer::{Token, calculate_depth};

fn color(token: Result<Token, ()>, text: &str) -> Color {
    match token {
        Ok(Token::Ident) if Register::lookup(text).is_some() => Color::Yellow,
        Ok(Token::Ident) => Color::Red,
        Ok(Token::Number) => Color::Cyan,
        Ok(Token::Compare) | Ok(Token::Assign) => Color::Magenta,
        Ok(Token::Star) => Color::Blue,
        Ok(Token::LBracket | Token::RBracket | Token::Semicolon) => Color::White,
        Err(()) => Color::LightRed,
    }
}

/// Colors registers, numbers and operators; unknown names stand out.
pub struct Highlighter;

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _: usize) -> StyledText {
        let mut output = StyledText::new();
        let plain = Style::new().fg(Color::White);
        let mut last = 0;

        for (token, span) in Token::lexer(line).spanned() {
            if span.start > last {
                output.push((plain, line[last..span.start].to_string()));
            }
            let text = &line[span.clone()];
            output.push((Style::new().fg(color(token, text)), text.to_string()));
            last = span.end;
        }
        if last < line.len() {
            output.push((plain, line[last..].to_string()));
        }

        output
    }
}

/// Keeps reading lines while a bracket is open.
pub struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        match calculate_depth(line) {
            Some(depth) if depth > 0 => ValidationResult::Incomplete,
            _ => ValidationResult::Complete,
        }
    }
}
