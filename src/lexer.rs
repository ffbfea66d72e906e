//! 布尔搜索查询的词法分析器

use crate::error::LexError;
use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
    /// 出错后不再产出 token
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            failed: false,
        }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token::new(kind, &self.input[start..self.position], Span::new(start, self.position))
    }

    /// 读取双引号包围的短语
    /// 注意：开始的引号已经被调用者消费
    fn read_phrase(&mut self, start: usize) -> Result<Token<'a>, LexError> {
        let content_start = self.position;
        loop {
            match self.bump() {
                Some('"') => break,
                Some(_) => {}
                None => return Err(LexError::unterminated_phrase(start)),
            }
        }
        // 不含结束引号
        let content = &self.input[content_start..self.position - 1];
        Ok(Token::new(TokenKind::Phrase, content, Span::new(start, self.position)))
    }

    /// 读取标识符或关键字
    /// 标识符由 `[A-Za-z0-9_\-./*]` 组成，内部的连字符不会被当作否定
    fn read_identifier(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                self.bump();
            } else {
                break;
            }
        }
        let literal = &self.input[start..self.position];
        self.token(match_keyword(literal), start)
    }
}

/// 标识符允许的字符
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '*')
}

fn match_keyword(s: &str) -> TokenKind {
    if s.eq_ignore_ascii_case("and") {
        TokenKind::And
    } else if s.eq_ignore_ascii_case("or") {
        TokenKind::Or
    } else if s.eq_ignore_ascii_case("not") {
        TokenKind::Not
    } else {
        TokenKind::Ident
    }
}

/// Decides whether the `-` at byte offset `index` is the negation shorthand.
///
/// Both sides are checked: the next character must exist and be neither
/// whitespace nor `)`, and the previous one must be start of input,
/// whitespace or `(`. This keeps `full-stack`, `a-b` and a lone `- x` as plain
/// identifiers while `-python` and `(-python)` negate.
pub fn is_negation_minus(input: &str, index: usize) -> bool {
    if input.as_bytes().get(index) != Some(&b'-') {
        return false;
    }

    match input[index + 1..].chars().next() {
        None => return false,
        Some(next) if next.is_whitespace() || next == ')' => return false,
        Some(_) => {}
    }

    match input[..index].chars().next_back() {
        None => true,
        Some(prev) => prev.is_whitespace() || prev == '(',
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_whitespace();
        let start = self.position;

        let Some(c) = self.peek() else {
            return None; // 到达输入末尾
        };

        let result = match c {
            '(' => {
                self.bump();
                Ok(self.token(TokenKind::LParen, start))
            }
            ')' => {
                self.bump();
                Ok(self.token(TokenKind::RParen, start))
            }
            ':' => {
                self.bump();
                Ok(self.token(TokenKind::Colon, start))
            }
            '"' => {
                self.bump();
                self.read_phrase(start)
            }
            '-' if is_negation_minus(self.input, start) => {
                self.bump();
                Ok(self.token(TokenKind::Not, start))
            }
            c if is_ident_char(c) => Ok(self.read_identifier(start)),
            c => Err(LexError::unexpected_character(c, start)),
        };

        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// 将整个查询切分为 token，末尾总是追加 `Eof`
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut tokens = Lexer::new(input).collect::<Result<Vec<_>, _>>()?;
    tokens.push(Token::new(TokenKind::Eof, "", Span::empty(input.len())));
    Ok(tokens)
}
