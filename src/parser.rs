//! 布尔搜索查询的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   ├─ parse_or_expression()
//!   │    ├─ parse_and_expression()
//!   │    │    ├─ parse_unary()
//!   │    │    │    ├─ NOT → parse_unary() (右结合)
//!   │    │    │    └─ parse_primary()
//!   │    │    │         ├─ "(" → 分组表达式 (递归调用parse_or_expression)
//!   │    │    │         ├─ IDENT ":" → parse_field_value()
//!   │    │    │         │                ├─ PHRASE → Phrase
//!   │    │    │         │                ├─ IDENT  → Term
//!   │    │    │         │                └─ "(" → 分组表达式
//!   │    │    │         ├─ IDENT → Term
//!   │    │    │         └─ PHRASE → Phrase
//!   │    │    │
//!   │    │    └─ 遇到AND时，继续解析右侧unary表达式
//!   │    │
//!   │    └─ 遇到OR时，继续解析右侧AND表达式
//!   │
//!   └─ 期望 EOF
//! ```
//!
//! ## 语法优先级（从高到低）
//!
//! 1. **括号分组** `(expression)`
//! 2. **字段限定** `skill:python`, `skill:(python OR go)`
//! 3. **NOT操作** `NOT python`, `-python`
//! 4. **AND操作** `a AND b`, 或相邻的 `a b` (隐式AND)
//! 5. **OR操作** `a OR b`
//!
//! AND 和 OR 左结合，连续的同类运算收集到同一个 n 元节点中。
//!
//! ## 解析示例
//!
//! ```text
//! python OR (fastapi AND docker)
//! skill:python city:"Le Mans" -php
//! title:(backend OR "full-stack") AND NOT country:france
//! ```

use crate::ast::Node;
use crate::error::{ParseError, QueryError};
use crate::lexer::tokenize;
use crate::token::{Span, Token, TokenKind};

/// Default nesting limit for groups and negations.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Join adjacent operands with AND when no connector is written.
    pub implicit_and: bool,
    /// Maximum nesting of groups and negations before the parser gives up.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            implicit_and: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Inserts an `AND` token between two adjacent operands, e.g. `python docker`
/// or `java (spring OR quarkus)`.
pub fn insert_implicit_and<'a>(tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    let mut normalized: Vec<Token<'a>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(prev) = normalized.last() {
            if prev.ends_operand() && token.starts_operand() {
                normalized.push(Token::new(TokenKind::And, "AND", Span::empty(token.span.start)));
            }
        }
        normalized.push(*token);
    }
    normalized
}

pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 返回当前 token，不推进位置；越过末尾时返回合成的 EOF
    fn peek(&self) -> Token<'a> {
        match self.tokens.get(self.position) {
            Some(token) => *token,
            None => {
                let end = self.tokens.last().map(|t| t.span.end).unwrap_or(0);
                Token::new(TokenKind::Eof, "", Span::empty(end))
            }
        }
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Token<'a> {
        let token = self.peek();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    /// 检查当前 token 是否匹配给定类型
    fn match_token(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// 进入一层嵌套（分组或 NOT），超过上限时报错
    fn enter(&mut self, token: &Token<'a>) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::at_token(
                format!("query is nested too deeply (more than {} levels)", self.max_depth),
                token,
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let node = self.parse_or_expression()?;

        let token = self.peek();
        match token.kind {
            TokenKind::Eof => Ok(node),
            TokenKind::RParen => Err(ParseError::at_token("unmatched ')'", &token)),
            kind => Err(ParseError::at_token(
                format!("unexpected {kind} after end of query"),
                &token,
            )),
        }
    }

    /// 解析OR表达式 (最低优先级)
    ///
    /// 语法: `and_expr (OR and_expr)*`
    fn parse_or_expression(&mut self) -> Result<Node, ParseError> {
        let mut operands = vec![self.parse_and_expression()?];

        while self.match_token(TokenKind::Or) {
            self.advance(); // 消费 OR
            operands.push(self.parse_and_expression()?);
        }

        Ok(Node::or(operands))
    }

    /// 解析AND表达式
    ///
    /// 语法: `unary (AND unary)*`
    fn parse_and_expression(&mut self) -> Result<Node, ParseError> {
        let mut operands = vec![self.parse_unary()?];

        while self.match_token(TokenKind::And) {
            self.advance(); // 消费 AND
            operands.push(self.parse_unary()?);
        }

        Ok(Node::and(operands))
    }

    /// 解析NOT表达式 (右结合)
    ///
    /// 语法: `NOT unary | primary`
    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        if !self.match_token(TokenKind::Not) {
            return self.parse_primary();
        }

        let not = self.advance(); // 消费 NOT
        self.enter(&not)?;
        let child = self.parse_unary()?;
        self.leave();
        Ok(Node::not(child))
    }

    /// 解析括号内的分组，左括号尚未被消费
    fn parse_group(&mut self) -> Result<Node, ParseError> {
        let open = self.advance(); // 消费 (
        self.enter(&open)?;
        let node = self.parse_or_expression()?;
        self.leave();

        let close = self.peek();
        if close.kind != TokenKind::RParen {
            return Err(ParseError::at_token(
                format!(
                    "missing ')' to close '(' at position {}, found {}",
                    open.span.start, close.kind
                ),
                &close,
            ));
        }
        self.advance(); // 消费 )
        Ok(node)
    }

    /// 解析基础表达式
    ///
    /// 语法: `'(' or_expr ')' | IDENT (':' fieldvalue)? | PHRASE`
    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::LParen => self.parse_group(),
            TokenKind::Phrase => {
                self.advance();
                Ok(Node::phrase(token.text))
            }
            TokenKind::Ident => {
                self.advance();
                if self.match_token(TokenKind::Colon) {
                    self.advance(); // 消费 :
                    let value = self.parse_field_value(token.text)?;
                    Ok(Node::field(token.text, value))
                } else {
                    Ok(Node::term(token.text))
                }
            }
            TokenKind::Eof => Err(ParseError::at_token("unexpected end of query", &token)),
            TokenKind::RParen => Err(ParseError::at_token("unmatched ')'", &token)),
            kind => Err(ParseError::at_token(
                format!("expected a term, phrase or '(' but found {kind}"),
                &token,
            )),
        }
    }

    /// 解析字段值：短语、单个词或括号分组
    fn parse_field_value(&mut self, field: &str) -> Result<Node, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Phrase => {
                self.advance();
                Ok(Node::phrase(token.text))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Node::term(token.text))
            }
            TokenKind::LParen => self.parse_group(),
            kind => Err(ParseError::at_token(
                format!("invalid value for field '{field}': expected a term, phrase or '(' but found {kind}"),
                &token,
            )),
        }
    }
}

/// Parses a token stream with the given options.
pub fn parse_tokens(tokens: &[Token<'_>], options: ParserOptions) -> Result<Node, ParseError> {
    if options.implicit_and {
        let normalized = insert_implicit_and(tokens);
        Parser::new(&normalized).with_max_depth(options.max_depth).parse()
    } else {
        Parser::new(tokens).with_max_depth(options.max_depth).parse()
    }
}

/// Tokenizes and parses a query with default options.
pub fn parse(text: &str) -> Result<Node, QueryError> {
    parse_with(text, ParserOptions::default())
}

pub fn parse_with(text: &str, options: ParserOptions) -> Result<Node, QueryError> {
    let tokens = tokenize(text)?;
    Ok(parse_tokens(&tokens, options)?)
}
