use crate::promql::ast::{BinaryOperator, Expr, Grouping, MatchOp, Selector};
use crate::promql::error::ParseError;
use crate::promql::lexer::{Span, Token, TokenKind, lex};

/// Aggregation operators that take a single series argument.
const AGGREGATORS: &[&str] = &[
    "sum", "min", "max", "avg", "group", "stddev", "stdvar", "count",
];

/// Aggregations with a leading parameter. Their grouping clause is accepted and dropped.
const PARAMETRIC_AGGREGATORS: &[&str] = &["topk", "bottomk", "quantile", "count_values"];

/// Deepest expression tree the parser builds. Every later stage recurses over the tree.
const MAX_DEPTH: usize = 128;

/// Parse one PromQL expression.
pub fn parse(query: &str) -> Result<Expr, ParseError> {
    let tokens = lex(query)?;
    let mut p = Parser {
        src: query,
        tokens,
        pos: 0,
        depth: 0,
    };
    let e = p.parse_binary(1)?;
    if !matches!(p.peek(), TokenKind::Eof) {
        return Err(p.unexpected());
    }
    Ok(e)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if *self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.consume(kind.clone()) {
            return Ok(());
        }
        let span = self.span();
        Err(self.err(
            span.start,
            format!(
                "expected {kind:?}, found {:?} at bytes {}..{}",
                self.peek(),
                span.start,
                span.end
            ),
        ))
    }

    fn err(&self, offset: usize, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.src, offset, msg)
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            TokenKind::Eof => self.err(self.span().start, "unexpected end of input"),
            other => self.err(self.span().start, format!("unexpected token {other:?}")),
        }
    }

    fn at_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(s) if s.eq_ignore_ascii_case(kw))
    }

    fn consume_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.err(
                self.span().start,
                format!("expression nests deeper than {MAX_DEPTH} levels"),
            ));
        }
        Ok(())
    }

    fn peek_binary_op(&self) -> Option<BinaryOperator> {
        let op = match self.peek() {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Percent => BinaryOperator::Mod,
            TokenKind::Caret => BinaryOperator::Pow,
            TokenKind::EqEq => BinaryOperator::Eq,
            TokenKind::Ne => BinaryOperator::Ne,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::Ge => BinaryOperator::Ge,
            TokenKind::Le => BinaryOperator::Le,
            TokenKind::Ident(s) => match s.to_ascii_lowercase().as_str() {
                "and" => BinaryOperator::And,
                "or" => BinaryOperator::Or,
                "unless" => BinaryOperator::Unless,
                "atan2" => BinaryOperator::Atan2,
                _ => return None,
            },
            _ => return None,
        };
        Some(op)
    }

    /// Left-associative binary levels, loosest first. `^` is handled by [`Self::parse_pow`].
    fn parse_binary(&mut self, level: u8) -> Result<Expr, ParseError> {
        if level >= BinaryOperator::Pow.precedence() {
            return self.parse_unary();
        }
        let base = self.depth;
        let mut left = self.parse_binary(level + 1)?;
        while let Some(op) = self.peek_binary_op().filter(|op| op.precedence() == level) {
            // Each operator deepens the left spine by one node.
            self.descend()?;
            self.bump();
            self.skip_operator_modifiers()?;
            let right = self.parse_binary(level + 1)?;
            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        self.depth = base;
        Ok(left)
    }

    /// `bool`, `on(...)`/`ignoring(...)` and `group_left/right(...)` carry no meaning on the
    /// Datadog side.
    fn skip_operator_modifiers(&mut self) -> Result<(), ParseError> {
        self.consume_keyword("bool");
        if self.at_keyword("on") || self.at_keyword("ignoring") {
            self.bump();
            self.parse_label_list()?;
        }
        if self.at_keyword("group_left") || self.at_keyword("group_right") {
            self.bump();
            if matches!(self.peek(), TokenKind::LParen) {
                self.parse_label_list()?;
            }
        }
        Ok(())
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;
        let e = self.parse_unary_inner();
        self.depth -= 1;
        e
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, ParseError> {
        if self.consume(TokenKind::Minus) {
            let e = self.parse_unary()?;
            return Ok(match e {
                Expr::NumberLiteral(v) => Expr::NumberLiteral(-v),
                other => Expr::BinaryOp {
                    left: Box::new(Expr::NumberLiteral(-1.0)),
                    op: BinaryOperator::Mul,
                    right: Box::new(other),
                },
            });
        }
        if self.consume(TokenKind::Plus) {
            return self.parse_unary();
        }
        self.parse_pow()
    }

    fn parse_pow(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if !self.consume(TokenKind::Caret) {
            return Ok(base);
        }
        self.skip_operator_modifiers()?;
        let exp = self.parse_unary()?;
        Ok(Expr::BinaryOp {
            left: Box::new(base),
            op: BinaryOperator::Pow,
            right: Box::new(exp),
        })
    }

    /// Range, subquery, `offset` and `@` suffixes are consumed and dropped.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let e = self.parse_primary()?;
        loop {
            if let TokenKind::Range(range) = self.peek() {
                tracing::trace!(%range, "dropping range/subquery suffix");
                self.bump();
                continue;
            }
            if self.consume_keyword("offset") {
                self.consume(TokenKind::Minus);
                let t = self.bump();
                let TokenKind::Duration(offset) = t.kind else {
                    return Err(self.err(t.span.start, "expected duration after 'offset'"));
                };
                tracing::trace!(%offset, "dropping offset modifier");
                continue;
            }
            if self.consume(TokenKind::At) {
                self.consume(TokenKind::Minus);
                let t = self.bump();
                match t.kind {
                    TokenKind::Number(_) => {}
                    TokenKind::Ident(s) if s == "start" || s == "end" => {
                        self.expect(TokenKind::LParen)?;
                        self.expect(TokenKind::RParen)?;
                    }
                    _ => {
                        return Err(self.err(t.span.start, "expected timestamp after '@'"));
                    }
                }
                continue;
            }
            break;
        }
        Ok(e)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Number(v) => {
                self.bump();
                Ok(Expr::NumberLiteral(v))
            }
            TokenKind::Str(s) => {
                self.bump();
                Ok(Expr::StringLiteral(s))
            }
            TokenKind::LParen => {
                self.bump();
                let e = self.parse_binary(1)?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            TokenKind::LBrace => {
                let start = self.span().start;
                self.bump();
                let mut selectors = self.parse_matchers()?;
                let Some(idx) = selectors
                    .iter()
                    .position(|s| s.label == "__name__" && s.op == MatchOp::Equal)
                else {
                    return Err(self.err(start, "vector selector must contain a metric name"));
                };
                let metric = selectors.remove(idx).value;
                Ok(Expr::MetricSelector { metric, selectors })
            }
            TokenKind::Ident(name) => {
                self.bump();
                self.parse_ident_expr(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_ident_expr(&mut self, name: String) -> Result<Expr, ParseError> {
        let lower = name.to_ascii_lowercase();
        let grouping_next = self.at_keyword("by") || self.at_keyword("without");
        let call_next = matches!(self.peek(), TokenKind::LParen);

        if AGGREGATORS.contains(&lower.as_str()) && (call_next || grouping_next) {
            return self.parse_aggregation(lower);
        }
        if PARAMETRIC_AGGREGATORS.contains(&lower.as_str()) && (call_next || grouping_next) {
            return self.parse_parametric_aggregation(name);
        }
        if call_next {
            self.bump();
            let body = self.parse_args()?;
            return Ok(Expr::FunctionCall { func: name, body });
        }
        match lower.as_str() {
            "inf" => return Ok(Expr::NumberLiteral(f64::INFINITY)),
            "nan" => return Ok(Expr::NumberLiteral(f64::NAN)),
            _ => {}
        }

        let selectors = if self.consume(TokenKind::LBrace) {
            self.parse_matchers()?
        } else {
            Vec::new()
        };
        Ok(Expr::MetricSelector {
            metric: name,
            selectors,
        })
    }

    fn parse_aggregation(&mut self, aggregator: String) -> Result<Expr, ParseError> {
        let mut grouping = self.parse_grouping()?;
        let open = self.span().start;
        self.expect(TokenKind::LParen)?;
        let body = self.parse_args()?;
        if body.is_empty() {
            return Err(self.err(open, format!("{aggregator} requires an argument")));
        }
        if grouping == Grouping::None {
            grouping = self.parse_grouping()?;
        }
        Ok(Expr::Aggregator {
            aggregator,
            body,
            grouping,
        })
    }

    /// `topk`-style aggregations become plain calls; Datadog formulas have no grouping slot.
    fn parse_parametric_aggregation(&mut self, func: String) -> Result<Expr, ParseError> {
        let mut grouping = self.parse_grouping()?;
        self.expect(TokenKind::LParen)?;
        let body = self.parse_args()?;
        if grouping == Grouping::None {
            grouping = self.parse_grouping()?;
        }
        if grouping != Grouping::None {
            tracing::trace!(%func, ?grouping, "dropping grouping of parameterised aggregation");
        }
        Ok(Expr::FunctionCall { func, body })
    }

    fn parse_grouping(&mut self) -> Result<Grouping, ParseError> {
        if self.consume_keyword("by") {
            return Ok(Grouping::By(self.parse_label_list()?));
        }
        if self.consume_keyword("without") {
            return Ok(Grouping::Without(self.parse_label_list()?));
        }
        Ok(Grouping::None)
    }

    fn parse_label_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut labels = Vec::new();
        loop {
            if self.consume(TokenKind::RParen) {
                return Ok(labels);
            }
            let t = self.bump();
            match t.kind {
                TokenKind::Ident(s) | TokenKind::Str(s) => labels.push(s),
                other => {
                    return Err(self.err(
                        t.span.start,
                        format!("expected label name, found {other:?}"),
                    ));
                }
            }
            if !self.consume(TokenKind::Comma) {
                self.expect(TokenKind::RParen)?;
                return Ok(labels);
            }
        }
    }

    /// Matchers up to and including the closing `}`; the opening brace is already consumed.
    fn parse_matchers(&mut self) -> Result<Vec<Selector>, ParseError> {
        let mut out = Vec::new();
        loop {
            if self.consume(TokenKind::RBrace) {
                return Ok(out);
            }
            let t = self.bump();
            let label = match t.kind {
                TokenKind::Ident(s) | TokenKind::Str(s) => s,
                other => {
                    return Err(self.err(
                        t.span.start,
                        format!("expected label name, found {other:?}"),
                    ));
                }
            };
            let t = self.bump();
            let op = match t.kind {
                TokenKind::Assign => MatchOp::Equal,
                TokenKind::Ne => MatchOp::NotEqual,
                TokenKind::ReMatch => MatchOp::Regex,
                TokenKind::NotReMatch => MatchOp::NotRegex,
                other => {
                    return Err(self.err(
                        t.span.start,
                        format!("expected label match operator, found {other:?}"),
                    ));
                }
            };
            let t = self.bump();
            let TokenKind::Str(value) = t.kind else {
                return Err(self.err(t.span.start, "expected quoted label value"));
            };
            out.push(Selector { label, op, value });

            if !self.consume(TokenKind::Comma) {
                self.expect(TokenKind::RBrace)?;
                return Ok(out);
            }
        }
    }

    /// Call arguments up to and including the closing `)`; the opening paren is consumed.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_binary(1)?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/promql/parser.rs"]
mod tests;
