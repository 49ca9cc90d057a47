/// Parsed PromQL expression.
///
/// Range durations, `offset`/`@` modifiers and vector matching clauses are accepted by the
/// parser but not represented: the Datadog side has no slot for them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric scalar literal.
    NumberLiteral(f64),
    /// String literal, only meaningful as a function argument.
    StringLiteral(String),
    /// `metric{label op "value", ...}`; `selectors` is empty for a bare metric name.
    MetricSelector {
        /// Metric name.
        metric: String,
        /// Label matchers in source order.
        selectors: Vec<Selector>,
    },
    /// `left op right`.
    BinaryOp {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOperator,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `func(body0, body1, ...)`.
    FunctionCall {
        /// Source function name.
        func: String,
        /// Arguments; the first one is the transformed series.
        body: Vec<Expr>,
    },
    /// `aggregator by (labels) (body)`.
    Aggregator {
        /// Aggregation operator name (`sum`, `avg`, ...).
        aggregator: String,
        /// Arguments; only the first one is used.
        body: Vec<Expr>,
        /// `by`/`without` clause.
        grouping: Grouping,
    },
}

/// One label matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Label name.
    pub label: String,
    /// Match operator.
    pub op: MatchOp,
    /// Unquoted value.
    pub value: String,
}

/// Label match operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `=~`
    Regex,
    /// `!~`
    NotRegex,
}

impl MatchOp {
    /// Source spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Regex => "=~",
            Self::NotRegex => "!~",
        }
    }
}

/// Aggregation grouping clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Grouping {
    /// No clause.
    #[default]
    None,
    /// `by (labels)`
    By(Vec<String>),
    /// `without (labels)`
    Without(Vec<String>),
}

/// Binary operators, in PromQL spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
    /// `atan2`
    Atan2,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `and`
    And,
    /// `or`
    Or,
    /// `unless`
    Unless,
}

impl BinaryOperator {
    /// Source spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
            Self::Atan2 => "atan2",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::And => "and",
            Self::Or => "or",
            Self::Unless => "unless",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And | Self::Unless => 2,
            Self::Eq | Self::Ne | Self::Gt | Self::Lt | Self::Ge | Self::Le => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::Mod | Self::Atan2 => 5,
            Self::Pow => 6,
        }
    }

    /// `^` is the only right-associative operator.
    pub fn is_right_assoc(self) -> bool {
        matches!(self, Self::Pow)
    }

    /// Operators spelled as words need surrounding whitespace when concatenated.
    pub fn is_word(self) -> bool {
        matches!(self, Self::Atan2 | Self::And | Self::Or | Self::Unless)
    }
}
