use std::fmt;

use crate::Token;

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<'a> {
    Null,
    Boolean(bool),
    /// The number exactly as it was written.
    Number(Token<'a>),
    /// The unescaped content of a single or double quoted string.
    String(Token<'a>),
}

impl<'a> Value<'a> {
    /// Returns the number as an integer if it was written as one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(token) if token.lexeme().bytes().all(|b| b.is_ascii_digit()) => {
                token.lexeme().parse().ok()
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LowerThan,
    LowerThanOrEqual,
    In,
    Match,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Equal => "==",
            Op::NotEqual => "!=",
            Op::GreaterThan => ">",
            Op::GreaterThanOrEqual => ">=",
            Op::LowerThan => "<",
            Op::LowerThanOrEqual => "<=",
            Op::In => "in",
            Op::Match => "match",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Rem => "%",
            Op::Pow => "**",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayElement<'a> {
    pub value: Node<'a>,
    pub is_splat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectAttribute<'a> {
    /// `"name": value`, or a bare `value` whose name is derived from the expression.
    Value { name: Token<'a>, value: Node<'a> },
    /// `...value`
    Splat(Node<'a>),
    /// `condition => value`
    ConditionalSplat { condition: Node<'a>, value: Node<'a> },
}

/// The tag of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Everything,
    This,
    Parent,
    Parameter,
    Value,
    Array,
    Object,
    Group,
    AccessAttribute,
    AccessElement,
    Slice,
    Filter,
    Projection,
    ArrayCoerce,
    Deref,
    FuncCall,
    PipeFuncCall,
    And,
    Or,
    Not,
    Neg,
    Pos,
    OpCall,
    InRange,
    Pair,
    Asc,
    Desc,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    /// `*`
    Everything,
    /// `@`
    This,
    /// `^`, `^.^`, ...
    Parent { levels: usize },
    /// `$name`
    Parameter(Token<'a>),
    Value(Value<'a>),
    Array(Vec<ArrayElement<'a>>),
    Object(Vec<ObjectAttribute<'a>>),
    Group(Box<Self>),
    AccessAttribute { base: Option<Box<Self>>, name: Token<'a> },
    AccessElement { base: Box<Self>, index: i64 },
    Slice { base: Box<Self>, left: i64, right: i64, inclusive: bool },
    Filter { base: Box<Self>, expr: Box<Self> },
    /// `expr` is always a [`Node::Object`].
    Projection { base: Box<Self>, expr: Box<Self> },
    ArrayCoerce { base: Box<Self> },
    Deref { base: Box<Self>, attribute: Option<Token<'a>> },
    FuncCall { namespace: Option<Token<'a>>, name: Token<'a>, args: Vec<Self> },
    PipeFuncCall { base: Box<Self>, name: Token<'a>, args: Vec<Self> },
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    Not(Box<Self>),
    Neg(Box<Self>),
    Pos(Box<Self>),
    OpCall { op: Op, left: Box<Self>, right: Box<Self> },
    InRange { base: Box<Self>, left: Box<Self>, right: Box<Self>, inclusive: bool },
    Pair { condition: Box<Self>, value: Box<Self> },
    Asc(Box<Self>),
    Desc(Box<Self>),
}

impl<'a> Node<'a> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Everything => NodeType::Everything,
            Node::This => NodeType::This,
            Node::Parent { .. } => NodeType::Parent,
            Node::Parameter(_) => NodeType::Parameter,
            Node::Value(_) => NodeType::Value,
            Node::Array(_) => NodeType::Array,
            Node::Object(_) => NodeType::Object,
            Node::Group(_) => NodeType::Group,
            Node::AccessAttribute { .. } => NodeType::AccessAttribute,
            Node::AccessElement { .. } => NodeType::AccessElement,
            Node::Slice { .. } => NodeType::Slice,
            Node::Filter { .. } => NodeType::Filter,
            Node::Projection { .. } => NodeType::Projection,
            Node::ArrayCoerce { .. } => NodeType::ArrayCoerce,
            Node::Deref { .. } => NodeType::Deref,
            Node::FuncCall { .. } => NodeType::FuncCall,
            Node::PipeFuncCall { .. } => NodeType::PipeFuncCall,
            Node::And(..) => NodeType::And,
            Node::Or(..) => NodeType::Or,
            Node::Not(_) => NodeType::Not,
            Node::Neg(_) => NodeType::Neg,
            Node::Pos(_) => NodeType::Pos,
            Node::OpCall { .. } => NodeType::OpCall,
            Node::InRange { .. } => NodeType::InRange,
            Node::Pair { .. } => NodeType::Pair,
            Node::Asc(_) => NodeType::Asc,
            Node::Desc(_) => NodeType::Desc,
        }
    }

    /// Returns the predicate of a `base[predicate]` filter.
    pub fn filter_expr(&self) -> Option<&Self> {
        match self {
            Node::Filter { expr, .. } => Some(expr),
            _ => None,
        }
    }

    /// Returns the value if the node is an integer literal, possibly signed.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Node::Value(value) => value.as_integer(),
            Node::Neg(inner) => inner.as_integer().and_then(i64::checked_neg),
            Node::Pos(inner) => inner.as_integer(),
            _ => None,
        }
    }

    /// The attribute name an object gives to this expression when no name is written.
    pub fn attribute_name(&self) -> Option<&Token<'a>> {
        match self {
            Node::AccessAttribute { name, .. } => Some(name),
            Node::Deref { attribute: Some(name), .. } => Some(name),
            Node::Deref { base, attribute: None }
            | Node::AccessElement { base, .. }
            | Node::Slice { base, .. }
            | Node::Filter { base, .. }
            | Node::Projection { base, .. }
            | Node::ArrayCoerce { base }
            | Node::PipeFuncCall { base, .. } => base.attribute_name(),
            _ => None,
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, els: &[T]) -> fmt::Result {
    for (i, el) in els.iter().enumerate() {
        if i != 0 {
            write!(f, ", ")?;
        }
        write!(f, "{el}")?;
    }
    Ok(())
}

impl<'a> fmt::Display for Node<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Everything => write!(f, "*"),
            Node::This => write!(f, "@"),
            Node::Parent { levels } => {
                write!(f, "^")?;
                for _ in 1..*levels {
                    write!(f, ".^")?;
                }
                Ok(())
            }
            Node::Parameter(name) => write!(f, "${name}"),
            Node::Value(value) => write!(f, "{value}"),
            Node::Array(els) => {
                write!(f, "[")?;
                write_list(f, els)?;
                write!(f, "]")
            }
            Node::Object(attributes) => {
                write!(f, "{{")?;
                write_list(f, attributes)?;
                write!(f, "}}")
            }
            Node::Group(inner) => write!(f, "({inner})"),
            Node::AccessAttribute { base: Some(base), name } => write!(f, "{base}.{name}"),
            Node::AccessAttribute { base: None, name } => write!(f, "{name}"),
            Node::AccessElement { base, index } => write!(f, "{base}[{index}]"),
            Node::Slice { base, left, right, inclusive } => {
                let op = if *inclusive { ".." } else { "..." };
                write!(f, "{base}[{left}{op}{right}]")
            }
            Node::Filter { base, expr } => write!(f, "{base}[{expr}]"),
            Node::Projection { base, expr } => write!(f, "{base}{expr}"),
            Node::ArrayCoerce { base } => write!(f, "{base}[]"),
            Node::Deref { base, attribute: Some(attribute) } => write!(f, "{base}->{attribute}"),
            Node::Deref { base, attribute: None } => write!(f, "{base}->"),
            Node::FuncCall { namespace, name, args } => {
                if let Some(namespace) = namespace {
                    write!(f, "{namespace}::")?;
                }
                write!(f, "{name}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Node::PipeFuncCall { base, name, args } => {
                write!(f, "{base} | {name}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Node::And(left, right) => write!(f, "({left} && {right})"),
            Node::Or(left, right) => write!(f, "({left} || {right})"),
            Node::Not(inner) => write!(f, "!{inner}"),
            Node::Neg(inner) => write!(f, "-{inner}"),
            Node::Pos(inner) => write!(f, "+{inner}"),
            Node::OpCall { op, left, right } => write!(f, "({left} {} {right})", op.as_str()),
            Node::InRange { base, left, right, inclusive } => {
                let op = if *inclusive { ".." } else { "..." };
                write!(f, "({base} in {left}{op}{right})")
            }
            Node::Pair { condition, value } => write!(f, "{condition} => {value}"),
            Node::Asc(inner) => write!(f, "{inner} asc"),
            Node::Desc(inner) => write!(f, "{inner} desc"),
        }
    }
}

impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(token) => write!(f, "{}", token.lexeme()),
            Value::String(token) => write!(f, "{:?}", token.value()),
        }
    }
}

impl<'a> fmt::Display for ArrayElement<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_splat {
            write!(f, "...")?;
        }
        write!(f, "{}", self.value)
    }
}

impl<'a> fmt::Display for ObjectAttribute<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectAttribute::Value { name, value } => write!(f, "{:?}: {value}", name.value()),
            ObjectAttribute::Splat(value) => write!(f, "...{value}"),
            ObjectAttribute::ConditionalSplat { condition, value } => {
                write!(f, "{condition} => {value}")
            }
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
