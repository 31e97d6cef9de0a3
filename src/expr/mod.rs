use std::fmt::Write;

use crate::{
    bind::{Bind, IntoBind},
    error::Result,
    ident::{Ident, IntoIdent},
    query::Subquery,
    writer::{FormatContext, FormatWriter},
};

pub mod case;
pub mod cond;

pub use case::Case;
pub use cond::{All, Any, Condition, Conditions, IntoCondition, all, any};

/// The value side of a condition pair.
#[derive(Debug, Clone)]
pub enum Value {
    /// Bound as a single `?`.
    Scalar(Bind),
    /// Bound as `IN (?, ?, ...)`, one placeholder per element.
    List(Vec<Bind>),
    /// Rendered in place, its bindings spliced at its position.
    Subquery(Subquery),
}

pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for Subquery {
    fn into_value(self) -> Value {
        Value::Subquery(self)
    }
}

impl<T> IntoValue for T
where
    T: IntoBind,
{
    fn into_value(self) -> Value {
        Value::Scalar(self.into_bind())
    }
}

impl<T> IntoValue for Vec<T>
where
    T: IntoBind,
{
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoBind::into_bind).collect())
    }
}

impl<T, const N: usize> IntoValue for [T; N]
where
    T: IntoBind,
{
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoBind::into_bind).collect())
    }
}

/// The field side of a condition pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldExpr {
    /// A column or expression compared with `= ?` or `IN (...)`.
    Plain(Ident),
    /// A fragment carrying its own placeholders, e.g. `age BETWEEN ? AND ?`.
    /// It is written as is and its value is bound as is.
    Raw(Ident),
}

impl FieldExpr {
    pub fn raw<T: IntoIdent>(value: T) -> Self {
        Self::Raw(value.into_ident())
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldExpr::Plain(ident) | FieldExpr::Raw(ident) => ident.as_str(),
        }
    }
}

pub trait IntoFieldExpr {
    fn into_field_expr(self) -> FieldExpr;
}

impl IntoFieldExpr for FieldExpr {
    fn into_field_expr(self) -> FieldExpr {
        self
    }
}

impl<T> IntoFieldExpr for T
where
    T: IntoIdent,
{
    fn into_field_expr(self) -> FieldExpr {
        FieldExpr::Plain(self.into_ident())
    }
}

impl FormatWriter for FieldExpr {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        context.writer.write_str(self.as_str())?;
        Ok(())
    }
}
