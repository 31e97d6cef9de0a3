//! Nested boolean conditions.
//!
//! A [`Condition`] is either an [`All`] (field pairs joined with `AND`) or an
//! [`Any`] (conditions joined with `OR`). [`Conditions`] is the top level list
//! a statement keeps for its `WHERE` or `HAVING` clause, joined with `AND`.
//!
//! Every composite wraps each of its children in parentheses. A lone pair is
//! written bare, so a tree holding `status = ?` renders as `(status = ?)`.
//!
//! Rendering and binding collection walk the same structure in the same
//! order, the n-th binding always belongs to the n-th `?`.

use std::fmt::Write;

use crate::{
    bind::Binds,
    error::Result,
    writer::{self, FormatContext, FormatWriter, PushBindings},
};

use super::{FieldExpr, IntoFieldExpr, IntoValue, Value};

#[derive(Debug, Clone)]
pub struct Pair {
    pub(crate) field: FieldExpr,
    pub(crate) value: Value,
}

impl FormatWriter for Pair {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match (&self.field, &self.value) {
            (field, Value::Subquery(query)) => {
                field.format_writer(context)?;
                context.writer.write_str(" (")?;
                context.write_subquery(query.as_ref())?;
                context.writer.write_char(')')?;
            }
            (FieldExpr::Raw(field), _) => field.format_writer(context)?,
            (FieldExpr::Plain(field), Value::List(items)) => {
                field.format_writer(context)?;
                context.writer.write_str(" IN (")?;
                context.write_placeholders(items.len())?;
                context.writer.write_char(')')?;
            }
            (FieldExpr::Plain(field), Value::Scalar(_)) => {
                field.format_writer(context)?;
                context.writer.write_str(" = ")?;
                context.write_placeholder()?;
            }
        }
        Ok(())
    }
}

impl PushBindings for Pair {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        match (&self.field, &self.value) {
            (_, Value::Subquery(query)) => binds.append(query.bindings()?),
            (_, Value::Scalar(bind)) => binds.push(bind.clone()),
            // raw fields own their placeholders, values go through untouched
            (FieldExpr::Raw(_), Value::List(items)) => {
                items.iter().cloned().for_each(|item| binds.push(item));
            }
            // in lists are always bound as text
            (FieldExpr::Plain(_), Value::List(items)) => {
                items
                    .iter()
                    .cloned()
                    .for_each(|item| binds.push(item.into_text()));
            }
        }
        Ok(())
    }
}

/// Field pairs joined with `AND`, kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct All {
    pairs: Vec<Pair>,
}

impl All {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `field = ?`, `field IN (...)` or `field (subquery)` depending on
    /// the value.
    pub fn field<K, V>(mut self, field: K, value: V) -> Self
    where
        K: IntoFieldExpr,
        V: IntoValue,
    {
        self.pairs.push(Pair {
            field: field.into_field_expr(),
            value: value.into_value(),
        });
        self
    }

    /// Adds a fragment with its own placeholders. A list value is bound
    /// element by element and must match the placeholders of the fragment.
    pub fn raw_field<K, V>(self, field: K, value: V) -> Self
    where
        K: crate::ident::IntoIdent,
        V: IntoValue,
    {
        self.field(FieldExpr::raw(field), value)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FormatWriter for All {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self.pairs.as_slice() {
            // nothing to check, always true
            [] => context.writer.write_str("1 = 1")?,
            [pair] => pair.format_writer(context)?,
            pairs => context.write_grouped(pairs, " AND ")?,
        }
        Ok(())
    }
}

impl PushBindings for All {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        for pair in &self.pairs {
            pair.push_bindings(binds)?;
        }
        Ok(())
    }
}

/// Conditions joined with `OR`.
#[derive(Debug, Default, Clone)]
pub struct Any {
    conditions: Vec<Condition>,
}

impl Any {
    pub fn new<I>(conditions: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoCondition,
    {
        Self {
            conditions: conditions
                .into_iter()
                .map(IntoCondition::into_condition)
                .collect(),
        }
    }

    pub fn or<C: IntoCondition>(mut self, condition: C) -> Self {
        self.conditions.push(condition.into_condition());
        self
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl FormatWriter for Any {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        if self.conditions.is_empty() {
            // no alternative can match
            context.writer.write_str("1 = 0")?;
            return Ok(());
        }
        context.write_grouped(&self.conditions, " OR ")
    }
}

impl PushBindings for Any {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        for condition in &self.conditions {
            condition.push_bindings(binds)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Condition {
    All(All),
    Any(Any),
}

impl FormatWriter for Condition {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self {
            Condition::All(all) => all.format_writer(context),
            Condition::Any(any) => any.format_writer(context),
        }
    }
}

impl PushBindings for Condition {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        match self {
            Condition::All(all) => all.push_bindings(binds),
            Condition::Any(any) => any.push_bindings(binds),
        }
    }
}

pub trait IntoCondition {
    fn into_condition(self) -> Condition;
}

impl IntoCondition for Condition {
    fn into_condition(self) -> Condition {
        self
    }
}

impl IntoCondition for All {
    fn into_condition(self) -> Condition {
        Condition::All(self)
    }
}

impl IntoCondition for Any {
    fn into_condition(self) -> Condition {
        Condition::Any(self)
    }
}

impl<K, V> IntoCondition for (K, V)
where
    K: IntoFieldExpr,
    V: IntoValue,
{
    fn into_condition(self) -> Condition {
        Condition::All(All::new().field(self.0, self.1))
    }
}

pub fn all() -> All {
    All::new()
}

pub fn any() -> Any {
    Any::default()
}

/// The `AND` list behind a `WHERE` or `HAVING` clause.
#[derive(Debug, Default, Clone)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<C: IntoCondition>(&mut self, condition: C) -> &mut Self {
        self.0.push(condition.into_condition());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Renders `(c1) AND (c2) AND ...`, or `None` when the clause should be
    /// left out.
    pub fn render(&self) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }
        writer::to_string(self).map(Some)
    }

    /// The bindings in the order `render` places its placeholders.
    pub fn bindings(&self) -> Result<Binds> {
        writer::collect_bindings(self)
    }
}

impl FormatWriter for Conditions {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        context.write_grouped(&self.0, " AND ")
    }
}

impl PushBindings for Conditions {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        for condition in &self.0 {
            condition.push_bindings(binds)?;
        }
        Ok(())
    }
}
