use std::fmt::Write;

use indexmap::IndexMap;

use crate::{
    Binds,
    bind::{Bind, IntoBind},
    error::Result,
    ident::{Ident, IntoIdent},
    query::Subquery,
    writer::{FormatContext, FormatWriter, PushBindings},
};

/// A value assigned to a column or returned by a case branch.
#[derive(Debug, Clone)]
pub enum SetExpr {
    Bind(Bind),
    Subquery(Subquery),
}

impl PushBindings for SetExpr {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        match self {
            SetExpr::Bind(bind) => binds.push(bind.clone()),
            SetExpr::Subquery(query) => binds.append(query.bindings()?),
        }
        Ok(())
    }
}

/// Writes `?` or the subquery sql without parentheses.
impl FormatWriter for SetExpr {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        match self {
            SetExpr::Bind(_) => context.write_placeholder(),
            SetExpr::Subquery(query) => context.write_subquery(query.as_ref()),
        }
    }
}

pub trait IntoSet {
    fn into_set(self) -> SetExpr;
}

impl IntoSet for SetExpr {
    fn into_set(self) -> SetExpr {
        self
    }
}

impl IntoSet for Subquery {
    fn into_set(self) -> SetExpr {
        SetExpr::Subquery(self)
    }
}

impl<T> IntoSet for T
where
    T: IntoBind,
{
    fn into_set(self) -> SetExpr {
        SetExpr::Bind(self.into_bind())
    }
}

/// Ordered `column = value` assignments. Setting a column twice keeps its
/// first position with the latest value.
#[derive(Debug, Default, Clone)]
pub struct Assignments(IndexMap<Ident, SetExpr>);

impl Assignments {
    pub fn set<K, V>(&mut self, column: K, value: V)
    where
        K: IntoIdent,
        V: IntoSet,
    {
        self.0.insert(column.into_ident(), value.into_set());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FormatWriter for Assignments {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        for (index, (column, value)) in self.0.iter().enumerate() {
            if index > 0 {
                context.writer.write_str(", ")?;
            }
            column.format_writer(context)?;
            context.writer.write_str(" = ")?;
            match value {
                SetExpr::Subquery(_) => {
                    context.writer.write_char('(')?;
                    value.format_writer(context)?;
                    context.writer.write_char(')')?;
                }
                SetExpr::Bind(_) => value.format_writer(context)?,
            }
        }
        Ok(())
    }
}

impl PushBindings for Assignments {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        for value in self.0.values() {
            value.push_bindings(binds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Select, raw, tests::format_writer, writer::collect_bindings};

    use super::*;

    #[test]
    fn test_assignments() {
        let mut total = Select::from("orders");
        total.fields("sum(amount)").and_where(("user_id", 7));

        let mut sets = Assignments::default();
        sets.set("name", "bob");
        sets.set("total", total);
        sets.set("seen_at", raw("NOW()"));
        sets.set("age", 40);
        assert_eq!(
            "name = ?, total = (SELECT sum(amount) FROM orders WHERE (user_id = ?)), seen_at = (NOW()), age = ?",
            format_writer(&sets)
        );
        assert_eq!(
            vec![
                Bind::String("bob".into()),
                Bind::I32(7),
                Bind::I32(40)
            ],
            collect_bindings(&sets).unwrap().into_vec()
        );
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut sets = Assignments::default();
        sets.set("a", 1);
        sets.set("b", 2);
        sets.set("a", 3);
        assert_eq!("a = ?, b = ?", format_writer(&sets));
        assert_eq!(
            vec![Bind::I32(3), Bind::I32(2)],
            collect_bindings(&sets).unwrap().into_vec()
        );
    }
}
