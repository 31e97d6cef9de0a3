use std::fmt::Write;

use crate::{
    Binds,
    error::{Error, Result},
    expr::{Conditions, IntoCondition},
    ident::{Idents, IntoIdent, IntoIdents},
    query::Query,
    set::{Assignments, IntoSet},
    writer::{self, FormatContext, FormatWriter, PushBindings},
};

#[derive(Debug, Default, Clone)]
pub struct Update {
    tables: Idents,
    ignore: bool,
    sets: Assignments,
    wheres: Conditions,
}

impl Update {
    pub fn table<T: IntoIdents>(tables: T) -> Self {
        Self {
            tables: tables.into_idents(),
            ..Default::default()
        }
    }

    pub fn ignore(&mut self) -> &mut Self {
        self.ignore = true;
        self
    }

    /// Assigns a value or a subquery. Setting a column again replaces its
    /// value and keeps its place.
    pub fn set<K, V>(&mut self, column: K, value: V) -> &mut Self
    where
        K: IntoIdent,
        V: IntoSet,
    {
        self.sets.set(column, value);
        self
    }

    pub fn and_where<C: IntoCondition>(&mut self, condition: C) -> &mut Self {
        self.wheres.add(condition);
        self
    }

    pub fn to_sql(&self) -> Result<String> {
        writer::to_string(self)
    }

    pub fn bindings(&self) -> Result<Binds> {
        writer::collect_bindings(self)
    }
}

impl FormatWriter for Update {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        if self.sets.is_empty() {
            return Err(Error::NoAssignments);
        }
        context.writer.write_str("UPDATE ")?;
        if self.ignore {
            context.writer.write_str("IGNORE ")?;
        }
        self.tables.format_writer(context)?;
        context.writer.write_str(" SET ")?;
        self.sets.format_writer(context)?;
        if !self.wheres.is_empty() {
            context.writer.write_str(" WHERE ")?;
            self.wheres.format_writer(context)?;
        }
        Ok(())
    }
}

impl PushBindings for Update {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        self.sets.push_bindings(binds)?;
        self.wheres.push_bindings(binds)
    }
}

impl Query for Update {
    fn to_sql(&self) -> Result<Option<String>> {
        Update::to_sql(self).map(Some)
    }

    fn bindings(&self) -> Result<Binds> {
        Update::bindings(self)
    }
}

crate::query::impl_subquery!(Update);

#[cfg(test)]
mod tests {
    use crate::{Bind, Select, expr::any, raw};

    use super::*;

    #[test]
    fn test_update() {
        let mut builder = Update::table("users");
        builder
            .set("name", "ann")
            .set("visits", raw("LEAST(visits + ?, 100)").arg(1))
            .and_where(("id", 7));
        assert_eq!(
            "UPDATE users SET name = ?, visits = (LEAST(visits + ?, 100)) WHERE (id = ?)",
            builder.to_sql().unwrap()
        );
        assert_eq!(
            vec![Bind::String("ann".into()), Bind::I32(1), Bind::I32(7)],
            builder.bindings().unwrap().into_vec()
        );
    }

    #[test]
    fn test_update_ignore_many_tables() {
        let mut total = Select::from("orders o");
        total.fields("sum(o.amount)").and_where(("o.state", "paid"));

        let mut builder = Update::table(["users u", "teams t"]);
        builder
            .ignore()
            .set("u.spent", total)
            .and_where(any().or(("u.team_id", [1, 2])).or(("t.owner", true)));
        assert_eq!(
            "UPDATE IGNORE users u, teams t SET u.spent = (SELECT sum(o.amount) FROM orders o WHERE (o.state = ?)) WHERE ((u.team_id IN (?, ?)) OR (t.owner = ?))",
            builder.to_sql().unwrap()
        );
        assert_eq!(
            vec![
                Bind::String("paid".into()),
                Bind::String("1".into()),
                Bind::String("2".into()),
                Bind::Bool(true),
            ],
            builder.bindings().unwrap().into_vec()
        );
    }

    #[test]
    fn test_no_assignments() {
        let mut builder = Update::table("users");
        builder.and_where(("id", 1));
        assert!(matches!(builder.to_sql(), Err(Error::NoAssignments)));
    }
}
