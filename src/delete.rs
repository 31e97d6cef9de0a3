use std::fmt::Write;

use crate::{
    Binds,
    error::Result,
    expr::{Conditions, IntoCondition},
    ident::{Idents, IntoIdents},
    query::Query,
    writer::{self, FormatContext, FormatWriter, PushBindings},
};

#[derive(Debug, Default, Clone)]
pub struct Delete {
    tables: Idents,
    wheres: Conditions,
}

impl Delete {
    pub fn from<T: IntoIdents>(tables: T) -> Self {
        Self {
            tables: tables.into_idents(),
            ..Default::default()
        }
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

impl FormatWriter for Delete {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        context.writer.write_str("DELETE FROM ")?;
        self.tables.format_writer(context)?;
        if !self.wheres.is_empty() {
            context.writer.write_str(" WHERE ")?;
            self.wheres.format_writer(context)?;
        }
        Ok(())
    }
}

impl PushBindings for Delete {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        self.wheres.push_bindings(binds)
    }
}

impl Query for Delete {
    fn to_sql(&self) -> Result<Option<String>> {
        Delete::to_sql(self).map(Some)
    }

    fn bindings(&self) -> Result<Binds> {
        Delete::bindings(self)
    }
}

crate::query::impl_subquery!(Delete);

#[cfg(test)]
mod tests {
    use crate::{Bind, expr::all};

    use super::*;

    #[test]
    fn test_delete() {
        let mut builder = Delete::from("sessions");
        assert_eq!("DELETE FROM sessions", builder.to_sql().unwrap());
        builder
            .and_where(all().raw_field("expires_at < ?", 1700000000i64))
            .and_where(("user_id", [3, 4]));
        assert_eq!(
            "DELETE FROM sessions WHERE (expires_at < ?) AND (user_id IN (?, ?))",
            builder.to_sql().unwrap()
        );
        assert_eq!(
            vec![
                Bind::I64(1700000000),
                Bind::String("3".into()),
                Bind::String("4".into()),
            ],
            builder.bindings().unwrap().into_vec()
        );
    }
}
