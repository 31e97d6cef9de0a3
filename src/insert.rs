use std::fmt::Write;

use crate::{
    Binds,
    error::{Error, Result},
    ident::{Ident, IntoIdent},
    query::Query,
    row::{IntoRow, Row},
    set::{Assignments, IntoSet},
    writer::{self, FormatContext, FormatWriter, PushBindings},
};

/// `INSERT [IGNORE] INTO table (...) VALUES (...), ... [ON DUPLICATE KEY UPDATE ...]`
///
/// The column list comes from the first row. Every later row must hold the
/// same columns, its values are bound in the first row's column order.
#[derive(Debug, Default, Clone)]
pub struct Insert {
    table: Ident,
    ignore: bool,
    rows: Vec<Row>,
    on_duplicate: Assignments,
}

impl Insert {
    pub fn into<T: IntoIdent>(table: T) -> Self {
        Self {
            table: table.into_ident(),
            ..Default::default()
        }
    }

    pub fn ignore(&mut self) -> &mut Self {
        self.ignore = true;
        self
    }

    pub fn values<R: IntoRow>(&mut self, row: R) -> &mut Self {
        self.rows.push(row.into_row());
        self
    }

    pub fn rows<I, R>(&mut self, rows: I) -> &mut Self
    where
        I: IntoIterator<Item = R>,
        R: IntoRow,
    {
        for row in rows {
            self.values(row);
        }
        self
    }

    pub fn on_duplicate_key_update<K, V>(&mut self, column: K, value: V) -> &mut Self
    where
        K: IntoIdent,
        V: IntoSet,
    {
        self.on_duplicate.set(column, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `None` when no row was added, there is nothing to run.
    pub fn to_sql(&self) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }
        writer::to_string(self).map(Some)
    }

    pub fn bindings(&self) -> Result<Binds> {
        writer::collect_bindings(self)
    }

    fn check_rows(&self) -> Result<Option<&Row>> {
        let Some((first, rest)) = self.rows.split_first() else {
            return Ok(None);
        };
        if let Some(index) = rest.iter().position(|row| !first.same_shape(row)) {
            return Err(Error::RowShape { row: index + 1 });
        }
        Ok(Some(first))
    }
}

impl FormatWriter for Insert {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        let Some(first) = self.check_rows()? else {
            return Ok(());
        };
        context.writer.write_str("INSERT ")?;
        if self.ignore {
            context.writer.write_str("IGNORE ")?;
        }
        context.writer.write_str("INTO ")?;
        self.table.format_writer(context)?;
        context.writer.write_str(" (")?;
        context.write_joined(first.columns(), ", ")?;
        context.writer.write_str(") VALUES ")?;
        for index in 0..self.rows.len() {
            if index > 0 {
                context.writer.write_str(", ")?;
            }
            context.writer.write_char('(')?;
            // an empty row inserts the column defaults
            if !first.is_empty() {
                context.write_placeholders(first.len())?;
            }
            context.writer.write_char(')')?;
        }
        if !self.on_duplicate.is_empty() {
            context.writer.write_str(" ON DUPLICATE KEY UPDATE ")?;
            self.on_duplicate.format_writer(context)?;
        }
        Ok(())
    }
}

impl PushBindings for Insert {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        let Some(first) = self.check_rows()? else {
            return Ok(());
        };
        for row in &self.rows {
            for column in first.columns() {
                if let Some(value) = row.get(column) {
                    binds.push(value.clone());
                }
            }
        }
        self.on_duplicate.push_bindings(binds)
    }
}

impl Query for Insert {
    fn to_sql(&self) -> Result<Option<String>> {
        Insert::to_sql(self)
    }

    fn bindings(&self) -> Result<Binds> {
        Insert::bindings(self)
    }
}

crate::query::impl_subquery!(Insert);

#[cfg(test)]
mod tests {
    use crate::{Bind, Select, raw, row::Row};

    use super::*;

    #[test]
    fn test_two_rows() {
        let mut builder = Insert::into("t");
        builder.values([("a", 1), ("b", 2)]).values([("a", 3), ("b", 4)]);
        assert_eq!(
            Some("INSERT INTO t (a, b) VALUES (?, ?), (?, ?)".to_string()),
            builder.to_sql().unwrap()
        );
        assert_eq!(
            vec![Bind::I32(1), Bind::I32(2), Bind::I32(3), Bind::I32(4)],
            builder.bindings().unwrap().into_vec()
        );
    }

    #[test]
    fn test_empty_insert() {
        let mut builder = Insert::into("t");
        builder.ignore().on_duplicate_key_update("a", 1);
        assert_eq!(None, builder.to_sql().unwrap());
        assert!(builder.bindings().unwrap().is_empty());
    }

    #[test]
    fn test_later_rows_follow_first_row_order() {
        let mut builder = Insert::into("users");
        let mut bob = Row::new();
        bob.field("age", 42).field("name", "bob");
        builder
            .ignore()
            .values(|row: &mut Row| {
                row.field("name", "ann").field("age", 31);
            })
            .rows([bob]);
        assert_eq!(
            Some("INSERT IGNORE INTO users (name, age) VALUES (?, ?), (?, ?)".to_string()),
            builder.to_sql().unwrap()
        );
        assert_eq!(
            vec![
                Bind::String("ann".into()),
                Bind::I32(31),
                Bind::String("bob".into()),
                Bind::I32(42),
            ],
            builder.bindings().unwrap().into_vec()
        );
    }

    #[test]
    fn test_empty_row_uses_defaults() {
        let mut builder = Insert::into("t");
        builder.values(Vec::<(&str, i32)>::new());
        assert_eq!(
            Some("INSERT INTO t () VALUES ()".to_string()),
            builder.to_sql().unwrap()
        );
        builder.values(Row::new());
        assert_eq!(
            Some("INSERT INTO t () VALUES (), ()".to_string()),
            builder.to_sql().unwrap()
        );
        assert!(builder.bindings().unwrap().is_empty());
    }

    #[test]
    fn test_row_shape_mismatch() {
        let mut builder = Insert::into("t");
        builder
            .values([("a", 1), ("b", 2)])
            .values([("a", 3), ("b", 4)])
            .values([("a", 5), ("c", 6)]);
        assert!(matches!(builder.to_sql(), Err(Error::RowShape { row: 2 })));
        assert!(matches!(builder.bindings(), Err(Error::RowShape { row: 2 })));
    }

    #[test]
    fn test_on_duplicate_key_update() {
        let mut latest = Select::from("visits");
        latest.fields("max(seen_at)").and_where(("page", "home"));

        let mut builder = Insert::into("counters");
        builder
            .values([("page", "home"), ("hits", "1")])
            .on_duplicate_key_update("hits", raw("GREATEST(hits, ?)").arg(1))
            .on_duplicate_key_update("seen_at", latest)
            .on_duplicate_key_update("note", "again");
        assert_eq!(
            Some(
                "INSERT INTO counters (page, hits) VALUES (?, ?) ON DUPLICATE KEY UPDATE hits = (GREATEST(hits, ?)), seen_at = (SELECT max(seen_at) FROM visits WHERE (page = ?)), note = ?"
                    .to_string()
            ),
            builder.to_sql().unwrap()
        );
        assert_eq!(
            vec![
                Bind::String("home".into()),
                Bind::String("1".into()),
                Bind::I32(1),
                Bind::String("home".into()),
                Bind::String("again".into()),
            ],
            builder.bindings().unwrap().into_vec()
        );
    }
}
