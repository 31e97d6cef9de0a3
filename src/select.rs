use std::fmt::Write;

use crate::{
    Binds,
    bind::Array,
    error::Result,
    expr::{All, Case, Conditions, IntoCondition, IntoValue},
    ident::{Ident, Idents, IntoIdent, IntoIdents},
    paginate::Paginator,
    query::Query,
    writer::{self, FormatContext, FormatWriter, PushBindings},
};

/// A selected expression with an optional alias.
#[derive(Debug, Clone)]
pub struct Projection {
    expr: Ident,
    alias: Option<Ident>,
}

impl FormatWriter for Projection {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        self.expr.format_writer(context)?;
        if let Some(ref alias) = self.alias {
            context.writer.write_str(" AS ")?;
            alias.format_writer(context)?;
        }
        Ok(())
    }
}

pub type Projections = Array<Projection>;

#[derive(Debug, Default, Clone)]
pub struct Select {
    distinct: bool,
    tables: Idents,
    projections: Projections,
    cases: Vec<Case>,
    wheres: Conditions,
    groups: Idents,
    havings: Conditions,
    orders: Idents,
    paginator: Paginator,
}

impl Select {
    pub fn from<T: IntoIdents>(tables: T) -> Self {
        Self {
            tables: tables.into_idents(),
            ..Default::default()
        }
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Replaces the selected fields.
    pub fn fields<T: IntoIdents>(&mut self, fields: T) -> &mut Self {
        self.projections = fields
            .into_idents()
            .into_iter()
            .map(|expr| Projection { expr, alias: None })
            .collect();
        self
    }

    pub fn add_field<T: IntoIdent>(&mut self, field: T) -> &mut Self {
        self.projections.push(Projection {
            expr: field.into_ident(),
            alias: None,
        });
        self
    }

    /// Adds `expr AS alias`.
    pub fn field_as<T, A>(&mut self, expr: T, alias: A) -> &mut Self
    where
        T: IntoIdent,
        A: IntoIdent,
    {
        self.projections.push(Projection {
            expr: expr.into_ident(),
            alias: Some(alias.into_ident()),
        });
        self
    }

    pub fn reset_fields(&mut self) -> &mut Self {
        self.projections = Projections::None;
        self
    }

    /// Adds a `CASE ... END AS alias` column after the fields.
    pub fn case(&mut self, case: Case) -> &mut Self {
        self.cases.push(case);
        self
    }

    // where stuff

    pub fn and_where<C: IntoCondition>(&mut self, condition: C) -> &mut Self {
        self.wheres.add(condition);
        self
    }

    pub fn where_eq<K, V>(&mut self, field: K, value: V) -> &mut Self
    where
        K: IntoIdent,
        V: crate::IntoBind,
    {
        self.and_where(All::new().field(field.into_ident(), value.into_bind()))
    }

    pub fn where_in<K, V>(&mut self, field: K, values: V) -> &mut Self
    where
        K: IntoIdent,
        V: IntoValue,
    {
        self.and_where(All::new().field(field.into_ident(), values))
    }

    pub fn where_raw<K, V>(&mut self, expr: K, value: V) -> &mut Self
    where
        K: IntoIdent,
        V: IntoValue,
    {
        self.and_where(All::new().raw_field(expr, value))
    }

    pub fn has_where(&self) -> bool {
        !self.wheres.is_empty()
    }

    // grouping and ordering

    pub fn group_by<T: IntoIdents>(&mut self, groups: T) -> &mut Self {
        self.groups = groups.into_idents();
        self
    }

    pub fn and_having<C: IntoCondition>(&mut self, condition: C) -> &mut Self {
        self.havings.add(condition);
        self
    }

    /// Replaces the ordering, e.g. `["created_at DESC", "id"]`.
    pub fn order_by<T: IntoIdents>(&mut self, orders: T) -> &mut Self {
        self.orders = orders.into_idents();
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.paginator.limit(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.paginator.offset(offset);
        self
    }

    pub fn paginate(&mut self, page: u64, per_page: u64) -> &mut Self {
        self.paginator.paginate(page, per_page);
        self
    }

    // derived selects

    /// A copy with `condition` added to the where clause.
    pub fn filtered<C: IntoCondition>(&self, condition: C) -> Select {
        let mut select = self.clone();
        select.and_where(condition);
        select
    }

    /// A copy selecting only `fields`.
    pub fn projected<T: IntoIdents>(&self, fields: T) -> Select {
        let mut select = self.clone();
        select.fields(fields);
        select
    }

    /// A copy selecting `count(*)`, or `count(distinct field)`, without the
    /// case columns.
    pub fn counted(&self, distinct: Option<&str>) -> Select {
        let count = match distinct {
            Some(field) => format!("count(distinct {field})"),
            None => "count(*)".to_string(),
        };
        let mut select = self.projected(count);
        select.cases.clear();
        select
    }

    // building the builder

    pub fn to_sql(&self) -> Result<String> {
        writer::to_string(self)
    }

    pub fn bindings(&self) -> Result<Binds> {
        writer::collect_bindings(self)
    }
}

impl FormatWriter for Select {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        context.writer.write_str("SELECT ")?;
        if self.distinct {
            context.writer.write_str("DISTINCT ")?;
        }
        if self.projections.is_empty() {
            context.writer.write_char('*')?;
        } else {
            context.write_joined(&self.projections, ", ")?;
        }
        if !self.cases.is_empty() {
            context.writer.write_str(", ")?;
            context.write_joined(&self.cases, ", ")?;
        }

        context.writer.write_str(" FROM ")?;
        self.tables.format_writer(context)?;

        if !self.wheres.is_empty() {
            context.writer.write_str(" WHERE ")?;
            self.wheres.format_writer(context)?;
        }
        if !self.groups.is_empty() {
            context.writer.write_str(" GROUP BY ")?;
            self.groups.format_writer(context)?;
        }
        if !self.havings.is_empty() {
            context.writer.write_str(" HAVING ")?;
            self.havings.format_writer(context)?;
        }
        if !self.orders.is_empty() {
            context.writer.write_str(" ORDER BY ")?;
            self.orders.format_writer(context)?;
        }
        if self.paginator.is_set() {
            context.writer.write_str(" LIMIT ? OFFSET ?")?;
        }
        Ok(())
    }
}

impl PushBindings for Select {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        for case in &self.cases {
            case.push_bindings(binds)?;
        }
        self.wheres.push_bindings(binds)?;
        self.havings.push_bindings(binds)?;
        self.paginator.push_bindings(binds);
        Ok(())
    }
}

impl Query for Select {
    fn to_sql(&self) -> Result<Option<String>> {
        Select::to_sql(self).map(Some)
    }

    fn bindings(&self) -> Result<Binds> {
        Select::bindings(self)
    }
}

crate::query::impl_subquery!(Select);
