use std::{fmt, sync::Arc};

use crate::{bind::Binds, error::Result};

/// Anything that renders to parameterized sql with positional bindings.
///
/// The number of `?` placeholders in [`Query::to_sql`] always equals the
/// length of [`Query::bindings`], in matching order. Both are derived from
/// the current state on every call.
pub trait Query: fmt::Debug + Send + Sync {
    /// Returns `None` when there is nothing to execute.
    fn to_sql(&self) -> Result<Option<String>>;

    fn bindings(&self) -> Result<Binds>;
}

pub type Subquery = Arc<dyn Query>;

pub trait IntoSubquery {
    fn into_subquery(self) -> Subquery;
}

impl IntoSubquery for Subquery {
    fn into_subquery(self) -> Subquery {
        self
    }
}

/// Implements the subquery conversions for a statement type, so it can be
/// used as a condition value, an assignment value or a case branch.
macro_rules! impl_subquery {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::query::IntoSubquery for $ty {
                fn into_subquery(self) -> $crate::query::Subquery {
                    ::std::sync::Arc::new(self)
                }
            }

            impl $crate::expr::IntoValue for $ty {
                fn into_value(self) -> $crate::expr::Value {
                    $crate::expr::Value::Subquery(::std::sync::Arc::new(self))
                }
            }

            impl $crate::set::IntoSet for $ty {
                fn into_set(self) -> $crate::set::SetExpr {
                    $crate::set::SetExpr::Subquery(::std::sync::Arc::new(self))
                }
            }
        )+
    };
}

pub(crate) use impl_subquery;

/// The sql and bindings of a query, captured once.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    sql: String,
    binds: Binds,
}

impl Prepared {
    /// Renders the query. Returns `None` for a query with nothing to run.
    pub fn new<Q>(query: &Q) -> Result<Option<Self>>
    where
        Q: Query + ?Sized,
    {
        let Some(sql) = query.to_sql()? else {
            tracing::debug!("query has nothing to execute, skipping");
            return Ok(None);
        };
        let binds = query.bindings()?;
        Ok(Some(Self::from_parts(sql, binds)))
    }

    pub(crate) fn from_parts(sql: String, binds: Binds) -> Self {
        tracing::debug!(sql = %sql, bindings = binds.len(), "prepared query");
        Self { sql, binds }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &Binds {
        &self.binds
    }

    pub fn into_parts(self) -> (String, Binds) {
        (self.sql, self.binds)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Bind, Insert, Select, expr::all};

    use super::*;

    #[test]
    fn test_prepare_select() {
        let mut select = Select::from("users");
        select.and_where(all().field("id", 3));
        let prepared = Prepared::new(&select).unwrap().unwrap();
        assert_eq!("SELECT * FROM users WHERE (id = ?)", prepared.sql());
        assert_eq!(&[Bind::I32(3)], prepared.bindings().as_slice());
    }

    #[test]
    fn test_prepare_empty_insert() {
        let insert = Insert::into("users");
        assert!(Prepared::new(&insert).unwrap().is_none());
    }

    #[test]
    fn test_prepare_dyn_query() {
        let query: Subquery = Arc::new(Select::from("users"));
        let prepared = Prepared::new(query.as_ref()).unwrap().unwrap();
        let (sql, binds) = prepared.into_parts();
        assert_eq!("SELECT * FROM users", sql);
        assert!(binds.is_empty());
    }
}
