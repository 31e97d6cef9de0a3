//! A mysql statement builder producing `?` parameterized sql together with
//! its ordered bindings.
//!
//! ```
//! use quarry::{Select, expr::any};
//!
//! let mut select = Select::from("users");
//! select
//!     .fields(["id", "name"])
//!     .and_where(("status", "active"))
//!     .and_where(any().or(("role", ["admin", "owner"])).or(("vip", true)))
//!     .limit(10);
//!
//! assert_eq!(
//!     "SELECT id, name FROM users WHERE (status = ?) AND ((role IN (?, ?)) OR (vip = ?)) LIMIT ? OFFSET ?",
//!     select.to_sql().unwrap()
//! );
//! assert_eq!(6, select.bindings().unwrap().len());
//! ```

mod bind;
mod delete;
mod error;
mod ident;
mod insert;
mod paginate;
mod query;
mod row;
mod select;
mod set;
mod update;
mod writer;

pub mod expr;
pub mod raw;

#[cfg(feature = "mysql")]
mod exec;

pub use bind::{Array, Bind, Binds, IntoBind};
pub use delete::Delete;
pub use error::{Error, Result};
pub use expr::{All, Any, Case, Condition, Conditions, IntoCondition, Value, all, any};
pub use ident::{Ident, Idents, IntoIdent, IntoIdents};
pub use insert::Insert;
pub use query::{IntoSubquery, Prepared, Query, Subquery};
pub use raw::{Arg, IntoArg, Raw};
pub use row::{IntoRow, Row};
pub use select::Select;
pub use set::{IntoSet, SetExpr};
pub use update::Update;

#[cfg(feature = "mysql")]
pub use exec::{Db, TxOutcome};

pub fn select<T: IntoIdents>(tables: T) -> Select {
    Select::from(tables)
}

pub fn insert<T: IntoIdent>(table: T) -> Insert {
    Insert::into(table)
}

pub fn update<T: IntoIdents>(tables: T) -> Update {
    Update::table(tables)
}

pub fn delete<T: IntoIdents>(tables: T) -> Delete {
    Delete::from(tables)
}

pub fn raw(sql: &str) -> Raw {
    Raw::new(sql)
}

pub fn raw_static(sql: &'static str) -> Raw {
    Raw::new_static(sql)
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::writer;

    pub(crate) fn format_writer<W: writer::FormatWriter>(value: W) -> String {
        writer::to_string(&value).unwrap()
    }
}
