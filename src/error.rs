use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The template of a raw fragment and its arguments disagree.
    #[error("binding count mismatch: {sites} placeholder site(s) but {args} argument(s)")]
    BindingCountMismatch { sites: usize, args: usize },

    /// Every insert row must carry the columns of the first row.
    #[error("insert row {row} does not match the columns of the first row")]
    RowShape { row: usize },

    #[error("update has no assignments")]
    NoAssignments,

    #[error("case `{alias}` has no when branch")]
    EmptyCase { alias: String },

    /// An embedded query returned no sql, e.g. an insert without rows.
    #[error("subquery produced no sql")]
    EmptySubquery,

    #[error(transparent)]
    Format(#[from] std::fmt::Error),

    #[cfg(feature = "mysql")]
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "mysql")]
    #[error("failed to encode binding {index}: {message}")]
    Encode { index: usize, message: String },
}
