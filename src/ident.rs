use std::{borrow::Cow, fmt, sync::Arc};

use smol_str::SmolStr;

use crate::{
    bind::Array,
    error::Result,
    writer::{FormatContext, FormatWriter},
};

/// A piece of sql naming a table, a column or an expression.
///
/// Identifiers are written verbatim, they are never quoted.
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ident(SmolStr);

impl Ident {
    #[inline]
    pub fn new<T>(value: T) -> Self
    where
        T: Into<SmolStr>,
    {
        Self(value.into())
    }

    #[inline]
    pub fn new_static(value: &'static str) -> Self {
        Self(SmolStr::new_static(value))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FormatWriter for Ident {
    fn format_writer<W: fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        context.writer.write_str(self.as_str())?;
        Ok(())
    }
}

pub trait IntoIdent {
    fn into_ident(self) -> Ident;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> Ident {
        self
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> Ident {
        self.clone()
    }
}

impl IntoIdent for char {
    fn into_ident(self) -> Ident {
        Ident::new(smol_str::format_smolstr!("{}", self))
    }
}

macro_rules! impl_ident {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IntoIdent for $ty {
                #[inline]
                fn into_ident(self) -> Ident {
                    Ident::new(self)
                }
            }
        )+
    };
}

impl_ident!(&str, &String, String, Box<str>, Arc<str>, Cow<'_, str>, SmolStr);

pub type Idents = Array<Ident>;

impl FormatWriter for Idents {
    fn format_writer<W: fmt::Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        context.write_joined(self.iter(), ", ")
    }
}

pub trait IntoIdents {
    fn into_idents(self) -> Idents;
}

impl<T> IntoIdents for T
where
    T: IntoIdent,
{
    fn into_idents(self) -> Idents {
        Idents::One(self.into_ident())
    }
}

impl<T> IntoIdents for Vec<T>
where
    T: IntoIdent,
{
    fn into_idents(self) -> Idents {
        self.into_iter().map(IntoIdent::into_ident).collect()
    }
}

impl<T, const N: usize> IntoIdents for [T; N]
where
    T: IntoIdent,
{
    fn into_idents(self) -> Idents {
        self.into_iter().map(IntoIdent::into_ident).collect()
    }
}

impl IntoIdents for Idents {
    fn into_idents(self) -> Idents {
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::format_writer;

    use super::*;

    #[test]
    fn test_idents_verbatim() {
        let idents = ["users u", "roles"].into_idents();
        assert_eq!("users u, roles", format_writer(&idents));
        let single = "count(*)".into_idents();
        assert_eq!("count(*)", format_writer(&single));
    }

    #[test]
    fn test_empty_idents() {
        let idents = Vec::<String>::new().into_idents();
        assert!(idents.is_empty());
        assert_eq!("", format_writer(&idents));
    }
}
