//! Raw sql fragments with positional placeholders.
//!
//! A placeholder site is a `?` or `??` with a non `?` byte on both sides.
//! Each site consumes one argument, left to right:
//!
//! - `??` is replaced by the argument text, nothing is bound;
//! - `?` with a list argument becomes `?, ?, ...`, one per element, and the
//!   elements are bound as text;
//! - `?` with a scalar argument stays `?` and the value is bound as is.
//!
//! The surrounding bytes of a site are part of the match, so a placeholder at
//! the very start or end of the template, or right after another site
//! (`?,?`), is not recognized and is left untouched.

use std::fmt::{self, Write};

use smol_str::SmolStr;

use crate::{
    Binds,
    bind::{Bind, IntoBind},
    error::{Error, Result},
    query::Query,
    writer::{self, FormatContext, FormatWriter, PushBindings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiteKind {
    /// `?`
    Bind,
    /// `??`
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Site {
    start: usize,
    end: usize,
    kind: SiteKind,
}

/// Finds placeholder sites. Expansion and flattening both go through here.
struct Sites<'a> {
    bytes: &'a [u8],
    pos: usize,
}

fn sites(template: &str) -> Sites<'_> {
    Sites {
        bytes: template.as_bytes(),
        pos: 0,
    }
}

impl Iterator for Sites<'_> {
    type Item = Site;

    fn next(&mut self) -> Option<Site> {
        let bytes = self.bytes;
        let mut index = self.pos;
        while index + 2 < bytes.len() {
            if bytes[index] != b'?' && bytes[index + 1] == b'?' {
                let after = index + 2;
                if bytes[after] != b'?' {
                    // the trailing byte belongs to this match
                    self.pos = after + 1;
                    return Some(Site {
                        start: index + 1,
                        end: after,
                        kind: SiteKind::Bind,
                    });
                }
                if after + 1 < bytes.len() && bytes[after + 1] != b'?' {
                    self.pos = after + 2;
                    return Some(Site {
                        start: index + 1,
                        end: after + 1,
                        kind: SiteKind::Inline,
                    });
                }
            }
            index += 1;
        }
        self.pos = bytes.len();
        None
    }
}

/// One substitution value of a raw fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Scalar(Bind),
    List(Vec<Bind>),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Scalar(bind) => write!(f, "{bind}"),
            Arg::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

pub trait IntoArg {
    fn into_arg(self) -> Arg;
}

impl IntoArg for Arg {
    fn into_arg(self) -> Arg {
        self
    }
}

impl<T> IntoArg for T
where
    T: IntoBind,
{
    fn into_arg(self) -> Arg {
        Arg::Scalar(self.into_bind())
    }
}

impl<T> IntoArg for Vec<T>
where
    T: IntoBind,
{
    fn into_arg(self) -> Arg {
        Arg::List(self.into_iter().map(IntoBind::into_bind).collect())
    }
}

impl<T, const N: usize> IntoArg for [T; N]
where
    T: IntoBind,
{
    fn into_arg(self) -> Arg {
        Arg::List(self.into_iter().map(IntoBind::into_bind).collect())
    }
}

fn check_arity(template: &str, args: &[Arg]) -> Result<()> {
    let sites = sites(template).count();
    if sites != args.len() {
        return Err(Error::BindingCountMismatch {
            sites,
            args: args.len(),
        });
    }
    Ok(())
}

fn write_expanded<W: Write>(
    context: &mut FormatContext<'_, W>,
    template: &str,
    args: &[Arg],
) -> Result<()> {
    check_arity(template, args)?;
    let mut last = 0;
    for (site, arg) in sites(template).zip(args) {
        context.writer.write_str(&template[last..site.start])?;
        match (site.kind, arg) {
            (SiteKind::Inline, arg) => write!(context.writer, "{arg}")?,
            (SiteKind::Bind, Arg::List(items)) => context.write_placeholders(items.len())?,
            (SiteKind::Bind, Arg::Scalar(_)) => context.write_placeholder()?,
        }
        last = site.end;
    }
    context.writer.write_str(&template[last..])?;
    Ok(())
}

fn push_flattened(binds: &mut Binds, template: &str, args: &[Arg]) -> Result<()> {
    check_arity(template, args)?;
    for (site, arg) in sites(template).zip(args) {
        match (site.kind, arg) {
            (SiteKind::Inline, _) => {}
            (SiteKind::Bind, Arg::List(items)) => {
                items
                    .iter()
                    .cloned()
                    .for_each(|item| binds.push(item.into_text()));
            }
            (SiteKind::Bind, Arg::Scalar(bind)) => binds.push(bind.clone()),
        }
    }
    Ok(())
}

/// Expands every placeholder site of `template` with `args`.
pub fn expand(template: &str, args: &[Arg]) -> Result<String> {
    let mut str = String::with_capacity(template.len());
    let mut context = FormatContext::new(&mut str);
    write_expanded(&mut context, template, args)?;
    Ok(str)
}

/// The bindings matching the `?` marks of `expand(template, args)`.
pub fn flatten_bindings(template: &str, args: &[Arg]) -> Result<Binds> {
    let mut binds = Binds::None;
    push_flattened(&mut binds, template, args)?;
    Ok(binds)
}

/// A sql template and the arguments of its placeholder sites.
#[derive(Debug, Clone)]
pub struct Raw {
    sql: SmolStr,
    args: Vec<Arg>,
}

impl Raw {
    pub fn new<T>(value: T) -> Self
    where
        T: Into<SmolStr>,
    {
        Self {
            sql: value.into(),
            args: Vec::new(),
        }
    }

    pub fn new_static(value: &'static str) -> Self {
        Self {
            sql: SmolStr::new_static(value),
            args: Vec::new(),
        }
    }

    /// Adds the argument of the next placeholder site.
    pub fn arg<A: IntoArg>(mut self, arg: A) -> Self {
        self.args.push(arg.into_arg());
        self
    }

    /// Replaces all the arguments.
    pub fn bind<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoArg,
    {
        self.args = args.into_iter().map(IntoArg::into_arg).collect();
        self
    }

    pub fn sql(&self) -> &str {
        self.sql.as_str()
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn site_count(&self) -> usize {
        sites(self.sql()).count()
    }
}

impl FormatWriter for Raw {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        write_expanded(context, self.sql(), &self.args)
    }
}

impl PushBindings for Raw {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        push_flattened(binds, self.sql(), &self.args)
    }
}

impl Query for Raw {
    fn to_sql(&self) -> Result<Option<String>> {
        writer::to_string(self).map(Some)
    }

    fn bindings(&self) -> Result<Binds> {
        writer::collect_bindings(self)
    }
}

crate::query::impl_subquery!(Raw);

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Bind {
        Bind::String(value.to_owned())
    }

    fn marks(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn test_inline_and_list() {
        let args = ["name".into_arg(), [1, 2, 3].into_arg()];
        let template = "field = ?? AND id IN (?)";
        assert_eq!(
            "field = name AND id IN (?, ?, ?)",
            expand(template, &args).unwrap()
        );
        assert_eq!(
            vec![text("1"), text("2"), text("3")],
            flatten_bindings(template, &args).unwrap().into_vec()
        );
    }

    #[test]
    fn test_scalar_keeps_type() {
        // the last `?` has no trailing byte and is not a site
        let raw = Raw::new("price + ? > ?").arg(5).arg(10.5);
        assert!(matches!(
            raw.to_sql(),
            Err(Error::BindingCountMismatch { sites: 1, args: 2 })
        ));

        let raw = Raw::new("price + ? > ? ").arg(5).arg(10.5);
        assert_eq!(
            vec![Bind::I32(5), Bind::F64(10.5)],
            raw.bindings().unwrap().into_vec()
        );
    }

    #[test]
    fn test_inline_never_binds() {
        let raw = Raw::new("SELECT * FROM ?? ORDER BY ?? LIMIT ? ")
            .arg("users")
            .arg(["id", "name"])
            .arg(3);
        assert_eq!(
            Some("SELECT * FROM users ORDER BY id, name LIMIT ? ".to_owned()),
            raw.to_sql().unwrap()
        );
        assert_eq!(vec![Bind::I32(3)], raw.bindings().unwrap().into_vec());
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(0, Raw::new("?").site_count());
        assert_eq!(0, Raw::new("? = a").site_count());
        assert_eq!(0, Raw::new("a = ?").site_count());
        assert_eq!(1, Raw::new("(?)").site_count());
        assert_eq!(1, Raw::new("(??)").site_count());
        assert_eq!(0, Raw::new("(???)").site_count());
        // the comma is consumed by the first site
        assert_eq!(1, Raw::new("(?,?)").site_count());
        assert_eq!(2, Raw::new("(?, ?)").site_count());
    }

    #[test]
    fn test_adjacent_sites() {
        let raw = Raw::new("(?,?)").arg(1);
        assert_eq!(Some("(?,?)".to_owned()), raw.to_sql().unwrap());
        assert_eq!(vec![Bind::I32(1)], raw.bindings().unwrap().into_vec());
    }

    #[test]
    fn test_arity_mismatch() {
        let raw = Raw::new("a IN (?) AND b = ? ").arg([1, 2]);
        assert!(matches!(
            raw.to_sql(),
            Err(Error::BindingCountMismatch { sites: 2, args: 1 })
        ));
        assert!(matches!(
            raw.bindings(),
            Err(Error::BindingCountMismatch { sites: 2, args: 1 })
        ));
        let raw = Raw::new("a = 1").arg(1);
        assert!(raw.to_sql().is_err());
    }

    #[test]
    fn test_marks_match_bindings() {
        let cases: Vec<(&str, Vec<Arg>)> = vec![
            ("a = ? ", vec![1.into_arg()]),
            ("a IN (?) AND b = ?? ", vec![vec![1, 2, 3].into_arg(), "x".into_arg()]),
            (" ?? x ? (?)", vec!["t".into_arg(), true.into_arg(), [4, 5].into_arg()]),
            ("no sites at all", vec![]),
            ("x (?) y", vec![Vec::<i32>::new().into_arg()]),
        ];
        for (template, args) in cases {
            let sql = expand(template, &args).unwrap();
            let binds = flatten_bindings(template, &args).unwrap();
            assert_eq!(marks(&sql), binds.len(), "{template}");
        }
    }

    #[test]
    fn test_empty_list() {
        let raw = Raw::new("id IN (?)").arg(Vec::<i32>::new());
        assert_eq!(Some("id IN (NULL)".to_owned()), raw.to_sql().unwrap());
        assert!(raw.bindings().unwrap().is_empty());
    }

    #[test]
    fn test_multibyte_text() {
        let raw = Raw::new("name = ? AND note = 'é?é'").arg("zoé").arg("x");
        assert_eq!(
            Some("name = ? AND note = 'é?é'".to_owned()),
            raw.to_sql().unwrap()
        );
        assert_eq!(
            vec![text("zoé"), text("x")],
            raw.bindings().unwrap().into_vec()
        );
    }

    #[test]
    fn test_bind_replaces() {
        let raw = Raw::new_static("a = ? ").arg(1).bind([2]);
        assert_eq!(&[Arg::Scalar(Bind::I32(2))], raw.args());
    }
}
