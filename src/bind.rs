use std::{borrow::Cow, fmt, sync::Arc};

use smol_str::SmolStr;

// max size is 32 bytes without the optional types
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Null,
    String(String),
    Bool(bool),
    F32(f32),
    F64(f64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    #[cfg(feature = "chrono")]
    NaiveDateTime(chrono::NaiveDateTime),
    #[cfg(feature = "chrono")]
    NaiveDate(chrono::NaiveDate),
    #[cfg(feature = "chrono")]
    DateTimeUtc(chrono::DateTime<chrono::Utc>),
    #[cfg(feature = "time")]
    PrimitiveDateTime(time::PrimitiveDateTime),
    #[cfg(feature = "time")]
    OffsetDateTime(time::OffsetDateTime),
    #[cfg(feature = "time")]
    Date(time::Date),
    #[cfg(feature = "uuid")]
    Uuid(uuid::Uuid),
    #[cfg(feature = "json")]
    Json(serde_json::Value),
}

impl Bind {
    pub fn new<V>(value: V) -> Bind
    where
        V: IntoBind,
    {
        value.into_bind()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Bind::Null)
    }

    /// Coerces the value into its text form. Null stays null.
    pub fn into_text(self) -> Bind {
        match self {
            Bind::Null | Bind::String(_) => self,
            other => Bind::String(other.to_string()),
        }
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bind::Null => f.write_str("NULL"),
            Bind::String(value) => f.write_str(value),
            Bind::Bool(value) => f.write_str(if *value { "1" } else { "0" }),
            Bind::F32(value) => write!(f, "{value}"),
            Bind::F64(value) => write!(f, "{value}"),
            Bind::I8(value) => write!(f, "{value}"),
            Bind::I16(value) => write!(f, "{value}"),
            Bind::I32(value) => write!(f, "{value}"),
            Bind::I64(value) => write!(f, "{value}"),
            Bind::U8(value) => write!(f, "{value}"),
            Bind::U16(value) => write!(f, "{value}"),
            Bind::U32(value) => write!(f, "{value}"),
            Bind::U64(value) => write!(f, "{value}"),
            #[cfg(feature = "chrono")]
            Bind::NaiveDateTime(value) => write!(f, "{value}"),
            #[cfg(feature = "chrono")]
            Bind::NaiveDate(value) => write!(f, "{value}"),
            #[cfg(feature = "chrono")]
            Bind::DateTimeUtc(value) => write!(f, "{}", value.naive_utc()),
            #[cfg(feature = "time")]
            Bind::PrimitiveDateTime(value) => write!(f, "{value}"),
            #[cfg(feature = "time")]
            Bind::OffsetDateTime(value) => write!(f, "{value}"),
            #[cfg(feature = "time")]
            Bind::Date(value) => write!(f, "{value}"),
            #[cfg(feature = "uuid")]
            Bind::Uuid(value) => write!(f, "{value}"),
            #[cfg(feature = "json")]
            Bind::Json(value) => write!(f, "{value}"),
        }
    }
}

pub type Binds = Array<Bind>;

// if T <= 32 bytes we are good and it's a free data structure.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Array<T> {
    #[default]
    None,
    One(T),
    Many(Vec<T>),
}

impl<T> Array<T> {
    pub fn push(&mut self, value: T) {
        self.append(Self::One(value));
    }

    pub fn append(&mut self, other: Self) {
        let combined = match (std::mem::take(self), other) {
            (Self::None, cols) | (cols, Self::None) => cols,
            (Self::One(a), Self::One(b)) => Self::Many(vec![a, b]),
            (Self::One(a), Self::Many(mut b)) => {
                b.insert(0, a);
                Self::Many(b)
            }
            (Self::Many(mut a), Self::One(b)) => {
                a.push(b);
                Self::Many(a)
            }
            (Self::Many(mut a), Self::Many(mut b)) => {
                a.append(&mut b);
                Self::Many(a)
            }
        };
        *self = combined;
    }

    pub fn len(&self) -> usize {
        match self {
            Array::None => 0,
            Array::One(_) => 1,
            Array::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Array::None => &[],
            Array::One(one) => std::slice::from_ref(one),
            Array::Many(many) => many.as_slice(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::None => Vec::new(),
            Self::One(one) => Vec::from([one]),
            Self::Many(many) => many,
        }
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut items: Vec<T> = iter.into_iter().collect();
        match items.len() {
            0 => Self::None,
            1 => items.pop().map_or(Self::None, Self::One),
            _ => Self::Many(items),
        }
    }
}

impl<T> IntoIterator for Array<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub trait IntoBind {
    fn into_bind(self) -> Bind;
}

impl IntoBind for Bind {
    fn into_bind(self) -> Bind {
        self
    }
}

impl<T> IntoBind for Option<T>
where
    T: IntoBind,
{
    fn into_bind(self) -> Bind {
        if let Some(value) = self {
            value.into_bind()
        } else {
            Bind::Null
        }
    }
}

macro_rules! impl_bind {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl IntoBind for $ty {
                #[inline]
                fn into_bind(self) -> Bind {
                    Bind::$variant(self)
                }
            }

            impl From<$ty> for Bind {
                #[inline]
                fn from(value: $ty) -> Self {
                    Bind::$variant(value)
                }
            }
        )+
    };
}

impl_bind! {
    String => String,
    bool => Bool,
    f32 => F32,
    f64 => F64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

#[cfg(feature = "chrono")]
impl_bind! {
    chrono::NaiveDateTime => NaiveDateTime,
    chrono::NaiveDate => NaiveDate,
    chrono::DateTime<chrono::Utc> => DateTimeUtc,
}

#[cfg(feature = "time")]
impl_bind! {
    time::PrimitiveDateTime => PrimitiveDateTime,
    time::OffsetDateTime => OffsetDateTime,
    time::Date => Date,
}

#[cfg(feature = "uuid")]
impl_bind! {
    uuid::Uuid => Uuid,
}

#[cfg(feature = "json")]
impl_bind! {
    serde_json::Value => Json,
}

macro_rules! impl_bind_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IntoBind for $ty {
                #[inline]
                fn into_bind(self) -> Bind {
                    Bind::String(self.to_string())
                }
            }

            impl From<$ty> for Bind {
                #[inline]
                fn from(value: $ty) -> Self {
                    value.into_bind()
                }
            }
        )+
    };
}

impl_bind_str!(&str, &String, SmolStr, Box<str>, Arc<str>, Cow<'_, str>);

#[cfg(feature = "secrecy")]
impl IntoBind for secrecy::SecretString {
    fn into_bind(self) -> Bind {
        use secrecy::ExposeSecret;
        Bind::String(self.expose_secret().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_text() {
        assert_eq!(Bind::String("3".into()), 3.into_bind().into_text());
        assert_eq!(Bind::String("1".into()), true.into_bind().into_text());
        assert_eq!(Bind::String("1.5".into()), 1.5f64.into_bind().into_text());
        assert_eq!(Bind::Null, None::<i32>.into_bind().into_text());
        assert_eq!(Bind::String("bob".into()), "bob".into_bind().into_text());
    }

    #[test]
    fn test_append() {
        let mut binds = Binds::None;
        binds.append(Binds::None);
        assert!(binds.is_empty());
        binds.push(Bind::I32(1));
        assert!(matches!(binds, Array::One(Bind::I32(1))));
        binds.append([Bind::I32(2), Bind::I32(3)].into_iter().collect());
        binds.push(Bind::I32(4));
        assert_eq!(4, binds.len());
        assert_eq!(
            vec![Bind::I32(1), Bind::I32(2), Bind::I32(3), Bind::I32(4)],
            binds.into_vec()
        );
    }

    #[test]
    fn test_collect_one() {
        let binds: Binds = std::iter::once(Bind::Bool(true)).collect();
        assert!(matches!(binds, Array::One(Bind::Bool(true))));
        assert_eq!(&[Bind::Bool(true)], binds.as_slice());
    }
}
