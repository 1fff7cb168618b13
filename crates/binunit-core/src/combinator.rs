use ::bytes::Bytes;

use crate::unit::{Pad, Unit, pad};

// ── map / map_err ─────────────────────────────────────────────────────

/// Transforms the decoded value of the inner unit.
///
/// Same size as the inner unit. If the inner unit fails, its error is
/// returned unchanged and the transform is never called.
#[derive(Clone, Copy, Debug)]
pub struct Map<U, F> {
    inner: U,
    f: F,
}

/// Apply `f` to the value decoded by `unit`.
///
/// `f` returns a `Result`, so it can reject values after the fact
/// (range checks, discriminant lookups).
pub fn map<U, F, O>(unit: U, f: F) -> Map<U, F>
where
    U: Unit,
    F: Fn(U::Output) -> Result<O, U::Error>,
{
    Map { inner: unit, f }
}

impl<U, F, O> Unit for Map<U, F>
where
    U: Unit,
    F: Fn(U::Output) -> Result<O, U::Error>,
{
    type Output = O;
    type Error = U::Error;

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<O, U::Error> {
        self.inner.decode(buf, offset).and_then(&self.f)
    }
}

/// Converts the error type of the inner unit.
#[derive(Clone, Copy, Debug)]
pub struct MapErr<U, F> {
    inner: U,
    f: F,
}

/// Convert `unit`'s error with `f`, typically into a format module's own
/// error type.
pub fn map_err<U, F, E>(unit: U, f: F) -> MapErr<U, F>
where
    U: Unit,
    F: Fn(U::Error) -> E,
{
    MapErr { inner: unit, f }
}

impl<U, F, E> Unit for MapErr<U, F>
where
    U: Unit,
    F: Fn(U::Error) -> E,
{
    type Output = U::Output;
    type Error = E;

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<U::Output, E> {
        self.inner.decode(buf, offset).map_err(&self.f)
    }
}

// ── recover ───────────────────────────────────────────────────────────

/// Replaces a decode error with a substitute value.
///
/// Same size as the inner unit: the bytes are consumed whether or not the
/// inner decode succeeded.
#[derive(Clone, Copy, Debug)]
pub struct Recover<U, F> {
    inner: U,
    f: F,
}

/// On error, return `f(error)`; successes pass through untouched.
///
/// `f` may itself return an error to re-classify the failure.
pub fn recover<U, F>(unit: U, f: F) -> Recover<U, F>
where
    U: Unit,
    F: Fn(U::Error) -> Result<U::Output, U::Error>,
{
    Recover { inner: unit, f }
}

impl<U, F> Unit for Recover<U, F>
where
    U: Unit,
    F: Fn(U::Error) -> Result<U::Output, U::Error>,
{
    type Output = U::Output;
    type Error = U::Error;

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<U::Output, U::Error> {
        self.inner.decode(buf, offset).or_else(&self.f)
    }
}

// ── sequence ──────────────────────────────────────────────────────────

/// Consecutive units decoded into a tuple.
///
/// ```text
///   │ unit 0 │ unit 1 │ ... │ unit N │
///   └──── size = Σ unit sizes ───────┘
/// ```
///
/// Children are decoded left to right. The first error is returned
/// immediately and later children are not invoked. The reported size is
/// always the full sum.
#[derive(Clone, Copy, Debug)]
pub struct Sequence<T>(T);

/// Decode a tuple of units (1 to 12) laid out back to back.
///
/// All children must share one error type; use [`map_err`] to align them.
pub fn sequence<T>(units: T) -> Sequence<T>
where
    Sequence<T>: Unit,
{
    Sequence(units)
}

macro_rules! sequence_tuple {
    ($($name:ident $var:ident),+) => {
        impl<E, $($name: Unit<Error = E>),+> Unit for Sequence<($($name,)+)> {
            type Output = ($($name::Output,)+);
            type Error = E;

            fn size(&self) -> usize {
                let ($($var,)+) = &self.0;
                0usize $(.saturating_add($var.size()))+
            }

            #[allow(unused_assignments)]
            fn decode(&self, buf: &Bytes, offset: usize) -> Result<Self::Output, E> {
                let ($($var,)+) = &self.0;
                let mut cursor = offset;
                Ok(($(
                    {
                        let value = $var.decode(buf, cursor)?;
                        cursor = cursor.saturating_add($var.size());
                        value
                    },
                )+))
            }
        }
    };
}

sequence_tuple!(A a);
sequence_tuple!(A a, B b);
sequence_tuple!(A a, B b, C c);
sequence_tuple!(A a, B b, C c, D d);
sequence_tuple!(A a, B b, C c, D d, F f);
sequence_tuple!(A a, B b, C c, D d, F f, G g);
sequence_tuple!(A a, B b, C c, D d, F f, G g, H h);
sequence_tuple!(A a, B b, C c, D d, F f, G g, H h, I i);
sequence_tuple!(A a, B b, C c, D d, F f, G g, H h, I i, J j);
sequence_tuple!(A a, B b, C c, D d, F f, G g, H h, I i, J j, K k);
sequence_tuple!(A a, B b, C c, D d, F f, G g, H h, I i, J j, K k, L l);
sequence_tuple!(A a, B b, C c, D d, F f, G g, H h, I i, J j, K k, L l, M m);

/// `map(sequence(units), f)`.
///
/// The positional values arrive as one tuple, which the closure
/// destructures: `sequence_map((U8, U16_BE), |(kind, len)| ...)`.
pub fn sequence_map<T, F, O>(units: T, f: F) -> Map<Sequence<T>, F>
where
    Sequence<T>: Unit,
    F: Fn(<Sequence<T> as Unit>::Output) -> Result<O, <Sequence<T> as Unit>::Error>,
{
    map(Sequence(units), f)
}

// ── repeat ────────────────────────────────────────────────────────────

/// `count` consecutive instances of one unit, decoded into a `Vec`.
///
/// Short-circuits on the first failing instance, like [`sequence`].
#[derive(Clone, Copy, Debug)]
pub struct Repeat<U> {
    unit: U,
    count: usize,
}

pub fn repeat<U: Unit>(unit: U, count: usize) -> Repeat<U> {
    Repeat { unit, count }
}

impl<U: Unit> Unit for Repeat<U> {
    type Output = Vec<U::Output>;
    type Error = U::Error;

    fn size(&self) -> usize {
        self.unit.size().saturating_mul(self.count)
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<Vec<U::Output>, U::Error> {
        let step = self.unit.size();
        let mut cursor = offset;
        let mut out = Vec::with_capacity(self.count.min(buf.len()));
        for _ in 0..self.count {
            out.push(self.unit.decode(buf, cursor)?);
            cursor = cursor.saturating_add(step);
        }
        Ok(out)
    }
}

// ── method syntax ─────────────────────────────────────────────────────

/// Combinators as methods, for chaining.
///
/// ```rust
/// use binunit_core::{U16_BE, Unit, UnitError, UnitExt};
/// use bytes::Bytes;
///
/// let channels = U16_BE.map(|n| {
///     if n == 0 { Err(UnitError::invalid("no channels")) } else { Ok(n) }
/// });
/// assert_eq!(channels.decode(&Bytes::from_static(&[0, 2]), 0), Ok(2));
/// ```
pub trait UnitExt: Unit + Sized {
    fn map<F, O>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> Result<O, Self::Error>,
    {
        map(self, f)
    }

    fn map_err<F, E>(self, f: F) -> MapErr<Self, F>
    where
        F: Fn(Self::Error) -> E,
    {
        map_err(self, f)
    }

    fn recover<F>(self, f: F) -> Recover<Self, F>
    where
        F: Fn(Self::Error) -> Result<Self::Output, Self::Error>,
    {
        recover(self, f)
    }

    fn padded(self, size: usize) -> Pad<Self> {
        pad(self, size)
    }

    fn repeat(self, count: usize) -> Repeat<Self> {
        repeat(self, count)
    }

    /// Erase the concrete type, e.g. to store units of one output type in
    /// a table.
    fn boxed(self) -> Box<dyn Unit<Output = Self::Output, Error = Self::Error> + Send + Sync>
    where
        Self: Send + Sync + 'static,
    {
        Box::new(self)
    }
}

impl<U: Unit> UnitExt for U {}
