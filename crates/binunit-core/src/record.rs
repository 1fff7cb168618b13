use std::fmt;

use ::bytes::Bytes;

use crate::error::UnitError;
use crate::unit::Unit;

type FieldReader<T, E> = Box<dyn Fn(&Bytes, usize, &mut T) -> Result<(), E> + Send + Sync>;

/// One positional slot of a [`StructUnit`].
struct Slot<T, E> {
    size: usize,
    read: FieldReader<T, E>,
}

/// Builder for a unit that decodes consecutive fields into a struct.
///
/// Each call appends one positional slot. `field` decodes a unit and hands
/// the value to a setter; `ignore` decodes and drops the value (its errors
/// still count); `skip` reserves bytes without reading them.
///
/// ```rust
/// use binunit_core::{StructUnit, U8, U16_BE, Unit, latin1, sequence_to_struct};
/// use bytes::Bytes;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Chunk {
///     id: String,
///     version: u8,
///     size: u16,
/// }
///
/// let unit: StructUnit<Chunk> = sequence_to_struct::<Chunk>()
///     .field(latin1(4), |c, v| c.id = v)
///     .field(U8, |c, v| c.version = v)
///     .skip(1)
///     .field(U16_BE, |c, v| c.size = v)
///     .build();
///
/// let buf = Bytes::from_static(b"data\x01\x00\x00\x20");
/// assert_eq!(unit.size(), 8);
/// assert_eq!(
///     unit.decode(&buf, 0),
///     Ok(Chunk { id: "data".into(), version: 1, size: 32 })
/// );
/// ```
pub struct StructBuilder<T, E = UnitError> {
    slots: Vec<Slot<T, E>>,
}

/// Start a struct builder whose fields use [`UnitError`].
#[must_use]
pub fn sequence_to_struct<T: Default>() -> StructBuilder<T, UnitError> {
    StructBuilder::new()
}

impl<T: Default, E> StructBuilder<T, E> {
    /// Start a builder with an explicit error type.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Decode `unit` and store the value with `set`.
    #[must_use]
    pub fn field<U, S>(mut self, unit: U, set: S) -> Self
    where
        U: Unit<Error = E> + Send + Sync + 'static,
        S: Fn(&mut T, U::Output) + Send + Sync + 'static,
    {
        let size = unit.size();
        self.slots.push(Slot {
            size,
            read: Box::new(move |buf, offset, target| {
                let value = unit.decode(buf, offset)?;
                set(target, value);
                Ok(())
            }),
        });
        self
    }

    /// Decode `unit` and discard the value.
    #[must_use]
    pub fn ignore<U>(mut self, unit: U) -> Self
    where
        U: Unit<Error = E> + Send + Sync + 'static,
    {
        let size = unit.size();
        self.slots.push(Slot {
            size,
            read: Box::new(move |buf, offset, _| unit.decode(buf, offset).map(drop)),
        });
        self
    }

    /// Reserve `size` bytes without reading them.
    #[must_use]
    pub fn skip(mut self, size: usize) -> Self {
        self.slots.push(Slot {
            size,
            read: Box::new(|_, _, _| Ok(())),
        });
        self
    }

    #[must_use]
    pub fn build(self) -> StructUnit<T, E> {
        let size = self
            .slots
            .iter()
            .fold(0usize, |total, slot| total.saturating_add(slot.size));
        StructUnit {
            slots: self.slots,
            size,
        }
    }
}

impl<T: Default, E> Default for StructBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A unit that decodes a struct field by field.
///
/// Built with [`sequence_to_struct`]. Decoding starts from `T::default()`,
/// runs the slots in order, and returns the first error without running
/// later slots.
pub struct StructUnit<T, E = UnitError> {
    slots: Vec<Slot<T, E>>,
    size: usize,
}

impl<T: Default, E> Unit for StructUnit<T, E> {
    type Output = T;
    type Error = E;

    fn size(&self) -> usize {
        self.size
    }

    fn decode(&self, buf: &Bytes, offset: usize) -> Result<T, E> {
        let mut target = T::default();
        let mut cursor = offset;
        for slot in &self.slots {
            (slot.read)(buf, cursor, &mut target)?;
            cursor = cursor.saturating_add(slot.size);
        }
        Ok(target)
    }
}

impl<T, E> fmt::Debug for StructUnit<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructUnit")
            .field("size", &self.size)
            .field("slots", &self.slots.len())
            .finish()
    }
}
