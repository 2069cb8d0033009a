//! Element type tags and the typed-buffer trait.

use crate::error::{Error, Result};

/// The closed set of BITPIX values supported for image data blocks.
///
/// Positive values are unsigned 8-bit or signed integers of that bit width;
/// negative values are IEEE-754 floats of the absolute bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bitpix {
    /// 8-bit unsigned integer (`BITPIX = 8`).
    U8,
    /// 16-bit signed integer (`BITPIX = 16`).
    I16,
    /// 32-bit signed integer (`BITPIX = 32`).
    I32,
    /// 64-bit signed integer (`BITPIX = 64`).
    I64,
    /// 32-bit IEEE float (`BITPIX = -32`).
    F32,
    /// 64-bit IEEE float (`BITPIX = -64`).
    F64,
}

impl Bitpix {
    /// The BITPIX header value for this tag.
    pub const fn value(self) -> i64 {
        match self {
            Bitpix::U8 => 8,
            Bitpix::I16 => 16,
            Bitpix::I32 => 32,
            Bitpix::I64 => 64,
            Bitpix::F32 => -32,
            Bitpix::F64 => -64,
        }
    }

    /// Bytes occupied by one element (`|BITPIX| / 8`).
    pub const fn element_size(self) -> u64 {
        match self {
            Bitpix::U8 => 1,
            Bitpix::I16 => 2,
            Bitpix::I32 => 4,
            Bitpix::I64 => 8,
            Bitpix::F32 => 4,
            Bitpix::F64 => 8,
        }
    }

    /// Maps a raw BITPIX header value to its tag.
    ///
    /// Fails with [`Error::UnsupportedBitpix`] outside the supported set.
    pub fn from_value(v: i64) -> Result<Self> {
        match v {
            8 => Ok(Bitpix::U8),
            16 => Ok(Bitpix::I16),
            32 => Ok(Bitpix::I32),
            64 => Ok(Bitpix::I64),
            -32 => Ok(Bitpix::F32),
            -64 => Ok(Bitpix::F64),
            other => Err(Error::UnsupportedBitpix(other)),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A scalar that can populate a FITS image data block.
///
/// Implemented for exactly the six types the format's BITPIX tag can
/// declare. The `Pod` bound lets element slices be reinterpreted as raw
/// bytes for positional transfers; no byte-order conversion is applied.
pub trait Element: bytemuck::Pod + sealed::Sealed {
    /// The BITPIX tag corresponding to this type.
    const BITPIX: Bitpix;
}

impl Element for u8 {
    const BITPIX: Bitpix = Bitpix::U8;
}

impl Element for i16 {
    const BITPIX: Bitpix = Bitpix::I16;
}

impl Element for i32 {
    const BITPIX: Bitpix = Bitpix::I32;
}

impl Element for i64 {
    const BITPIX: Bitpix = Bitpix::I64;
}

impl Element for f32 {
    const BITPIX: Bitpix = Bitpix::F32;
}

impl Element for f64 {
    const BITPIX: Bitpix = Bitpix::F64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip() {
        for tag in [
            Bitpix::U8,
            Bitpix::I16,
            Bitpix::I32,
            Bitpix::I64,
            Bitpix::F32,
            Bitpix::F64,
        ] {
            assert_eq!(Bitpix::from_value(tag.value()).unwrap(), tag);
        }
    }

    #[test]
    fn element_sizes() {
        assert_eq!(Bitpix::U8.element_size(), 1);
        assert_eq!(Bitpix::I16.element_size(), 2);
        assert_eq!(Bitpix::I32.element_size(), 4);
        assert_eq!(Bitpix::I64.element_size(), 8);
        assert_eq!(Bitpix::F32.element_size(), 4);
        assert_eq!(Bitpix::F64.element_size(), 8);
    }

    #[test]
    fn size_matches_abs_value_over_eight() {
        for tag in [
            Bitpix::U8,
            Bitpix::I16,
            Bitpix::I32,
            Bitpix::I64,
            Bitpix::F32,
            Bitpix::F64,
        ] {
            assert_eq!(tag.element_size(), tag.value().unsigned_abs() / 8);
        }
    }

    #[test]
    fn unsupported_values_rejected() {
        for v in [0, 7, 12, -8, -16, 128, -128] {
            assert!(matches!(
                Bitpix::from_value(v),
                Err(Error::UnsupportedBitpix(got)) if got == v
            ));
        }
    }

    #[test]
    fn trait_tags_match_types() {
        assert_eq!(<u8 as Element>::BITPIX, Bitpix::U8);
        assert_eq!(<i16 as Element>::BITPIX, Bitpix::I16);
        assert_eq!(<i32 as Element>::BITPIX, Bitpix::I32);
        assert_eq!(<i64 as Element>::BITPIX, Bitpix::I64);
        assert_eq!(<f32 as Element>::BITPIX, Bitpix::F32);
        assert_eq!(<f64 as Element>::BITPIX, Bitpix::F64);
    }

    #[test]
    fn trait_size_matches_rust_size() {
        fn check<T: Element>() {
            assert_eq!(T::BITPIX.element_size() as usize, std::mem::size_of::<T>());
        }
        check::<u8>();
        check::<i16>();
        check::<i32>();
        check::<i64>();
        check::<f32>();
        check::<f64>();
    }
}
