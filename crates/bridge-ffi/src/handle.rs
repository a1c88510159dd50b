//! Packing of tagged handles into one `u64`.
//!
//! Layout, most significant first: an 8-bit [`Kind`], a 24-bit id and a
//! 32-bit slot. Relation handles carry `(program id, relation index)` and
//! read-tuple handles carry `(iterator id, tuple position)`; the other kinds
//! leave the slot at 0. Kinds start at 1, so a packed handle is never 0.

use std::fmt;

/// Largest id that fits in a handle.
pub(crate) const MAX_ID: u32 = (1 << 24) - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Kind {
    Program = 1,
    Relation = 2,
    WriteTuple = 3,
    Iterator = 4,
    ReadTuple = 5,
}

impl Kind {
    fn from_tag(tag: u8) -> Option<Kind> {
        Some(match tag {
            1 => Kind::Program,
            2 => Kind::Relation,
            3 => Kind::WriteTuple,
            4 => Kind::Iterator,
            5 => Kind::ReadTuple,
            _ => return None,
        })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Program => "program",
            Kind::Relation => "relation",
            Kind::WriteTuple => "write tuple",
            Kind::Iterator => "iterator",
            Kind::ReadTuple => "read tuple",
        })
    }
}

pub(crate) fn pack(kind: Kind, id: u32, slot: u32) -> u64 {
    debug_assert!(id <= MAX_ID);
    (u64::from(kind as u8) << 56) | (u64::from(id & MAX_ID) << 32) | u64::from(slot)
}

/// Split a handle into its parts, or `None` if the tag is not a known kind.
pub(crate) fn unpack(handle: u64) -> Option<(Kind, u32, u32)> {
    let kind = Kind::from_tag((handle >> 56) as u8)?;
    let id = (handle >> 32) as u32 & MAX_ID;
    Some((kind, id, handle as u32))
}
