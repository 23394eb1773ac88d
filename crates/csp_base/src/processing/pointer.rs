//! Pointer marks and the call-scoped identity tables.
//!
//! Without pointer tracking a mark is one octet: `0` for null, `1` when the
//! value follows. With tracking it is an unsigned 64 bit integer in context
//! endianness: `0` for null, `1` for a new object that follows inline, and
//! `n >= 2` for a back-reference to the `(n - 2)`-th object introduced in the
//! same call.

use alloc::format;
use alloc::vec::Vec;

use crate::context::{DeserializationContext, SerializationContext};
use crate::status::{CspError, CspResult};
use crate::value::ObjectId;

const NULL_MARK: u64 = 0;
const INLINE_MARK: u64 = 1;
const FIRST_BACK_REFERENCE: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerMark {
    Null,
    Inline,
    BackReference(u64),
}

pub(crate) fn write_mark(ctx: &mut SerializationContext<'_>, mark: PointerMark) -> CspResult<()> {
    if !ctx.tracks_pointers() {
        let octet = match mark {
            PointerMark::Null => 0_u8,
            PointerMark::Inline => 1,
            PointerMark::BackReference(_) => {
                return Err(CspError::invalid(
                    "back-references require recursive pointer checking",
                ));
            }
        };
        return ctx.buffer_mut().write(octet);
    }

    let raw = match mark {
        PointerMark::Null => NULL_MARK,
        PointerMark::Inline => INLINE_MARK,
        PointerMark::BackReference(index) => index
            .checked_add(FIRST_BACK_REFERENCE)
            .ok_or_else(|| CspError::invalid("too many pointers in one message"))?,
    };
    ctx.buffer_mut().write(raw)
}

pub(crate) fn read_mark(ctx: &mut DeserializationContext<'_>) -> CspResult<PointerMark> {
    if !ctx.tracks_pointers() {
        return match ctx.buffer_mut().read::<u8>()? {
            0 => Ok(PointerMark::Null),
            1 => Ok(PointerMark::Inline),
            other => Err(CspError::corrupted(format!("invalid pointer mark {other}"))),
        };
    }

    Ok(match ctx.buffer_mut().read::<u64>()? {
        NULL_MARK => PointerMark::Null,
        INLINE_MARK => PointerMark::Inline,
        raw => PointerMark::BackReference(raw - FIRST_BACK_REFERENCE),
    })
}

// -----------------------------------------------------------------------------
// Identity tables

/// Pointer indices of the objects already written in this call.
#[derive(Debug, Default)]
pub(crate) struct SerializationPointers {
    // Indexed by arena index.
    seen: Vec<Option<u64>>,
    next: u64,
}

impl SerializationPointers {
    /// Returns the pointer index of `id` if it was written before, otherwise
    /// records it as written and returns `None`.
    pub(crate) fn check(&mut self, id: ObjectId) -> Option<u64> {
        let index = id.index();
        if index >= self.seen.len() {
            self.seen.resize(index + 1, None);
        }
        match self.seen[index] {
            Some(pointer) => Some(pointer),
            None => {
                self.seen[index] = Some(self.next);
                self.next += 1;
                None
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.seen.clear();
        self.next = 0;
    }
}

/// Objects introduced so far in this call, in wire order.
#[derive(Debug, Default)]
pub(crate) struct DeserializationPointers {
    objects: Vec<ObjectId>,
}

impl DeserializationPointers {
    pub(crate) fn push(&mut self, id: ObjectId) {
        self.objects.push(id);
    }

    pub(crate) fn get(&self, pointer: u64) -> Option<ObjectId> {
        usize::try_from(pointer)
            .ok()
            .and_then(|index| self.objects.get(index).copied())
    }

    pub(crate) fn clear(&mut self) {
        self.objects.clear();
    }
}

// -----------------------------------------------------------------------------
// Tests
