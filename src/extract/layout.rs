//! Record layout on an LP64 target.
//!
//! Sizes and alignments are in bits. Types whose layout is unknown count as
//! zero bits with no alignment requirement. So do arrays and records whose
//! size does not fit in 64 bits.

use crate::core::{Field, TranslationUnit, Type};

/// Typedef chains longer than this are treated as unknown.
const MAX_TYPEDEF_DEPTH: usize = 32;

const POINTER_BITS: u64 = 64;

fn align_up(offset: u64, align: u64) -> Option<u64> {
    if align == 0 {
        Some(offset)
    } else {
        offset.div_ceil(align).checked_mul(align)
    }
}

/// `(bit_size, bit_alignment)` of a type.
pub fn type_layout(ty: &Type, unit: &TranslationUnit) -> (u64, u64) {
    layout_at(ty, unit, 0)
}

fn layout_at(ty: &Type, unit: &TranslationUnit, depth: usize) -> (u64, u64) {
    match ty {
        Type::Basic {
            bit_size,
            bit_alignment,
            ..
        } => (*bit_size, *bit_alignment),
        Type::Pointer(_) | Type::FunctionPointer { .. } => (POINTER_BITS, POINTER_BITS),
        Type::Array { element, size } => {
            let (elem_size, elem_align) = layout_at(element, unit, depth);
            let bits = elem_size.checked_mul(size.unwrap_or(0)).unwrap_or(0);
            (bits, elem_align)
        }
        Type::Bitfield { base, .. } => layout_at(base, unit, depth),
        Type::Record { id, .. } => unit
            .record(*id)
            .map_or((0, 0), |r| (r.bit_size(), r.bit_alignment())),
        Type::Enum { .. } => (32, 32),
        Type::Simple { name } => match name.as_str() {
            "id" | "Class" | "SEL" | "instancetype" | "IMP" => (POINTER_BITS, POINTER_BITS),
            "BOOL" => (8, 8),
            _ if depth >= MAX_TYPEDEF_DEPTH => (0, 0),
            _ => unit
                .lookup_typedef(name)
                .map_or((0, 0), |t| layout_at(t.ty(), unit, depth + 1)),
        },
    }
}

/// `(bit_size, bit_alignment)` of a struct or union with these members.
///
/// Members are laid out in order at their natural alignment. A bitfield
/// shares the storage unit of the previous one unless it would straddle a
/// unit boundary of its own type, and a zero-width bitfield moves to the next
/// unit.
pub fn record_layout(fields: &[Field], is_union: bool, unit: &TranslationUnit) -> (u64, u64) {
    checked_record_layout(fields, is_union, unit).unwrap_or((0, 0))
}

fn checked_record_layout(
    fields: &[Field],
    is_union: bool,
    unit: &TranslationUnit,
) -> Option<(u64, u64)> {
    let mut offset = 0u64;
    let mut size = 0u64;
    let mut max_align = 0u64;

    for field in fields {
        let (field_size, align) = type_layout(&field.ty, unit);
        max_align = max_align.max(align);

        if is_union {
            let width = match field.ty {
                Type::Bitfield { width, .. } => u64::from(width),
                _ => field_size,
            };
            size = size.max(width);
            continue;
        }

        match field.ty {
            Type::Bitfield { width, .. } => {
                let width = u64::from(width);
                if width == 0 {
                    offset = align_up(offset, align)?;
                } else {
                    if field_size > 0 && (offset % field_size).saturating_add(width) > field_size {
                        offset = align_up(offset, align)?;
                    }
                    offset = offset.checked_add(width)?;
                }
            }
            _ => {
                offset = align_up(offset, align)?.checked_add(field_size)?;
            }
        }
    }

    if !is_union {
        size = offset;
    }
    Some((align_up(size, max_align)?, max_align))
}
