use crate::wtypes::Arc4Type;

use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::{
    constants::{ARC4_MAX_HEAD_SIZE, ARC4_OFFSET_SIZE, BITS_PER_BYTE},
    SourceLocation,
};

/// How a single item is stored in the head of an encoded tuple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemEncoding {
    /// Stored inline, taking `size` bytes.
    Static { size: u64 },
    /// One bit of a byte shared by consecutive bools. Bit zero is the most significant bit.
    PackedBool { bit: u8 },
    /// A two byte offset to the item's encoding in the tail.
    Dynamic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemLayout {
    /// Byte offset of the item (or its offset slot) from the start of the head.
    pub head_offset: u64,
    pub encoding: ItemEncoding,
}

impl ItemLayout {
    pub fn is_dynamic(&self) -> bool {
        matches!(self.encoding, ItemEncoding::Dynamic)
    }

    /// The number of head bytes the item occupies on its own.
    pub fn head_width(&self) -> u64 {
        match self.encoding {
            ItemEncoding::Static { size } => size,
            ItemEncoding::PackedBool { .. } => 1,
            ItemEncoding::Dynamic => ARC4_OFFSET_SIZE,
        }
    }
}

/// The head layout of an encoded tuple, struct or static array.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleLayout {
    items: Vec<ItemLayout>,
    head_size: u64,
}

impl TupleLayout {
    /// Computes the layout of the items of `typ`, rejecting heads that cannot be addressed by a
    /// two byte offset.
    pub fn compute(
        handler: &Handler,
        typ: &Arc4Type,
        location: &SourceLocation,
    ) -> Result<TupleLayout, ErrorEmitted> {
        let too_large = |size: u64| CompileError::EncodedHeadTooLarge {
            type_name: typ.to_string(),
            size,
            max: ARC4_MAX_HEAD_SIZE,
            location: location.clone(),
        };
        let layout = match typ {
            Arc4Type::Tuple { types } => Self::of_items(types),
            Arc4Type::Struct { fields, .. } => Self::of_items(fields.iter().map(|(_, typ)| typ)),
            Arc4Type::StaticArray { element, size } => {
                // Checked before the items are expanded, sizes are only bounded by u64.
                let head_size = static_array_head_size(element, *size);
                if head_size > ARC4_MAX_HEAD_SIZE {
                    return Err(handler.emit_err(too_large(head_size)));
                }
                Self::of_items(std::iter::repeat(element.as_ref()).take(*size as usize))
            }
            Arc4Type::UIntN { .. }
            | Arc4Type::Bool
            | Arc4Type::String
            | Arc4Type::DynamicArray { .. } => {
                return Err(handler.emit_err(CompileError::UnsupportedOperation {
                    operation: "Computing a tuple layout",
                    type_name: typ.to_string(),
                    location: location.clone(),
                }));
            }
        };
        if layout.head_size > ARC4_MAX_HEAD_SIZE {
            return Err(handler.emit_err(too_large(layout.head_size)));
        }
        Ok(layout)
    }

    /// Lays out `types` in order without any size validation.
    pub fn of_items<'a>(types: impl IntoIterator<Item = &'a Arc4Type>) -> TupleLayout {
        let mut items = vec![];
        let mut offset = 0u64;
        // Bit index of the most recent bool, if the previous item was a bool.
        let mut last_bit: Option<u8> = None;
        for typ in types {
            let item = match (typ, last_bit) {
                (Arc4Type::Bool, Some(bit)) if u64::from(bit) + 1 < BITS_PER_BYTE => ItemLayout {
                    head_offset: offset - 1,
                    encoding: ItemEncoding::PackedBool { bit: bit + 1 },
                },
                (Arc4Type::Bool, _) => ItemLayout {
                    head_offset: offset,
                    encoding: ItemEncoding::PackedBool { bit: 0 },
                },
                _ if typ.is_dynamic() => ItemLayout {
                    head_offset: offset,
                    encoding: ItemEncoding::Dynamic,
                },
                _ => ItemLayout {
                    head_offset: offset,
                    encoding: ItemEncoding::Static {
                        size: static_size(typ).unwrap_or_default(),
                    },
                },
            };
            match item.encoding {
                ItemEncoding::PackedBool { bit } => {
                    if bit == 0 {
                        offset = offset.saturating_add(1);
                    }
                    last_bit = Some(bit);
                }
                _ => {
                    offset = offset.saturating_add(item.head_width());
                    last_bit = None;
                }
            }
            items.push(item);
        }
        TupleLayout {
            items,
            head_size: offset,
        }
    }

    pub fn items(&self) -> &[ItemLayout] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&ItemLayout> {
        self.items.get(index)
    }

    pub fn head_size(&self) -> u64 {
        self.head_size
    }

    pub fn is_dynamic(&self) -> bool {
        self.items.iter().any(ItemLayout::is_dynamic)
    }
}

fn static_array_head_size(element: &Arc4Type, size: u64) -> u64 {
    if element.is_dynamic() {
        size.saturating_mul(ARC4_OFFSET_SIZE)
    } else if *element == Arc4Type::Bool {
        size.div_ceil(BITS_PER_BYTE)
    } else {
        size.saturating_mul(static_size(element).unwrap_or_default())
    }
}

/// The encoded size of `typ` in bytes, or `None` if it is dynamic.
pub fn static_size(typ: &Arc4Type) -> Option<u64> {
    if typ.is_dynamic() {
        return None;
    }
    let size = match typ {
        Arc4Type::UIntN { bits } => u64::from(*bits) / BITS_PER_BYTE,
        Arc4Type::Bool => 1,
        Arc4Type::StaticArray { element, size } => static_array_head_size(element, *size),
        Arc4Type::Tuple { types } => TupleLayout::of_items(types).head_size(),
        Arc4Type::Struct { fields, .. } => {
            TupleLayout::of_items(fields.iter().map(|(_, typ)| typ)).head_size()
        }
        Arc4Type::String | Arc4Type::DynamicArray { .. } => return None,
    };
    Some(size)
}
