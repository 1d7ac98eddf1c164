//! Configurable yet non-changing constants for the compiler.

/// The smallest bit width an ARC4 `uintN` may have.
pub const ARC4_UINTN_MIN_BITS: u16 = 8;

/// The largest bit width an ARC4 `uintN` may have.
pub const ARC4_UINTN_MAX_BITS: u16 = 512;

/// The size in bytes of a head slot that refers to a dynamic item in the tail.
pub const ARC4_OFFSET_SIZE: u64 = 2;

/// The size in bytes of the length prefix of a dynamic array or string.
pub const ARC4_LENGTH_PREFIX_SIZE: u64 = 2;

/// Offsets are encoded as `uint16`, so no head may grow past this many bytes.
pub const ARC4_MAX_HEAD_SIZE: u64 = u16::MAX as u64;

/// The number of bools that share one byte of a packed encoding.
pub const BITS_PER_BYTE: u64 = 8;

/// Qualified name prefix of the contract language's ARC4 module.
pub const ARC4_MODULE: &str = "algopy.arc4";

/// Qualified name prefix of the contract language's native types.
pub const NATIVE_MODULE: &str = "algopy";

/// The `uintN` widths that have a named class of their own, like `UInt64`.
pub const ARC4_NAMED_UINT_BITS: [u16; 7] = [8, 16, 32, 64, 128, 256, 512];
