//! Classical register layout over the flat measurement memory.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::qobj::ExperimentHeader;

/// Widest memory the layout can address with a bitmask.
pub const MAX_MEMORY_BITS: u32 = u128::BITS;

/// One named classical register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalRegister {
    /// Register name.
    pub name: String,
    /// First global memory bit of the register.
    pub offset: u32,
    /// Number of bits.
    pub len: u32,
    /// Mask over global memory: `(1 << (offset + len)) - (1 << offset)`.
    pub mask: u128,
}

impl ClassicalRegister {
    /// Whether the global memory bit lies inside this register.
    pub fn contains(&self, memory: u64) -> bool {
        let start = u64::from(self.offset);
        (start..start + u64::from(self.len)).contains(&memory)
    }
}

/// Register layout of one experiment, in header declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalRegisterLayout {
    registers: Vec<ClassicalRegister>,
}

/// A memory bit resolved to its register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBit<'a> {
    /// Owning register.
    pub register: &'a ClassicalRegister,
    /// Bit index inside the register.
    pub bit: u32,
}

impl ClassicalRegisterLayout {
    /// Build the layout from a header.
    ///
    /// Registers get contiguous, non-overlapping bit ranges starting at 0,
    /// assigned in header order.
    pub fn build(header: &ExperimentHeader) -> IrResult<Self> {
        let mut registers = Vec::with_capacity(header.creg_sizes.len());
        let mut total_bits: u32 = 0;

        for (name, len) in &header.creg_sizes {
            let end = total_bits
                .checked_add(*len)
                .filter(|end| *end <= MAX_MEMORY_BITS)
                .ok_or_else(|| IrError::RegisterTooWide {
                    name: name.clone(),
                    end: total_bits.saturating_add(*len),
                    max: MAX_MEMORY_BITS,
                })?;

            registers.push(ClassicalRegister {
                name: name.clone(),
                offset: total_bits,
                len: *len,
                mask: bit_range_mask(total_bits, end),
            });
            total_bits = end;
        }

        Ok(Self { registers })
    }

    /// Registers in declaration order.
    pub fn registers(&self) -> &[ClassicalRegister] {
        &self.registers
    }

    /// Look up a register by name.
    pub fn get(&self, name: &str) -> Option<&ClassicalRegister> {
        self.registers.iter().find(|r| r.name == name)
    }

    /// Total number of bits covered by the registers.
    pub fn total_bits(&self) -> u32 {
        self.registers.iter().map(|r| r.len).sum()
    }

    /// Whether the layout has no registers.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Resolve a global memory bit to `(register, local bit)`.
    pub fn resolve_memory_bit(&self, memory: u64) -> IrResult<RegisterBit<'_>> {
        let mut total_bits: u64 = 0;
        for register in &self.registers {
            let len = u64::from(register.len);
            if total_bits + len > memory {
                // `memory - total_bits` < len, which fits in u32.
                let bit = u32::try_from(memory - total_bits)
                    .map_err(|_| IrError::MemoryBitNotFound { memory })?;
                return Ok(RegisterBit { register, bit });
            }
            total_bits += len;
        }
        Err(IrError::MemoryBitNotFound { memory })
    }

    /// Find the register whose full mask equals `mask` exactly.
    pub fn find_by_mask(&self, mask: u128) -> IrResult<&ClassicalRegister> {
        self.registers
            .iter()
            .find(|r| r.len > 0 && r.mask == mask)
            .ok_or(IrError::MaskNotFound { mask })
    }
}

/// Mask with bits `[start, end)` set.
fn bit_range_mask(start: u32, end: u32) -> u128 {
    let below = |bit: u32| {
        if bit >= u128::BITS {
            u128::MAX
        } else {
            (1u128 << bit) - 1
        }
    };
    below(end) & !below(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cregs: &[(&str, u32)]) -> ExperimentHeader {
        ExperimentHeader {
            n_qubits: 4,
            memory_slots: cregs.iter().map(|(_, l)| u64::from(*l)).sum(),
            creg_sizes: cregs.iter().map(|(n, l)| ((*n).to_string(), *l)).collect(),
        }
    }

    #[test]
    fn test_offsets_and_masks() {
        let layout = ClassicalRegisterLayout::build(&header(&[("a", 2), ("b", 3)])).unwrap();
        let a = layout.get("a").unwrap();
        let b = layout.get("b").unwrap();
        assert_eq!((a.offset, a.len, a.mask), (0, 2, 0b11));
        assert_eq!((b.offset, b.len, b.mask), (2, 3, 0b11100));
        assert_eq!(layout.total_bits(), 5);
    }

    #[test]
    fn test_resolve_memory_bit() {
        let layout = ClassicalRegisterLayout::build(&header(&[("a", 2), ("b", 3)])).unwrap();
        let rb = layout.resolve_memory_bit(3).unwrap();
        assert_eq!(rb.register.name, "b");
        assert_eq!(rb.bit, 1);
        let rb = layout.resolve_memory_bit(0).unwrap();
        assert_eq!((rb.register.name.as_str(), rb.bit), ("a", 0));
    }

    #[test]
    fn test_resolve_out_of_range() {
        let layout = ClassicalRegisterLayout::build(&header(&[("a", 2)])).unwrap();
        assert!(matches!(
            layout.resolve_memory_bit(2),
            Err(IrError::MemoryBitNotFound { memory: 2 })
        ));
    }

    #[test]
    fn test_find_by_mask_requires_exact_match() {
        let layout = ClassicalRegisterLayout::build(&header(&[("a", 2), ("b", 3)])).unwrap();
        assert_eq!(layout.find_by_mask(0b11100).unwrap().name, "b");
        assert!(matches!(
            layout.find_by_mask(0b00100),
            Err(IrError::MaskNotFound { mask: 0b00100 })
        ));
    }

    #[test]
    fn test_full_width_register() {
        let layout = ClassicalRegisterLayout::build(&header(&[("wide", 128)])).unwrap();
        assert_eq!(layout.get("wide").unwrap().mask, u128::MAX);
    }

    #[test]
    fn test_too_wide() {
        let err = ClassicalRegisterLayout::build(&header(&[("a", 100), ("b", 29)])).unwrap_err();
        assert!(matches!(err, IrError::RegisterTooWide { end: 129, .. }));
    }

    #[test]
    fn test_empty_register_is_skipped_on_resolve() {
        let layout = ClassicalRegisterLayout::build(&header(&[("e", 0), ("a", 1)])).unwrap();
        assert_eq!(layout.resolve_memory_bit(0).unwrap().register.name, "a");
    }
}
