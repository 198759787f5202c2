// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

use crate::{InterpreterError, ParamMode};

const PAGE_SIZE: usize = 512;
const PAGE_MASK: u64 = 0x1ff;

macro_rules! page_index {
    ($i: expr) => {{
        #[allow(clippy::cast_possible_truncation, reason = "masked down anyway")]
        {
            ($i & PAGE_MASK) as usize
        }
    }};
}

macro_rules! page_base {
    ($i: expr) => {{ $i & !PAGE_MASK }};
}

static EMPTY: [i64; PAGE_SIZE] = [0; PAGE_SIZE];

/// Paged, zero-filled memory tape.
///
/// Pages are keyed by the address of their first cell. Loading a program allocates exactly the
/// pages that cover it, a write to an unallocated page allocates only that page, and reads never
/// allocate. An address that was never written reads as `0`.
pub(crate) struct IntcodeMem {
    pages: HashMap<u64, Box<[i64; PAGE_SIZE]>>,
}

impl IntcodeMem {
    /// Read the cell at `address`, which must not be negative
    pub(crate) fn read(&self, address: i64) -> Result<i64, InterpreterError> {
        let address = u64::try_from(address).map_err(|_| InterpreterError::AddressError(address))?;
        Ok(self[address])
    }

    /// Store `value` at `address`, allocating its page if needed
    pub(crate) fn write(&mut self, address: i64, value: i64) -> Result<(), InterpreterError> {
        let address = u64::try_from(address).map_err(|_| InterpreterError::AddressError(address))?;
        self[address] = value;
        Ok(())
    }

    /// Resolve a write operand to the address it targets.
    pub(crate) fn resolve(
        operand: i64,
        mode: ParamMode,
        rel_base: i64,
    ) -> Result<u64, InterpreterError> {
        let address = match mode {
            ParamMode::Positional => operand,
            ParamMode::Immediate => return Err(InterpreterError::InvalidWriteTarget(operand)),
            ParamMode::Relative => operand
                .checked_add(rel_base)
                .ok_or(InterpreterError::ArithmeticOverflow)?,
        };
        u64::try_from(address).map_err(|_| InterpreterError::AddressError(address))
    }

    /// Render the first page and every page holding a nonzero cell, in address order. Each run
    /// of zero-filled pages between them is shown as a single `<gap start..end>` entry, so the
    /// size of the dump follows the memory in use rather than the highest address written.
    pub(crate) fn dump(&self) -> String {
        let mut next = 0;
        let mut parts = Vec::new();
        for base in self.nonzero_pages().chain([0]).sorted_unstable().dedup() {
            if base != next {
                parts.push(format!("<gap {next:#06x}..{base:#06x}>"));
            }
            parts.extend((base..base + PAGE_SIZE as u64).map(|i| self[i].to_string()));
            next = base + PAGE_SIZE as u64;
        }
        format!("[{}]", parts.join(", "))
    }

    fn nonzero_pages(&self) -> impl Iterator<Item = u64> + '_ {
        self.pages
            .iter()
            .filter_map(|(&base, page)| (page.as_ref() != &EMPTY).then_some(base))
    }
}

impl PartialEq for IntcodeMem {
    fn eq(&self, other: &Self) -> bool {
        let lhs: Vec<u64> = self.nonzero_pages().sorted_unstable().collect();
        let rhs: Vec<u64> = other.nonzero_pages().sorted_unstable().collect();
        lhs == rhs && lhs.iter().all(|base| self.pages[base] == other.pages[base])
    }
}

impl FromIterator<i64> for IntcodeMem {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut pages = HashMap::with_capacity(iter.size_hint().0.div_ceil(PAGE_SIZE));

        let mut base = 0;
        for chunk in &iter.chunks(PAGE_SIZE) {
            let mut page = Box::new([0; PAGE_SIZE]);
            for (cell, val) in page.iter_mut().zip(chunk) {
                *cell = val;
            }
            pages.insert(base, page);
            base += PAGE_SIZE as u64;
        }

        Self { pages }
    }
}

impl std::ops::Index<u64> for IntcodeMem {
    type Output = i64;
    fn index(&self, i: u64) -> &i64 {
        self.pages
            .get(&page_base!(i))
            .map_or(&0, |page| &page[page_index!(i)])
    }
}

impl std::ops::IndexMut<u64> for IntcodeMem {
    fn index_mut(&mut self, i: u64) -> &mut i64 {
        &mut self
            .pages
            .entry(page_base!(i))
            .or_insert_with(|| Box::new([0; PAGE_SIZE]))[page_index!(i)]
    }
}

impl Clone for IntcodeMem {
    fn clone(&self) -> Self {
        // blank pages read the same whether or not they are allocated
        let pages = self
            .pages
            .iter()
            .filter(|&(_, page)| page.as_ref() != &EMPTY)
            .map(|(&base, page)| (base, page.clone()))
            .collect();
        Self { pages }
    }
}

impl fmt::Debug for IntcodeMem {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = fmt.debug_map();
        for base in self.nonzero_pages().sorted_unstable() {
            map.entry(
                &format_args!("{{ page 0x{base:04x} }}"),
                &format_args!("{:?}", self.pages[&base]),
            );
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_reads_zero() {
        let mem: IntcodeMem = [1, 2, 3].into_iter().collect();
        assert_eq!(mem.read(2), Ok(3));
        assert_eq!(mem.read(3), Ok(0));
        assert_eq!(mem.read(1 << 40), Ok(0));
        assert_eq!(mem.pages.len(), 1);
    }

    #[test]
    fn negative_address() {
        let mut mem: IntcodeMem = [1, 2, 3].into_iter().collect();
        assert_eq!(mem.read(-1), Err(InterpreterError::AddressError(-1)));
        assert_eq!(mem.write(-7, 1), Err(InterpreterError::AddressError(-7)));
    }

    #[test]
    fn write_grows_by_single_page() {
        let mut mem: IntcodeMem = [99].into_iter().collect();
        mem.write(1000, 42).unwrap();
        assert_eq!(mem.read(1000), Ok(42));
        assert_eq!(mem.pages.len(), 2);
        // a far write only allocates the page it lands on
        mem.write(1 << 30, 7).unwrap();
        assert_eq!(mem.pages.len(), 3);
        assert_eq!(mem.read(1 << 30), Ok(7));
    }

    #[test]
    fn resolve_modes() {
        assert_eq!(IntcodeMem::resolve(5, ParamMode::Positional, 100), Ok(5));
        assert_eq!(IntcodeMem::resolve(-5, ParamMode::Relative, 100), Ok(95));
        assert_eq!(
            IntcodeMem::resolve(5, ParamMode::Immediate, 100),
            Err(InterpreterError::InvalidWriteTarget(5))
        );
        assert_eq!(
            IntcodeMem::resolve(-101, ParamMode::Relative, 100),
            Err(InterpreterError::AddressError(-1))
        );
        assert_eq!(
            IntcodeMem::resolve(1, ParamMode::Relative, i64::MAX),
            Err(InterpreterError::ArithmeticOverflow)
        );
    }

    #[test]
    fn equality_ignores_blank_pages() {
        let mut a: IntcodeMem = [1, 2].into_iter().collect();
        let b = a.clone();
        a.write(5000, 0).unwrap();
        assert_eq!(a, b);
        a.write(5000, 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn dump_covers_tape() {
        let mem: IntcodeMem = [2, 3, 0, 6, 99].into_iter().collect();
        let dump = mem.dump();
        assert!(dump.starts_with("[2, 3, 0, 6, 99, 0, "));
        assert!(dump.ends_with(", 0]"));
        assert_eq!(dump.matches(", ").count(), 511);
    }

    #[test]
    fn dump_elides_unused_pages() {
        let mut mem: IntcodeMem = [1101, 1, 1, 1 << 22, 99].into_iter().collect();
        mem.write(1 << 22, 2).unwrap();
        let dump = mem.dump();
        assert!(dump.starts_with("[1101, 1, 1, 4194304, 99, 0, "));
        assert!(dump.contains(", 0, <gap 0x0200..0x400000>, 2, 0, "));
        assert_eq!(dump.matches(", ").count(), 2 * PAGE_SIZE);

        // a page that was written but holds only zeros is elided as well
        mem.write(1 << 40, 0).unwrap();
        assert_eq!(mem.dump(), dump);
        assert_eq!(mem.clone().dump(), dump);
    }

    #[test]
    fn dump_of_blank_tape() {
        let mut mem: IntcodeMem = std::iter::empty().collect();
        mem.write(1 << 12, 9).unwrap();
        let dump = mem.dump();
        assert!(dump.starts_with("[0, 0, "));
        assert!(dump.contains(", 0, <gap 0x0200..0x1000>, 9, 0, "));
    }
}
