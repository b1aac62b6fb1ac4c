//! Address-to-image resolution
//!
//! Stack samples carry raw return addresses; the container's
//! `binary-load-info` table says which binary images were loaded where.
//! Resolution maps an address to `(library, offset)` by binary search over
//! the sorted, non-overlapping load ranges. An address outside every range
//! is not an error; the frame is rendered as a raw address downstream.

use log::warn;

use crate::domain::{ConvertError, Library};
use crate::trace::rows::decode_image_rows;
use crate::trace::schema::BINARY_IMAGE_SCHEMA;
use crate::trace::ContainerReader;

/// Sorted table of loaded binary images for one run.
///
/// Owned exclusively by one conversion call; never shared or mutated after
/// construction.
#[derive(Debug)]
pub struct ImageTable {
    /// Ascending by `load_address_start`, overlaps already resolved.
    images: Vec<Library>,
}

impl ImageTable {
    /// Query the container's loaded-image table and build the sorted list.
    pub async fn build<R: ContainerReader>(reader: &R) -> Result<Self, ConvertError> {
        let xml = reader.export_table(BINARY_IMAGE_SCHEMA).await?;
        Ok(Self::from_images(decode_image_rows(&xml)?))
    }

    /// Sort images ascending by load address and resolve overlaps.
    ///
    /// Overlapping ranges are tolerated: the later entry in source order
    /// wins and the loser is logged as an anomaly, never raised as an
    /// error.
    #[must_use]
    pub fn from_images(images: Vec<Library>) -> Self {
        let mut indexed: Vec<(usize, Library)> = images.into_iter().enumerate().collect();
        indexed.sort_by_key(|(idx, lib)| (lib.load_address_start, *idx));

        let mut resolved: Vec<(usize, Library)> = Vec::with_capacity(indexed.len());
        for (idx, lib) in indexed {
            let overlap = match resolved.last() {
                Some((last_idx, last)) if last.load_address_end > lib.load_address_start => {
                    let replace_last = idx > *last_idx;
                    let (loser, winner) =
                        if replace_last { (last, &lib) } else { (&lib, last) };
                    warn!(
                        "overlapping image ranges: dropping {} (0x{:x}-0x{:x}) in favor of {} (0x{:x}-0x{:x})",
                        loser.name,
                        loser.load_address_start,
                        loser.load_address_end,
                        winner.name,
                        winner.load_address_start,
                        winner.load_address_end,
                    );
                    Some(replace_last)
                }
                _ => None,
            };
            match overlap {
                Some(true) => {
                    resolved.pop();
                    resolved.push((idx, lib));
                }
                Some(false) => {}
                None => resolved.push((idx, lib)),
            }
        }

        Self { images: resolved.into_iter().map(|(_, lib)| lib).collect() }
    }

    /// Resolve an address to the image containing it and the offset within
    /// that image. `None` when no loaded range covers the address.
    #[must_use]
    pub fn resolve(&self, addr: u64) -> Option<(&Library, u64)> {
        let idx = self.images.partition_point(|lib| lib.load_address_end <= addr);
        let lib = self.images.get(idx)?;
        lib.contains(addr).then(|| (lib, addr - lib.load_address_start))
    }

    #[must_use]
    pub fn images(&self) -> &[Library] {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(name: &str, start: u64, end: u64) -> Library {
        Library {
            load_address_start: start,
            load_address_end: end,
            name: name.to_string(),
            path: format!("/usr/lib/{name}.dylib"),
            identifier: String::new(),
        }
    }

    #[test]
    fn test_resolve_within_range() {
        let table =
            ImageTable::from_images(vec![lib("libbar", 0x3000, 0x4000), lib("libfoo", 0x1000, 0x2000)]);

        // Input order does not matter; the table sorts by start address.
        let (found, offset) = table.resolve(0x1010).unwrap();
        assert_eq!(found.name, "libfoo");
        assert_eq!(offset, 0x10);

        let (found, offset) = table.resolve(0x3fff).unwrap();
        assert_eq!(found.name, "libbar");
        assert_eq!(offset, 0xfff);
    }

    #[test]
    fn test_resolve_bounds_are_half_open() {
        let table = ImageTable::from_images(vec![lib("libfoo", 0x1000, 0x2000)]);

        assert!(table.resolve(0x1000).is_some());
        assert!(table.resolve(0x1fff).is_some());
        assert!(table.resolve(0x0fff).is_none());
        assert!(table.resolve(0x2000).is_none());
    }

    #[test]
    fn test_resolve_miss_between_images() {
        let table =
            ImageTable::from_images(vec![lib("libfoo", 0x1000, 0x2000), lib("libbar", 0x3000, 0x4000)]);
        assert!(table.resolve(0x2500).is_none());
        assert!(table.resolve(0x9000).is_none());
    }

    #[test]
    fn test_overlap_later_source_entry_wins() {
        let table = ImageTable::from_images(vec![
            lib("first", 0x1000, 0x3000),
            lib("second", 0x2000, 0x4000),
        ]);

        // The earlier entry is dropped entirely.
        assert_eq!(table.images().len(), 1);
        assert_eq!(table.images()[0].name, "second");

        let (found, offset) = table.resolve(0x2800).unwrap();
        assert_eq!(found.name, "second");
        assert_eq!(offset, 0x800);
        assert!(table.resolve(0x1800).is_none());
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        let table = ImageTable::from_images(Vec::new());
        assert!(table.resolve(0x1000).is_none());
    }
}
