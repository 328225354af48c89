//! # Revision Converter
//!
//! Re-maps a table from one entry layout to another. Conversion never fails:
//!
//! - each target field is copied from the same-named source field, truncated
//!   or zero-padded to the target width;
//! - target fields with no source counterpart take their declared default;
//! - source entries beyond the target entry count are dropped and missing
//!   entries are filled with defaults.
//!
//! Converting to a smaller layout is lossy by construction. Do not use it where
//! a round trip must reproduce the original bytes.

use crate::error::Result;
use crate::table::catalog::{self, Revision};
use crate::table::layout::{card_layout, EntryLayout};
use log::{debug, info};

/// Map `src` (laid out as `from`) onto the `to` layout.
///
/// Bytes missing from a short `src` are treated as absent and take defaults.
pub fn convert_entries(src: &[u8], from: &EntryLayout, to: &EntryLayout) -> Vec<u8> {
    let src_len = from.entry_len();
    let dst_len = to.entry_len();
    let mut out = vec![0u8; to.table_len()];

    for (index, dst) in out.chunks_exact_mut(dst_len).enumerate() {
        let entry = if index < from.entry_count {
            src.get(index * src_len..(index + 1) * src_len)
        } else {
            None
        };

        for field in to.fields {
            let dst_field = &mut dst[field.range()];
            dst_field.fill(field.default);

            let source = entry
                .zip(from.field(field.name))
                .map(|(entry, src_field)| &entry[src_field.range()]);

            if let Some(bytes) = source {
                let n = bytes.len().min(dst_field.len());
                dst_field[..n].copy_from_slice(&bytes[..n]);
            }
        }
    }

    let dropped = from.entry_count.saturating_sub(to.entry_count);
    if dropped > 0 || src_len > dst_len {
        debug!(
            "Narrowing {:?} -> {:?}: {} entries dropped, {} bytes per entry dropped",
            from.revision,
            to.revision,
            dropped,
            src_len.saturating_sub(dst_len)
        );
    }

    out
}

/// Convert a raw card table payload between firmware revisions.
///
/// The source is size-checked against the catalog first; the conversion itself
/// is infallible. Same-revision conversion returns the input unchanged.
pub fn convert_card_table(src: &[u8], from: Revision, to: Revision) -> Result<Vec<u8>> {
    let from_layout = card_layout(from);
    let to_layout = card_layout(to);

    catalog::validate(from_layout.table_id, from, src.len())?;

    info!(
        "Converting {} table ({}) to {} ({})",
        catalog::name_of(from_layout.table_id)?,
        from,
        catalog::name_of(to_layout.table_id)?,
        to
    );

    Ok(convert_entries(src, from_layout, to_layout))
}
