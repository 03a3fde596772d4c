//! Pre-parse repair of out-of-range channel message data bytes.
//!
//! A data byte with its top bit set makes midly give up on the rest of the
//! track. Such bytes are reduced to their low 7 bits before parsing so the
//! message and everything after it are kept.

use std::borrow::Cow;

/// Return `data` with every out-of-range channel data byte masked to 7 bits.
///
/// Borrows when nothing needs repair. Bytes inside meta and sysex payloads
/// are never touched.
pub(crate) fn mask_data_bytes(data: &[u8]) -> Cow<'_, [u8]> {
    let offsets = out_of_range_data_bytes(data);
    if offsets.is_empty() {
        return Cow::Borrowed(data);
    }

    log::debug!("masked {} out-of-range data bytes", offsets.len());
    let mut repaired = data.to_vec();
    for offset in offsets {
        repaired[offset] &= 0x7F;
    }
    Cow::Owned(repaired)
}

/// Offsets of data bytes with the top bit set, across every `MTrk` chunk.
fn out_of_range_data_bytes(data: &[u8]) -> Vec<usize> {
    let mut found = Vec::new();
    let mut pos: usize = 0;
    while let Some(header) = pos.checked_add(8).and_then(|end| data.get(pos..end)) {
        let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let body = pos + 8;
        let end = body.saturating_add(len).min(data.len());
        if &header[..4] == b"MTrk" {
            scan_track(data, body, end, &mut found);
        }
        pos = body.saturating_add(len);
    }
    found
}

/// Walk one track body. Stops quietly at anything it cannot follow and
/// leaves the rest to the parser.
fn scan_track(data: &[u8], mut pos: usize, end: usize, found: &mut Vec<usize>) {
    let mut running_status = None;
    while pos < end {
        let Some((_, next)) = read_varlen(data, pos, end) else {
            return;
        };
        pos = next;
        if pos >= end {
            return;
        }

        let status = if data[pos] >= 0x80 {
            pos += 1;
            data[pos - 1]
        } else {
            match running_status {
                Some(status) => status,
                None => return,
            }
        };

        match status {
            0x80..=0xEF => {
                running_status = Some(status);
                let data_len = if matches!(status & 0xF0, 0xC0 | 0xD0) { 1 } else { 2 };
                for _ in 0..data_len {
                    if pos >= end {
                        return;
                    }
                    if data[pos] >= 0x80 {
                        found.push(pos);
                    }
                    pos += 1;
                }
            }
            0xFF => {
                // Type byte, then a length-prefixed payload.
                let Some((len, next)) = read_varlen(data, pos + 1, end) else {
                    return;
                };
                pos = next.saturating_add(len);
            }
            0xF0 | 0xF7 => {
                running_status = None;
                let Some((len, next)) = read_varlen(data, pos, end) else {
                    return;
                };
                pos = next.saturating_add(len);
            }
            _ => return,
        }
    }
}

/// Read a variable-length quantity (at most 4 bytes) starting at `pos`.
///
/// Returns the value and the position after it.
fn read_varlen(data: &[u8], mut pos: usize, end: usize) -> Option<(usize, usize)> {
    let mut value = 0usize;
    for _ in 0..4 {
        if pos >= end {
            return None;
        }
        let byte = data[pos];
        pos += 1;
        value = (value << 7) | usize::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Some((value, pos));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(body: &[u8]) -> Vec<u8> {
        let mut data = b"MThd\x00\x00\x00\x06\x00\x00\x00\x01\x00\x60MTrk".to_vec();
        data.extend_from_slice(&(body.len() as u32).to_be_bytes());
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn clean_data_is_borrowed() {
        let data = track(&[0x00, 0x90, 0x3C, 0x64, 0x10, 0x3C, 0x00, 0x00, 0xFF, 0x2F, 0x00]);
        assert!(matches!(mask_data_bytes(&data), Cow::Borrowed(_)));
    }

    #[test]
    fn bad_controller_value_is_masked() {
        let data = track(&[0x00, 0xB0, 0x07, 0xC8, 0x00, 0xC0, 0x09]);
        let repaired = mask_data_bytes(&data);
        let body = &repaired[22..];
        assert_eq!(body, [0x00, 0xB0, 0x07, 0x48, 0x00, 0xC0, 0x09]);
    }

    #[test]
    fn running_status_data_is_checked() {
        // Note-on, then a running-status note-on with a bad velocity.
        let data = track(&[0x00, 0x90, 0x3C, 0x64, 0x00, 0x40, 0xE4]);
        let repaired = mask_data_bytes(&data);
        assert_eq!(repaired[22 + 6], 0x64);
    }

    #[test]
    fn meta_and_sysex_payloads_are_untouched() {
        let body = [
            0x00, 0xFF, 0x51, 0x03, 0xA1, 0x20, 0x00, // tempo with a high byte
            0x00, 0xF0, 0x02, 0x8F, 0xF7, // sysex with a high byte
            0x00, 0xC0, 0x85, // program change with a bad program
        ];
        let data = track(&body);
        let repaired = mask_data_bytes(&data);
        assert_eq!(repaired[22 + 4], 0xA1);
        assert_eq!(repaired[22 + 10], 0x8F);
        assert_eq!(repaired[22 + 14], 0x05);
    }

    #[test]
    fn truncated_track_does_not_panic() {
        let mut data = track(&[0x00, 0xB0, 0x07]);
        // Claim a longer body than the file holds.
        data[21] = 0x40;
        assert!(matches!(mask_data_bytes(&data), Cow::Borrowed(_)));
    }
}
