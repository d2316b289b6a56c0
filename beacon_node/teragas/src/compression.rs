use crate::errors::TeragasError;

const MARKER: u8 = 0xFF;
const MIN_RUN_LENGTH: usize = 4;

/// Run-length codec used by the teragas pipeline's compression stage (§4.12). Runs of `>= 4` of
/// the same non-marker byte collapse to `FF b hi lo` (a big-endian `u16` run length); any literal
/// `0xFF` byte is escaped as `FF FF 00 01` so the decoder never confuses data with a marker.
pub fn simple_compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if b == MARKER {
            out.extend_from_slice(&[MARKER, MARKER, 0x00, 0x01]);
            i += 1;
            continue;
        }
        let mut run = 1usize;
        while i + run < data.len() && data[i + run] == b && run < u16::MAX as usize {
            run += 1;
        }
        if run >= MIN_RUN_LENGTH {
            out.push(MARKER);
            out.push(b);
            out.extend_from_slice(&(run as u16).to_be_bytes());
            i += run;
        } else {
            out.push(b);
            i += 1;
        }
    }
    out
}

pub fn simple_decompress(data: &[u8]) -> Result<Vec<u8>, TeragasError> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if b == MARKER {
            if i + 3 >= data.len() {
                return Err(TeragasError::CompressionFailed);
            }
            let escaped = data[i + 1];
            let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            out.extend(std::iter::repeat(escaped).take(len));
            i += 4;
        } else {
            out.push(b);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_runs_and_literal_marker_bytes() {
        let mut data = vec![1u8, 2, 3];
        data.extend(std::iter::repeat(7u8).take(10));
        data.push(0xFF);
        data.extend_from_slice(&[9, 9, 0xFF, 4, 4, 4, 4, 4]);
        let compressed = simple_compress(&data);
        let recovered = simple_decompress(&compressed).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn round_trips_arbitrary_byte_strings() {
        for seed in 0u8..20 {
            let data: Vec<u8> = (0..200).map(|i| (i as u8).wrapping_mul(seed).wrapping_add(seed)).collect();
            assert_eq!(simple_decompress(&simple_compress(&data)).unwrap(), data);
        }
    }

    #[test]
    fn incompressible_non_marker_data_does_not_expand() {
        let data: Vec<u8> = (0u8..=254).collect(); // no runs, no 0xFF byte
        let compressed = simple_compress(&data);
        assert_eq!(compressed.len(), data.len());
    }

    #[test]
    fn truncated_rle_frame_fails_to_decompress() {
        assert_eq!(
            simple_decompress(&[0xFF, 0x41, 0x00]),
            Err(TeragasError::CompressionFailed)
        );
    }
}
