//! Report feed framing.
//!
//! The USB host side (a separate host-capable controller) forwards each raw
//! HID report over UART, one report per line:
//!
//! ```text
//! R<hex bytes>*<checksum>\n
//! ```
//!
//! - `R` - Message prefix
//! - `hex bytes` - the raw report as hex pairs, up to [`MAX_REPORT_BYTES`]
//! - `checksum` - 2 hex digits (XOR of the ASCII bytes between R and *)
//! - `\n` - Line terminator (CR ignored if present)
//!
//! The framing layer moves bytes only; interpreting them is
//! [`crate::report::decode`]'s job.

/// Largest raw report carried in one frame.
pub const MAX_REPORT_BYTES: usize = 64;

/// Maximum line length for the feed protocol (including CRLF).
pub const MAX_LINE_LENGTH: usize = 1 + 2 * MAX_REPORT_BYTES + 1 + 2 + 2;

/// Error type for frame parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Malformed frame (prefix, hex, length).
    Parse,
    /// Checksum mismatch.
    Checksum,
}

/// Parse one feed line into `out`, returning the report length in bytes.
///
/// `out` must hold at least [`MAX_REPORT_BYTES`]; frames with more payload
/// than `out` can take are rejected as malformed.
pub fn parse_report_line(line: &[u8], out: &mut [u8]) -> Result<usize, FrameError> {
    let line = strip_line_ending(line);

    if line.first() != Some(&b'R') {
        return Err(FrameError::Parse);
    }

    let star = line
        .iter()
        .rposition(|&b| b == b'*')
        .ok_or(FrameError::Parse)?;
    if star + 3 != line.len() {
        return Err(FrameError::Parse);
    }

    let payload = &line[1..star];
    let received = parse_hex_u8(&line[star + 1..])?;
    if calculate_checksum(payload) != received {
        return Err(FrameError::Checksum);
    }

    if payload.len() % 2 != 0 || payload.len() / 2 > out.len() {
        return Err(FrameError::Parse);
    }

    for (slot, pair) in out.iter_mut().zip(payload.chunks_exact(2)) {
        *slot = (hex_digit(pair[0])? << 4) | hex_digit(pair[1])?;
    }

    Ok(payload.len() / 2)
}

/// Calculate XOR checksum of the payload bytes.
#[inline]
fn calculate_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Strip trailing CR and/or LF from a line.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

/// Parse a 2-character hex string as u8.
#[inline]
fn parse_hex_u8(s: &[u8]) -> Result<u8, FrameError> {
    if s.len() != 2 {
        return Err(FrameError::Parse);
    }
    let high = hex_digit(s[0])?;
    let low = hex_digit(s[1])?;
    Ok((high << 4) | low)
}

/// Convert a hex character to its value.
#[inline]
fn hex_digit(b: u8) -> Result<u8, FrameError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        _ => Err(FrameError::Parse),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;
    use std::string::String;

    use super::*;

    fn frame(report: &[u8]) -> String {
        let payload: String = report.iter().map(|b| format!("{b:02X}")).collect();
        let checksum = calculate_checksum(payload.as_bytes());
        format!("R{payload}*{checksum:02X}\n")
    }

    #[test]
    fn test_round_trip() {
        let report = [0x7Fu8, 0x80, 0x01, 0x00, 0xFF];
        let line = frame(&report);
        let mut out = [0u8; MAX_REPORT_BYTES];
        let len = parse_report_line(line.as_bytes(), &mut out).unwrap();
        assert_eq!(&out[..len], &report);
    }

    #[test]
    fn test_empty_payload_is_a_zero_length_report() {
        let line = frame(&[]);
        let mut out = [0u8; MAX_REPORT_BYTES];
        assert_eq!(parse_report_line(line.as_bytes(), &mut out), Ok(0));
    }

    #[test]
    fn test_lowercase_hex_accepted() {
        let checksum = calculate_checksum(b"abcd");
        let line = format!("Rabcd*{checksum:02X}\n");
        let mut out = [0u8; MAX_REPORT_BYTES];
        let len = parse_report_line(line.as_bytes(), &mut out).unwrap();
        assert_eq!(&out[..len], &[0xAB, 0xCD]);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut out = [0u8; MAX_REPORT_BYTES];
        assert_eq!(
            parse_report_line(b"R7F80*00\n", &mut out),
            Err(FrameError::Checksum)
        );
    }

    #[test]
    fn test_invalid_prefix() {
        let mut out = [0u8; MAX_REPORT_BYTES];
        assert_eq!(
            parse_report_line(b"X7F80*0F\n", &mut out),
            Err(FrameError::Parse)
        );
        assert_eq!(parse_report_line(b"", &mut out), Err(FrameError::Parse));
    }

    #[test]
    fn test_odd_hex_length_rejected() {
        let payload = b"7F8";
        let checksum = calculate_checksum(payload);
        let line = format!("R7F8*{checksum:02X}\n");
        let mut out = [0u8; MAX_REPORT_BYTES];
        assert_eq!(
            parse_report_line(line.as_bytes(), &mut out),
            Err(FrameError::Parse)
        );
    }

    #[test]
    fn test_missing_checksum_rejected() {
        let mut out = [0u8; MAX_REPORT_BYTES];
        assert_eq!(parse_report_line(b"R7F80*\n", &mut out), Err(FrameError::Parse));
        assert_eq!(parse_report_line(b"R7F80\n", &mut out), Err(FrameError::Parse));
    }

    #[test]
    fn test_payload_larger_than_buffer_rejected() {
        let report = [0u8; 4];
        let line = frame(&report);
        let mut out = [0u8; 2];
        assert_eq!(
            parse_report_line(line.as_bytes(), &mut out),
            Err(FrameError::Parse)
        );
    }

    #[test]
    fn test_cr_only_line_ending() {
        let report = [0x12u8, 0x34];
        let line = frame(&report).replace('\n', "\r");
        let mut out = [0u8; MAX_REPORT_BYTES];
        let len = parse_report_line(line.as_bytes(), &mut out).unwrap();
        assert_eq!(&out[..len], &report);
    }
}
