//! M02 Pro command frames.
//!
//! The printer speaks a subset of ESC/POS:
//!
//! | Command      | Bytes                                  |
//! |--------------|----------------------------------------|
//! | Init         | `1B 40`                                |
//! | Raster image | `1D 76 30 <mode> <bpr:u16le> <rows:u16le>` followed by the bitmap |
//! | Line feed    | `1B 64 <rows>`                         |
//! | Battery      | `1F 11 08`                             |
//!
//! Replies start with a category byte. `04` carries the battery percentage
//! in the byte after it.

use std::fmt;

const ESC: u8 = 0x1b;
const GS: u8 = 0x1d;

/// Reply category carrying the battery level.
pub const BATTERY_CATEGORY: u8 = 0x04;

/// Raster image scaling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RasterMode {
    /// The firmware itself uses 0x00; 0x30 is what ESC/POS documents.
    #[default]
    Normal = 0x30,
    DoubleWidth = 0x31,
    DoubleHeight = 0x32,
    Quadruple = 0x33,
}

/// `ESC @`: reset the printer.
pub fn init() -> [u8; 2] {
    [ESC, 0x40]
}

/// `GS v 0`: raster image header. The payload follows as a separate write.
pub fn raster_header(mode: RasterMode, bytes_per_row: u16, rows: u16) -> [u8; 8] {
    let [bx_lo, bx_hi] = bytes_per_row.to_le_bytes();
    let [by_lo, by_hi] = rows.to_le_bytes();
    [GS, 0x76, 0x30, mode as u8, bx_lo, bx_hi, by_lo, by_hi]
}

/// `ESC d n`: feed `rows` lines.
pub fn line_feed(rows: u8) -> [u8; 3] {
    [ESC, 0x64, rows]
}

/// Ask the printer for its battery level.
pub fn battery_query() -> [u8; 3] {
    [0x1f, 0x11, 0x08]
}

/// Decoded status reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterReport {
    Battery { percent: u8 },
    /// Any category not understood yet. `raw` is the reply as received.
    Unknown { raw: Vec<u8> },
}

impl PrinterReport {
    pub fn decode(reply: &[u8]) -> Self {
        match reply {
            [BATTERY_CATEGORY, percent, ..] => Self::Battery { percent: *percent },
            _ => Self::Unknown {
                raw: reply.to_vec(),
            },
        }
    }
}

impl fmt::Display for PrinterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Battery { percent } => write!(f, "Battery life is {percent}%"),
            Self::Unknown { raw } => write!(f, "Unknown status {}", hex(raw)),
        }
    }
}

/// Space separated lowercase hex, for logging replies.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), [0x1b, 0x40]);
    }

    #[test]
    fn test_raster_header_576_by_100() {
        assert_eq!(
            raster_header(RasterMode::Normal, 72, 100),
            [0x1d, 0x76, 0x30, 0x30, 0x48, 0x00, 0x64, 0x00]
        );
    }

    #[test]
    fn test_raster_header_little_endian() {
        let header = raster_header(RasterMode::Quadruple, 0x0102, 0xa0b0);
        assert_eq!(header[3], 0x33);
        assert_eq!(&header[4..], &[0x02, 0x01, 0xb0, 0xa0]);
    }

    #[test]
    fn test_line_feed_and_battery() {
        assert_eq!(line_feed(3), [0x1b, 0x64, 0x03]);
        assert_eq!(battery_query(), [0x1f, 0x11, 0x08]);
    }

    #[test]
    fn test_mode_values() {
        assert_eq!(RasterMode::default() as u8, 0x30);
        assert_eq!(RasterMode::DoubleWidth as u8, 0x31);
        assert_eq!(RasterMode::DoubleHeight as u8, 0x32);
    }

    #[test]
    fn test_decode_battery() {
        assert_eq!(
            PrinterReport::decode(&[0x04, 0x57]),
            PrinterReport::Battery { percent: 87 }
        );
        assert_eq!(
            PrinterReport::decode(&[0x04, 0x64, 0x00, 0x01]),
            PrinterReport::Battery { percent: 100 }
        );
    }

    #[test]
    fn test_decode_unknown() {
        assert_eq!(
            PrinterReport::decode(&[0x02, 0x01]),
            PrinterReport::Unknown {
                raw: vec![0x02, 0x01]
            }
        );
        // A lone battery category byte has no percentage to report.
        assert!(matches!(
            PrinterReport::decode(&[0x04]),
            PrinterReport::Unknown { .. }
        ));
        assert!(matches!(
            PrinterReport::decode(&[]),
            PrinterReport::Unknown { .. }
        ));
    }

    #[test]
    fn test_report_display() {
        assert_eq!(
            PrinterReport::Battery { percent: 87 }.to_string(),
            "Battery life is 87%"
        );
        assert_eq!(
            PrinterReport::Unknown {
                raw: vec![0xaa, 0x0b]
            }
            .to_string(),
            "Unknown status aa 0b"
        );
    }
}
