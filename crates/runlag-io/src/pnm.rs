//! PNM (Portable Any Map) format support
//!
//! Reads and writes the gray and bilevel members of the family:
//! PBM (P1 ASCII, P4 binary) and PGM (P2 ASCII, P5 binary). Color
//! PPM files are refused.
//!
//! PBM stores 1 for black, which maps to gray level 0; 0 maps to 255.
//! PGM samples are rescaled to 0..=255 when the header declares another
//! maximum value.

use crate::{IoError, IoResult};
use runlag_core::{GrayImage, PixelSource, WHITE};
use std::io::{Read, Write};

/// Gray levels at or below this value are written as black in PBM files
pub const PBM_THRESHOLD: u8 = 127;

/// Maximum number of characters per line in ASCII output
const MAX_LINE_LENGTH: usize = 70;

/// PNM variants handled by this module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnmFormat {
    /// P1: ASCII bilevel
    PbmAscii,
    /// P2: ASCII gray
    PgmAscii,
    /// P4: binary bilevel, rows packed MSB first
    PbmBinary,
    /// P5: binary gray, one byte per sample
    PgmBinary,
}

impl PnmFormat {
    /// Two-byte magic number
    pub fn magic(self) -> &'static [u8; 2] {
        match self {
            PnmFormat::PbmAscii => b"P1",
            PnmFormat::PgmAscii => b"P2",
            PnmFormat::PbmBinary => b"P4",
            PnmFormat::PgmBinary => b"P5",
        }
    }

    /// Detect the variant from the start of a file
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnsupportedFormat`] for color or unknown data.
    pub fn detect(header: &[u8]) -> IoResult<Self> {
        match header.get(..2) {
            Some(b"P1") => Ok(PnmFormat::PbmAscii),
            Some(b"P2") => Ok(PnmFormat::PgmAscii),
            Some(b"P4") => Ok(PnmFormat::PbmBinary),
            Some(b"P5") => Ok(PnmFormat::PgmBinary),
            Some(b"P3") | Some(b"P6") => Err(IoError::UnsupportedFormat(
                "color PPM images are not supported".to_string(),
            )),
            _ => Err(IoError::UnsupportedFormat("not a PNM file".to_string())),
        }
    }

    /// Usual file extension
    pub fn extension(self) -> &'static str {
        match self {
            PnmFormat::PbmAscii | PnmFormat::PbmBinary => "pbm",
            PnmFormat::PgmAscii | PnmFormat::PgmBinary => "pgm",
        }
    }

    fn is_bilevel(self) -> bool {
        matches!(self, PnmFormat::PbmAscii | PnmFormat::PbmBinary)
    }
}

/// Read a PNM image (P1/P2/P4/P5) from a reader
///
/// # Errors
///
/// Returns an error on I/O failure, unsupported variants, or malformed
/// data.
pub fn read_pnm<R: Read>(mut reader: R) -> IoResult<GrayImage> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decode_pnm(&data)
}

/// Decode an in-memory PNM image
///
/// # Errors
///
/// See [`read_pnm`].
pub fn decode_pnm(data: &[u8]) -> IoResult<GrayImage> {
    let format = PnmFormat::detect(data)?;
    let mut cursor = Cursor { data, pos: 2 };

    let width = cursor.next_int()?;
    let height = cursor.next_int()?;
    if width <= 0 || height <= 0 {
        return Err(IoError::DecodeError(format!(
            "invalid dimensions {}x{}",
            width, height
        )));
    }
    let max_value = if format.is_bilevel() {
        1
    } else {
        let max = cursor.next_int()?;
        if !(1..=255).contains(&max) {
            return Err(IoError::UnsupportedFormat(format!(
                "PGM maximum value {} (only 8-bit samples are supported)",
                max
            )));
        }
        max
    };

    let (w, h) = (width as usize, height as usize);
    let mut pixels = Vec::with_capacity(w * h);

    match format {
        PnmFormat::PbmAscii => {
            while pixels.len() < w * h {
                let bit = cursor.next_bit()?;
                pixels.push(if bit { 0 } else { WHITE });
            }
        }
        PnmFormat::PgmAscii => {
            while pixels.len() < w * h {
                let value = cursor.next_int()?;
                pixels.push(scale(value, max_value)?);
            }
        }
        PnmFormat::PbmBinary => {
            cursor.skip_single_whitespace()?;
            let row_bytes = w.div_ceil(8);
            let raster = cursor.take(row_bytes * h)?;
            for row in raster.chunks_exact(row_bytes) {
                for x in 0..w {
                    let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
                    pixels.push(if bit == 1 { 0 } else { WHITE });
                }
            }
        }
        PnmFormat::PgmBinary => {
            cursor.skip_single_whitespace()?;
            let raster = cursor.take(w * h)?;
            for &value in raster {
                pixels.push(scale(value as i32, max_value)?);
            }
        }
    }

    Ok(GrayImage::from_raw(width, height, pixels)?)
}

/// Write a gray image as PNM to a writer
///
/// Bilevel variants threshold the image at [`PBM_THRESHOLD`].
///
/// # Errors
///
/// Returns an error on I/O failure.
pub fn write_pnm<W: Write>(image: &GrayImage, format: PnmFormat, mut writer: W) -> IoResult<()> {
    let (width, height) = (image.width(), image.height());
    writer.write_all(format.magic())?;
    write!(writer, "\n{} {}\n", width, height)?;
    if !format.is_bilevel() {
        writeln!(writer, "255")?;
    }

    match format {
        PnmFormat::PbmAscii => {
            for y in 0..height {
                let row: Vec<u8> = (0..width)
                    .map(|x| if is_black(image, x, y) { b'1' } else { b'0' })
                    .collect();
                for chunk in row.chunks(MAX_LINE_LENGTH) {
                    writer.write_all(chunk)?;
                    writer.write_all(b"\n")?;
                }
            }
        }
        PnmFormat::PgmAscii => {
            for y in 0..height {
                let mut line = String::new();
                for x in 0..width {
                    let token = image.pixel(x, y).to_string();
                    if !line.is_empty() && line.len() + 1 + token.len() > MAX_LINE_LENGTH {
                        writeln!(writer, "{}", line)?;
                        line.clear();
                    }
                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(&token);
                }
                writeln!(writer, "{}", line)?;
            }
        }
        PnmFormat::PbmBinary => {
            let row_bytes = (width as usize).div_ceil(8);
            let mut row = vec![0u8; row_bytes];
            for y in 0..height {
                row.fill(0);
                for x in 0..width {
                    if is_black(image, x, y) {
                        let x = x as usize;
                        row[x / 8] |= 0x80 >> (x % 8);
                    }
                }
                writer.write_all(&row)?;
            }
        }
        PnmFormat::PgmBinary => {
            writer.write_all(image.data())?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Encode a gray image as in-memory PNM
///
/// # Errors
///
/// See [`write_pnm`].
pub fn encode_pnm(image: &GrayImage, format: PnmFormat) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    write_pnm(image, format, &mut out)?;
    Ok(out)
}

#[inline]
fn is_black(image: &GrayImage, x: i32, y: i32) -> bool {
    image.pixel(x, y) <= PBM_THRESHOLD
}

fn scale(value: i32, max_value: i32) -> IoResult<u8> {
    if !(0..=max_value).contains(&value) {
        return Err(IoError::DecodeError(format!(
            "sample {} exceeds maximum value {}",
            value, max_value
        )));
    }
    if max_value == 255 {
        return Ok(value as u8);
    }
    Ok(((value * 255 + max_value / 2) / max_value) as u8)
}

/// Byte cursor over PNM data, skipping whitespace and `#` comments
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn skip_separators(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.data.get(self.pos) {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn next_int(&mut self) -> IoResult<i32> {
        self.skip_separators();
        let start = self.pos;
        while self
            .data
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(IoError::DecodeError(format!(
                "expected a number at byte {}",
                start
            )));
        }
        std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| IoError::DecodeError(format!("number too large at byte {}", start)))
    }

    /// P1 samples may be written without separators
    fn next_bit(&mut self) -> IoResult<bool> {
        self.skip_separators();
        match self.data.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            Some(&b) => Err(IoError::DecodeError(format!(
                "invalid PBM sample {:?} at byte {}",
                b as char, self.pos
            ))),
            None => Err(IoError::DecodeError("truncated PBM raster".to_string())),
        }
    }

    fn skip_single_whitespace(&mut self) -> IoResult<()> {
        match self.data.get(self.pos) {
            Some(b) if b.is_ascii_whitespace() => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(IoError::DecodeError(
                "missing whitespace before raster".to_string(),
            )),
        }
    }

    fn take(&mut self, len: usize) -> IoResult<&'a [u8]> {
        let data: &'a [u8] = self.data;
        let end = self.pos + len;
        let slice = data
            .get(self.pos..end)
            .ok_or_else(|| IoError::DecodeError("truncated raster".to_string()))?;
        self.pos = end;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlag_core::BLACK;

    fn sample() -> GrayImage {
        GrayImage::from_raw(3, 2, vec![0, 255, 100, 200, 0, 255]).unwrap()
    }

    #[test]
    fn test_detect() {
        assert_eq!(PnmFormat::detect(b"P5\n").unwrap(), PnmFormat::PgmBinary);
        assert!(matches!(
            PnmFormat::detect(b"P6\n"),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(PnmFormat::detect(b"BM").is_err());
    }

    #[test]
    fn test_read_ascii_pbm_with_comments() {
        let data = b"P1\n# a comment\n4 2\n1 0 0 1\n0110\n";
        let img = decode_pnm(data).unwrap();
        assert_eq!((img.width(), img.height()), (4, 2));
        assert_eq!(img.data(), &[BLACK, WHITE, WHITE, BLACK, WHITE, BLACK, BLACK, WHITE]);
    }

    #[test]
    fn test_read_ascii_pgm_rescales() {
        let data = b"P2 2 1 15\n0 15\n";
        let img = decode_pnm(data).unwrap();
        assert_eq!(img.data(), &[0, 255]);
        assert!(decode_pnm(b"P2 1 1 15\n16\n").is_err());
    }

    #[test]
    fn test_gray_formats_preserve_levels() {
        for format in [PnmFormat::PgmAscii, PnmFormat::PgmBinary] {
            let bytes = encode_pnm(&sample(), format).unwrap();
            assert_eq!(decode_pnm(&bytes).unwrap(), sample());
        }
    }

    #[test]
    fn test_bilevel_formats_threshold() {
        let expected = GrayImage::from_raw(3, 2, vec![0, 255, 0, 255, 0, 255]).unwrap();
        for format in [PnmFormat::PbmAscii, PnmFormat::PbmBinary] {
            let bytes = encode_pnm(&sample(), format).unwrap();
            assert_eq!(decode_pnm(&bytes).unwrap(), expected);
        }
    }

    #[test]
    fn test_binary_pbm_layout() {
        let img = GrayImage::from_raw(9, 1, vec![0, 255, 255, 255, 255, 255, 255, 255, 0]).unwrap();
        let bytes = encode_pnm(&img, PnmFormat::PbmBinary).unwrap();
        assert_eq!(&bytes[..7], b"P4\n9 1\n");
        assert_eq!(&bytes[7..], &[0x80, 0x80]);
    }

    #[test]
    fn test_truncated_raster() {
        assert!(matches!(
            decode_pnm(b"P5\n4 4\n255\n\x00\x00"),
            Err(IoError::DecodeError(_))
        ));
    }
}
