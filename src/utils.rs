/*!
 * Utility functions for llmcopy
 */

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes sampled from the start of a file when sniffing for binary content
const SNIFF_LEN: usize = 8192;

/// Share of control characters above which a sample counts as binary
const BINARY_RATIO: f32 = 0.1;

/// Guess whether a file holds binary data from a sample of its first bytes.
///
/// A sample is text when it is valid UTF-8 (a multi-byte sequence cut off by
/// the sample boundary is fine) and fewer than 10% of its bytes are control
/// characters other than tab, newline, vertical tab, form feed and carriage
/// return. Empty files are not binary.
pub fn is_binary_file(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut buffer = vec![0; SNIFF_LEN];
    let bytes_read = file.read(&mut buffer)?;
    buffer.truncate(bytes_read);

    Ok(is_binary_sample(&buffer))
}

/// Binary heuristic over an in-memory sample
pub fn is_binary_sample(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }

    let valid_utf8 = match std::str::from_utf8(sample) {
        Ok(_) => true,
        // `error_len() == None` means the input ended mid-sequence
        Err(e) => e.error_len().is_none(),
    };
    if !valid_utf8 {
        return true;
    }

    let binary_count = sample
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    let binary_ratio = binary_count as f32 / sample.len() as f32;

    binary_ratio >= BINARY_RATIO
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Format a count with K/M suffixes
pub fn format_number(num: usize) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_text_sample() {
        assert!(!is_binary_sample(b"fn main() {\n\tprintln!(\"hi\");\n}\n"));
        assert!(!is_binary_sample("größe café".as_bytes()));
    }

    #[test]
    fn test_truncated_multibyte_is_text() {
        let bytes = "héllo".as_bytes();
        // cut inside the two-byte `é`
        assert!(!is_binary_sample(&bytes[..2]));
    }

    #[test]
    fn test_binary_samples() {
        assert!(is_binary_sample(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));
        assert!(is_binary_sample(&[0u8, 1, 2, 3]));
        assert!(!is_binary_sample(&[]));
    }

    #[test]
    fn test_is_binary_file() -> io::Result<()> {
        let mut text = NamedTempFile::new()?;
        writeln!(text, "plain text")?;
        assert!(!is_binary_file(text.path())?);

        let mut bin = NamedTempFile::new()?;
        bin.write_all(&[0u8, 159, 146, 150, 0, 0])?;
        assert!(is_binary_file(bin.path())?);
        Ok(())
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(12_345), "12.3K");
        assert_eq!(format_number(2_500_000), "2.5M");
    }
}
