// src/exec/host/encoding.rs

//! `-EncodedCommand` text encoding: base64 over UTF-16LE.

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Decode an encoded command back into script text.
pub fn decode_encoded_command(encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .context("encoded command is not valid base64")?;
    if bytes.len() % 2 != 0 {
        bail!("encoded command is not UTF-16 text (odd byte count {})", bytes.len());
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}

/// Encode script text the way `-EncodedCommand` expects it.
pub fn encode_command(script: &str) -> String {
    let bytes: Vec<u8> = script
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf16le_base64() {
        // "echo" in UTF-16LE.
        assert_eq!(decode_encoded_command("ZQBjAGgAbwA=").unwrap(), "echo");
    }

    #[test]
    fn encode_matches_engine_convention() {
        assert_eq!(encode_command("echo"), "ZQBjAGgAbwA=");
        let text = "Write-Output 'héllo ✓'";
        assert_eq!(decode_encoded_command(&encode_command(text)).unwrap(), text);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(decode_encoded_command("not base64!!").is_err());
        // Three bytes cannot be UTF-16.
        assert!(decode_encoded_command("YWJj").is_err());
    }
}
