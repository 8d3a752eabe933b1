// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
//! Tesseract-backed OCR engine.
//!
//! Drives the `tesseract` binary over a temp file and parses its TSV output.
//! No FFI: the subprocess boundary keeps a crashing or missing engine from
//! taking the service down, and availability is just "does the binary run".

use std::path::PathBuf;
use std::process::Command;

use image::GrayImage;
use tracing::debug;

use super::{Charset, OcrEngine, OcrError, OcrToken, RecognitionMode};

const DIGITS_AND_X_WHITELIST: &str = "tessedit_char_whitelist=0123456789xX";

pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self::with_binary("tesseract")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, image: &GrayImage, args: &[&str]) -> Result<String, OcrError> {
        let input = tempfile::Builder::new()
            .prefix("brickscan-ocr-")
            .suffix(".png")
            .tempfile()?;
        image
            .save_with_format(input.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::Encode(e.to_string()))?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OcrError::Unavailable
                } else {
                    OcrError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn charset_args(charset: Charset) -> Vec<&'static str> {
        match charset {
            Charset::DigitsAndX => vec!["-c", DIGITS_AND_X_WHITELIST],
            Charset::Any => Vec::new(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    fn recognize_line(&self, image: &GrayImage, charset: Charset) -> Result<String, OcrError> {
        let mut args = vec!["--oem", "3", "--psm", "7"];
        args.extend(Self::charset_args(charset));
        let text = self.run(image, &args)?;
        debug!(text = text.trim(), "single-line OCR");
        Ok(text.trim().to_string())
    }

    fn recognize_tokens(
        &self,
        image: &GrayImage,
        mode: RecognitionMode,
        charset: Charset,
    ) -> Result<Vec<OcrToken>, OcrError> {
        let psm = match mode {
            RecognitionMode::SingleLine => "7",
            RecognitionMode::SparseText => "11",
        };
        let mut args = vec!["--oem", "3", "--psm", psm];
        args.extend(Self::charset_args(charset));
        args.push("tsv");
        let tsv = self.run(image, &args)?;
        let tokens = parse_tsv_tokens(&tsv);
        debug!(count = tokens.len(), "token OCR");
        Ok(tokens)
    }
}

/// Parse tesseract TSV output into word-level tokens.
///
/// TSV columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Word rows have level 5; rows with
/// negative confidence are layout artifacts, not recognized text.
fn parse_tsv_tokens(tsv: &str) -> Vec<OcrToken> {
    let mut tokens = Vec::new();

    for (idx, row) in tsv.lines().enumerate() {
        if idx == 0 {
            continue;
        }
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 12 {
            continue;
        }
        let level: i32 = cols[0].parse().unwrap_or(0);
        if level != 5 {
            continue;
        }
        let left: u32 = cols[6].parse().unwrap_or(0);
        let top: u32 = cols[7].parse().unwrap_or(0);
        let width: u32 = cols[8].parse().unwrap_or(0);
        let height: u32 = cols[9].parse().unwrap_or(0);
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        tokens.push(OcrToken {
            text: text.to_string(),
            confidence: conf,
            left,
            top,
            width,
            height,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn parses_word_rows_only() {
        let tsv = format!(
            "{HEADER}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t300\t100\t-1\t\n\
             5\t1\t1\t1\t1\t1\t12\t40\t38\t14\t91.5\t11x\n\
             5\t1\t1\t1\t1\t2\t60\t42\t20\t12\t-1\t\n\
             5\t1\t1\t1\t2\t1\t14\t70\t22\t13\t33\t2x"
        );
        let tokens = parse_tsv_tokens(&tsv);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "11x");
        assert_eq!(tokens[0].left, 12);
        assert_eq!(tokens[0].top, 40);
        assert!((tokens[0].confidence - 91.5).abs() < 0.01);
        assert_eq!(tokens[1].text, "2x");
    }

    #[test]
    fn empty_tsv_yields_no_tokens() {
        assert!(parse_tsv_tokens(HEADER).is_empty());
        assert!(parse_tsv_tokens("").is_empty());
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let tsv = format!("{HEADER}\nnot\ta\tvalid\trow");
        assert!(parse_tsv_tokens(&tsv).is_empty());
    }

    #[test]
    fn charset_args_restrict_to_digits() {
        let args = TesseractEngine::charset_args(Charset::DigitsAndX);
        assert_eq!(args, vec!["-c", DIGITS_AND_X_WHITELIST]);
        assert!(TesseractEngine::charset_args(Charset::Any).is_empty());
    }

    #[test]
    fn missing_binary_reports_unavailable() {
        let engine = TesseractEngine::with_binary("/nonexistent/tesseract-binary");
        assert!(!engine.is_available());

        let image = GrayImage::new(8, 8);
        match engine.recognize_line(&image, Charset::Any) {
            Err(OcrError::Unavailable) => {}
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }
}
