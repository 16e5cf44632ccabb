//! Batch cleaning of a directory of quoted-text files

use crate::config::Config;
use crate::error::{CleanError, Result};
use crate::normalizer::normalize;
use crate::types::{BatchReport, OutcomeKind};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use std::borrow::Cow;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{error, info, warn};

/// Decides whether processed input files may be deleted
pub trait Confirm {
    fn confirm_deletion(&mut self) -> bool;
}

impl<F: FnMut() -> bool> Confirm for F {
    fn confirm_deletion(&mut self) -> bool {
        self()
    }
}

/// Asks whether to delete on `output` and reads the answer from `input`
#[derive(Debug)]
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl Prompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, leaving stdout to the report
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm_deletion(&mut self) -> bool {
        let asked = write!(
            self.output,
            "\nAll files processed. Delete the files in the input directory? (y/n): "
        )
        .and_then(|()| self.output.flush());
        if asked.is_err() {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => {
                let _ = writeln!(self.output, "\nCancelled");
                false
            }
            Ok(_) => is_affirmative(&answer),
        }
    }
}

/// Never deletes anything
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepInput;

impl Confirm for KeepInput {
    fn confirm_deletion(&mut self) -> bool {
        false
    }
}

/// `y`, `yes` or `はい`, ignoring case and surrounding whitespace
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "はい")
}

/// Runs the normalizer over every `.txt` file of the input directory
#[derive(Debug, Clone)]
pub struct Cleaner {
    config: Config,
}

impl Cleaner {
    /// Build a cleaner, rejecting an unknown encoding up front
    pub fn new(config: Config) -> Result<Self> {
        config.encoding()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Create the input and output directories if missing
    pub fn create_directories(&self) -> Result<()> {
        let paths = &self.config.paths;
        for dir in [&paths.input_dir, &paths.output_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| CleanError::io("Failed to create directory", dir, e))?;
        }

        info!(
            "Directories ready: {}, {}",
            paths.input_dir.display(),
            paths.output_dir.display()
        );
        Ok(())
    }

    /// Names of the `.txt` files in the input directory, sorted
    pub fn find_text_files(&self) -> Result<Vec<String>> {
        let input_dir = &self.config.paths.input_dir;
        let entries = fs::read_dir(input_dir)
            .map_err(|e| CleanError::io("Failed to list directory", input_dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CleanError::io("Failed to list directory", input_dir, e))?;
            let path = entry.path();
            if path.is_file()
                && has_txt_extension(&path)
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                files.push(name.to_string());
            }
        }
        files.sort();

        info!("Found {} text files", files.len());
        Ok(files)
    }

    /// Copy the given input files into the backup directory.
    ///
    /// Returns 0 without touching the disk when backups are disabled.
    pub fn backup_original_files(&self, files: &[String]) -> Result<usize> {
        if !self.config.processing.backup_original {
            return Ok(0);
        }

        let backup_dir = self.config.backup_dir();
        fs::create_dir_all(&backup_dir)
            .map_err(|e| CleanError::io("Failed to create directory", &backup_dir, e))?;

        for name in files {
            let src = self.config.paths.input_dir.join(name);
            fs::copy(&src, backup_dir.join(name))
                .map_err(|e| CleanError::io("Failed to back up", &src, e))?;
        }

        info!("Backed up {} files", files.len());
        Ok(files.len())
    }

    /// Read, normalize and write one file from the input directory
    pub fn process_single_file(&self, name: &str) -> Result<OutcomeKind> {
        let input_path = self.config.paths.input_dir.join(name);
        let output_path = self.config.paths.output_dir.join(name);
        let encoding = self.config.encoding()?;

        let bytes =
            fs::read(&input_path).map_err(|e| CleanError::io("Failed to read", &input_path, e))?;
        let decoded = decode(&bytes, encoding).ok_or_else(|| CleanError::Decode {
            path: input_path.clone(),
            encoding: encoding.name().to_string(),
        })?;

        let normalized = normalize(&decoded.text, self.config.keywords());
        let kind = normalized.kind();

        let encoded = encode(normalized.text(), decoded.encoding, decoded.bom).ok_or_else(|| {
            CleanError::Encode {
                path: output_path.clone(),
                encoding: decoded.encoding.name().to_string(),
            }
        })?;
        fs::write(&output_path, &encoded)
            .map_err(|e| CleanError::io("Failed to write", &output_path, e))?;

        info!("Processed '{name}' ({kind}) into the output directory");
        Ok(kind)
    }

    /// Remove the given files from the input directory, skipping any that
    /// are already gone.
    pub fn delete_original_files(&self, files: &[String]) -> Result<usize> {
        let mut deleted = 0;
        for name in files {
            let path = self.config.paths.input_dir.join(name);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| CleanError::io("Failed to delete", &path, e))?;
                deleted += 1;
            }
        }

        info!("Deleted {deleted} files");
        Ok(deleted)
    }

    /// Process every text file of the input directory.
    ///
    /// Per-file failures are logged and counted; they never stop the batch.
    pub fn process_all_files(&self, confirm: &mut impl Confirm) -> BatchReport {
        let mut report = BatchReport::default();

        if let Err(e) = self.create_directories() {
            error!("{e}");
            return report;
        }

        let files = match self.find_text_files() {
            Ok(files) => files,
            Err(e) => {
                error!("{e}");
                return report;
            }
        };
        report.discovered = files.len();

        if files.is_empty() {
            warn!("No text files found in the input directory");
            return report;
        }

        match self.backup_original_files(&files) {
            Ok(count) => report.backed_up = count,
            Err(e) => error!("Backup failed: {e}"),
        }

        let total = files.len();
        info!("Processing {total} files...");
        for (i, name) in files.iter().enumerate() {
            info!("Processing ({}/{total}): {name}", i + 1);
            match self.process_single_file(name) {
                Ok(kind) => report.record(kind),
                Err(e) => {
                    error!("Failed to process '{name}': {e}");
                    report.errors += 1;
                }
            }
        }

        info!(
            "Done: {} succeeded, {} failed",
            report.processed, report.errors
        );

        if report.processed > 0 && confirm.confirm_deletion() {
            match self.delete_original_files(&files) {
                Ok(count) => {
                    report.deleted = count;
                    info!("Deleted the files in the input directory");
                }
                Err(e) => warn!("Some files could not be deleted: {e}"),
            }
        } else {
            info!("Files in the input directory were kept");
        }

        report
    }
}

/// Text of one input file and how it was stored
struct Decoded<'a> {
    text: Cow<'a, str>,
    encoding: &'static Encoding,
    bom: bool,
}

/// Strict decode. A byte order mark of the configured encoding (or of
/// either UTF-16 byte order when UTF-16 is configured) is consumed and
/// decides the byte order.
fn decode<'a>(bytes: &'a [u8], configured: &'static Encoding) -> Option<Decoded<'a>> {
    let (encoding, body, bom) = match Encoding::for_bom(bytes) {
        Some((found, len)) if found == configured || (is_utf16(found) && is_utf16(configured)) => {
            (found, &bytes[len..], true)
        }
        _ => (configured, bytes, false),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| Decoded {
            text,
            encoding,
            bom,
        })
}

/// Encode `text` in `encoding`, writing a byte order mark back when the
/// input had one. `None` when a character has no mapping.
///
/// `Encoding::encode` emits UTF-8 for UTF-16 encodings, so those are
/// serialized here.
fn encode(text: &str, encoding: &'static Encoding, bom: bool) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() + 3);

    if encoding == UTF_16LE {
        if bom {
            out.extend_from_slice(&[0xFF, 0xFE]);
        }
        out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    } else if encoding == UTF_16BE {
        if bom {
            out.extend_from_slice(&[0xFE, 0xFF]);
        }
        out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    } else {
        // Only UTF-8 reaches here with a BOM
        if bom {
            out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
        }
        let (bytes, _, unmappable) = encoding.encode(text);
        if unmappable {
            return None;
        }
        out.extend_from_slice(&bytes);
    }

    Some(out)
}

fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}

fn has_txt_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}
