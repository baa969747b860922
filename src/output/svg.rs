//! SVG chart output writer.
//!
//! Writes SVG content to files with proper encoding.

use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write SVG content to a file
///
/// **Public** - main entry point for SVG output
///
/// # Arguments
/// * `svg_content` - SVG string from the chart generator
/// * `output_path` - Path to output SVG file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_svg(svg_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing SVG to: {}", output_path.display());

    super::json::validate_output_path(output_path)?;
    super::json::create_parent_dirs(output_path)?;

    if let Some(ext) = output_path.extension() {
        if ext != "svg" {
            debug!(
                "Warning: File does not have .svg extension: {}",
                output_path.display()
            );
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(svg_content.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!(
        "SVG written successfully ({} bytes, {:.2} KB)",
        svg_content.len(),
        svg_content.len() as f64 / 1024.0
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_svg_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        write_svg("<svg></svg>", &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "<svg></svg>");
    }

    #[test]
    fn test_write_svg_rejects_directory() {
        let dir = tempdir().unwrap();
        let result = write_svg("<svg></svg>", dir.path());
        assert!(result.is_err());
    }
}
