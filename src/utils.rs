//! # Utility functions
//!
//! Small helpers shared by the library and the `cnv-analysis` binary:
//! report number formatting and the mapping from errors to process exit statuses.
use std::io;

/// A file could not be read or written.
pub const EXIT_FILE_IO_ERROR: i32 = 1;
/// Invalid command line, as reported by clap.
pub const EXIT_COMMAND_LINE_ERROR: i32 = 2;
/// An input file was readable but its contents were malformed.
pub const EXIT_INPUT_ERROR: i32 = 3;

/// Render a float with the shortest representation that round-trips,
/// always keeping a decimal point for integral values.
///
/// # Examples
///
/// ```
/// use cnv_analysis::utils::format_float;
///
/// assert_eq!("0.0", format_float(0.));
/// assert_eq!("1.0", format_float(1.));
/// assert_eq!("0.4795001221869534", format_float(0.4795001221869534));
/// ```
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Exit status for a failed run: [`EXIT_FILE_IO_ERROR`] if any error in the chain
/// is an I/O error, [`EXIT_INPUT_ERROR`] otherwise.
pub fn exit_status(error: &anyhow::Error) -> i32 {
    let is_io = error.chain().any(|cause| {
        cause.is::<io::Error>()
            || cause
                .downcast_ref::<csv::Error>()
                .is_some_and(csv::Error::is_io_error)
            || cause
                .downcast_ref::<serde_json::Error>()
                .is_some_and(serde_json::Error::is_io)
    });

    if is_io {
        EXIT_FILE_IO_ERROR
    } else {
        EXIT_INPUT_ERROR
    }
}
