//! User-facing error message formatting.
//!
//! Uses typed error matching (calamine error variants, io::ErrorKind) rather
//! than string parsing to produce short status-line messages.

use std::io;

/// Format a calamine error as a user-facing message.
pub fn user_message_from_calamine(err: &calamine::Error) -> String {
    match err {
        calamine::Error::Io(e) | calamine::Error::Xlsx(calamine::XlsxError::Io(e)) => {
            user_message_from_io(e, None)
        }
        calamine::Error::Msg(msg) => format!("Cannot open workbook: {}", msg),
        _ => format!("Cannot read workbook: {}", err),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return if context.is_some() {
                format!("I/O error: {}", msg)
            } else {
                msg
            };
        }
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// First line of a report, for the single-line status bar.
pub fn user_message(report: &color_eyre::eyre::Report) -> String {
    for cause in report.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return user_message_from_io(io_err, None);
        }
    }
    report
        .to_string()
        .lines()
        .next()
        .map(str::trim)
        .unwrap_or("An error occurred")
        .to_string()
}
