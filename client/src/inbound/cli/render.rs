//! Output rendering for the CLI.

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::domain::{ApiError, SessionUser};

/// Write `value` as pretty JSON followed by a newline.
pub fn render_json(out: &mut dyn Write, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Write a user-facing description of `error`.
///
/// Silent errors produce no output. Field messages follow the summary, one
/// per line, in field-name order.
pub fn render_error(err: &mut dyn Write, error: &ApiError) -> io::Result<()> {
    if error.is_silent() {
        return Ok(());
    }
    writeln!(err, "error: {}", error.message())?;
    for (field, message) in error.fields() {
        writeln!(err, "  {field}: {message}")?;
    }
    Ok(())
}

pub(super) fn user_json(user: &SessionUser) -> Value {
    json!({ "username": user.username(), "isAdmin": user.is_admin() })
}
