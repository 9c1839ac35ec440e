//
//  gitlab-tools
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # JSON Output
//!
//! Tool results are JSON documents on stdout, pretty-printed by default and
//! on a single line with `--compact`.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`write_json`] | Writes to stdout |
//! | [`write_json_to`] | Writes to any [`Write`] destination |
//! | [`to_json_string`] | Renders without writing |

use serde::Serialize;
use std::io::{self, Write};

/// Renders a value as pretty or compact JSON.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

/// Writes a value as JSON followed by a newline.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::output::write_json_to;
///
/// let mut buffer = Vec::new();
/// write_json_to(&mut buffer, &serde_json::json!({"success": true}), true)?;
/// assert_eq!(String::from_utf8(buffer)?, "{\"success\":true}\n");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
    compact: bool,
) -> anyhow::Result<()> {
    if compact {
        serde_json::to_writer(&mut *writer, value)?;
    } else {
        serde_json::to_writer_pretty(&mut *writer, value)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Writes a value as JSON to stdout.
pub fn write_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json_to(&mut handle, value, compact)?;
    handle.flush()?;
    Ok(())
}
