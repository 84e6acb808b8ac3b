use filmloc_types::{LineOutcome, RawRecord, SkipReason};

/// Boilerplate lines at the top of a catalog file.
pub const HEADER_LINES: usize = 14;
/// Boilerplate lines at the bottom of a catalog file (the last one is usually empty).
pub const FOOTER_LINES: usize = 2;

/// Extract one record per well-formed data line, dropping malformed lines.
///
/// Returns an empty vector when the text has no data lines between the
/// header and footer.
pub fn extract(text: &str) -> Vec<RawRecord<'_>> {
    extract_lines(text)
        .into_iter()
        .filter_map(|outcome| outcome.record())
        .collect()
}

/// Parse every data line into a [`LineOutcome`], keeping skipped lines visible.
pub fn extract_lines(text: &str) -> Vec<LineOutcome<'_>> {
    let total = text.split('\n').count();
    if total <= HEADER_LINES + FOOTER_LINES {
        return Vec::new();
    }

    text.split('\n')
        .enumerate()
        .skip(HEADER_LINES)
        .take(total - HEADER_LINES - FOOTER_LINES)
        .map(|(idx, raw)| match parse_line(strip_cr(raw)) {
            Ok(record) => LineOutcome::Parsed(record),
            Err(reason) => LineOutcome::Skipped {
                line: idx + 1,
                reason,
            },
        })
        .collect()
}

/// Pick the location column of a split line.
///
/// A trailing column containing `(` is an annotation (studio note and the
/// like), so the column before it is the location. Lines with fewer than two
/// columns have no location at all.
pub fn select_location<'a>(columns: &[&'a str]) -> Result<&'a str, SkipReason> {
    match columns {
        [] | [_] => Err(SkipReason::InsufficientColumns {
            found: columns.len(),
        }),
        [.., location, last] => Ok(if last.contains('(') { *location } else { *last }),
    }
}

fn parse_line(line: &str) -> Result<RawRecord<'_>, SkipReason> {
    let columns: Vec<&str> = line.split('\t').collect();
    let location = select_location(&columns)?;
    Ok(RawRecord {
        title: columns[0],
        location,
    })
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
