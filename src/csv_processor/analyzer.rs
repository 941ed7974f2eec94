use tiktoken_rs::cl100k_base;

pub fn estimate_tokens(text: &str) -> usize {
    match cl100k_base() {
        Ok(bpe) => bpe.encode_with_special_tokens(text).len(),
        Err(_) => text.len() / 4,
    }
}

/// Takes at most `max_rows` leading rows, then drops trailing ones until the
/// comma-joined preview fits in `max_tokens`. The header is always kept.
pub fn bounded_sample<'a>(
    header: &[String],
    rows: &'a [Vec<String>],
    max_rows: usize,
    max_tokens: usize,
) -> &'a [Vec<String>] {
    let mut take = max_rows.min(rows.len());
    while take > 0 && estimate_tokens(&preview_text(header, &rows[..take])) > max_tokens {
        take -= 1;
    }
    &rows[..take]
}

/// Header and rows joined with commas, one record per line.
pub fn preview_text(header: &[String], rows: &[Vec<String>]) -> String {
    std::iter::once(header.join(","))
        .chain(rows.iter().map(|row| row.join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}
