//! Joining rules shared by the extraction backends.

/// Concatenate per-page text in page order with no separator, then trim the
/// result.
///
/// Page text from MuPDF already ends each line with `\n`, so pages run
/// together on line boundaries.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref());
    }
    text.trim().to_string()
}

/// Trim each paragraph, drop the ones left empty, and join the rest with a
/// single `\n`.
pub fn join_paragraphs<I, S>(paragraphs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    paragraphs
        .into_iter()
        .filter_map(|p| {
            let trimmed = p.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
