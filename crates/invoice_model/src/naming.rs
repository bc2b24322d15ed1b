//! Export file naming

use crate::DocumentMetadata;
use regex_lite::Regex;
use std::sync::OnceLock;

fn whitespace_runs() -> Option<&'static Regex> {
    static WHITESPACE: OnceLock<Option<Regex>> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").ok()).as_ref()
}

fn underscore_whitespace(text: &str) -> String {
    match whitespace_runs() {
        Some(re) => re.replace_all(text, "_").into_owned(),
        None => text.split_whitespace().collect::<Vec<_>>().join("_"),
    }
}

/// Characters that would turn a name into a path or are rejected by
/// common file systems
fn sanitize_component(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `Invoice-<number>-<client>.pdf`, with runs of whitespace in the client
/// name collapsed to a single underscore.
pub fn export_file_name(metadata: &DocumentMetadata) -> String {
    let number = sanitize_component(metadata.display_invoice_number());
    let client = sanitize_component(&underscore_whitespace(metadata.client.display_name()));
    format!("Invoice-{}-{}.pdf", number, client)
}
