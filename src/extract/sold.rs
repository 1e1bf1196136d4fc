use crate::catalog::Catalog;

/// Return the first sold keyword contained in `lower_text`, scanning the
/// catalog's keyword list in order. `lower_text` must already be lowercased.
pub fn sold_keyword<'c>(catalog: &'c Catalog, lower_text: &str) -> Option<&'c str> {
    catalog
        .sold_keywords
        .iter()
        .find(|kw| lower_text.contains(kw.as_str()))
        .map(String::as_str)
}
