use crate::catalog::Catalog;
use crate::model::{DEFAULT_NAME, UNKNOWN_BRAND};

/// Split a title into brand and product name.
///
/// The title line is checked first against every catalog entry in order; only
/// if nothing matches there is the full text scanned. A brand found in the
/// title is cut out of the name, a brand found elsewhere leaves the title
/// untouched.
pub fn classify_brand(catalog: &Catalog, title: &str, full_text: &str) -> (String, String) {
    for brand in catalog.brands() {
        if let Some(m) = brand.find(title) {
            let rest = format!("{} {}", &title[..m.start()], &title[m.end()..]);
            return (brand.name.clone(), tidy_name(&rest));
        }
    }

    let brand = catalog
        .brands()
        .iter()
        .find(|b| b.find(full_text).is_some())
        .map(|b| b.name.clone())
        .unwrap_or_else(|| UNKNOWN_BRAND.to_string());
    (brand, tidy_name(title))
}

fn tidy_name(raw: &str) -> String {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name
    }
}
