use crate::catalog::Catalog;
use crate::model::Category;

/// First vocabulary with a keyword at a word start decides the category;
/// clothing when none match. `lower_text` must already be lowercased.
pub fn classify_category(catalog: &Catalog, lower_text: &str) -> Category {
    catalog
        .categories
        .iter()
        .find(|(_, re)| re.is_match(lower_text))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Clothing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Category {
        classify_category(&Catalog::default(), &text.to_lowercase())
    }

    #[test]
    fn vocabularies_in_both_languages() {
        assert_eq!(classify("Nike Air Max sneakers"), Category::Shoes);
        assert_eq!(classify("Кроссовки Adidas"), Category::Shoes);
        assert_eq!(classify("Сумка Louis Vuitton"), Category::Accessories);
        assert_eq!(classify("Supreme caps"), Category::Accessories);
        assert_eq!(classify("Куртка Stone Island"), Category::Clothing);
    }

    #[test]
    fn shoes_take_precedence_over_accessories() {
        assert_eq!(classify("Boots + shoe bag included"), Category::Shoes);
    }

    #[test]
    fn defaults_to_clothing() {
        assert_eq!(classify("Nike Air Max"), Category::Clothing);
    }

    #[test]
    fn keywords_match_at_word_start_only() {
        assert_eq!(classify("Nike Tech Fleece, what a deal"), Category::Clothing);
        assert_eq!(classify("Landscape print tee"), Category::Clothing);
    }
}
