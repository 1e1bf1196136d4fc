use tempfile::tempdir;
use tg_storefront::catalog::Catalog;
use tg_storefront::extract::extract_product;
use tg_storefront::media::placeholder_url;
use tg_storefront::model::ProductRecord;
use tg_storefront::sink::write_products;

fn record(id: u32, text: &str) -> ProductRecord {
    extract_product(&Catalog::default(), text, id, |l| placeholder_url(&l.brand)).unwrap()
}

#[tokio::test]
async fn json_output_round_trips() {
    let td = tempdir().unwrap();
    let path = td.path().join("out").join("products.json");
    let products = vec![
        record(1, "Nike Air Max\nРазмер: 42\n120 USD / 110 EUR"),
        record(2, "Stone Island Overshirt\n300 EUR"),
    ];

    write_products(&path, "StealthShopEU", &products).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let back: Vec<ProductRecord> = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, products);
}

#[tokio::test]
async fn each_run_replaces_the_file() {
    let td = tempdir().unwrap();
    let path = td.path().join("products.js");

    let first = vec![record(1, "Nike Dunk 150 USD"), record(2, "Adidas Samba 100 USD")];
    write_products(&path, "@StealthShopEU", &first).await.unwrap();
    let second = vec![record(1, "Puma Suede 90 USD")];
    write_products(&path, "@StealthShopEU", &second).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("// Products from Telegram channel @StealthShopEU"));
    assert!(raw.contains("\"brand\": \"Puma\""));
    assert!(!raw.contains("Nike"));

    let json_start = raw.find('[').unwrap();
    let json_end = raw.rfind(']').unwrap();
    let back: Vec<ProductRecord> = serde_json::from_str(&raw[json_start..=json_end]).unwrap();
    assert_eq!(back, second);

    // No temp files are left behind.
    let entries: Vec<_> = std::fs::read_dir(td.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
