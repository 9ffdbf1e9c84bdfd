use crate::product::ProductDraft;

/// Demo catalog used to seed an empty account.
pub fn sample_catalog() -> Vec<ProductDraft> {
    [
        ("13607", "Sample item", 180, 7, "Aisle A, row 1, shelf 1"),
        ("10001", "Whole milk", 180, 7, "Chilled, row 1"),
        ("10002", "Yogurt", 21, 3, "Chilled, row 2"),
        ("20001", "Crackers", 365, 30, "Dry goods, row 2"),
        ("30001", "Mineral water", 540, 60, "Beverages, row 1"),
    ]
    .into_iter()
    .map(|(sku, name, shelf_life_days, reminder_days, location)| ProductDraft {
        sku: sku.to_string(),
        name: name.to_string(),
        shelf_life_days,
        reminder_days,
        location: location.to_string(),
    })
    .collect()
}
