#![no_main]

use jofotara::core::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (f64, f64, f64, f64, bool)| {
    let (quantity, price, discount, percent, enabled) = input;
    let mut doc = InvoiceDocument::with_config(ValidationConfig::new(enabled));
    let Ok(item) = doc.items().add_item("1") else {
        return;
    };
    item.set_description("fuzz");
    let _ = item.set_quantity(quantity);
    let _ = item.set_unit_price(price);
    let _ = item.set_discount(discount);
    let _ = item.tax(percent);
    let _ = doc.invoice_totals();
    let _ = doc.generate_xml();
});
