//! Basic usage example for cityfill
//!
//! This example demonstrates how to:
//! - Point an engine at the bundled sample gazetteer
//! - Ask for suggestions with and without accents
//! - Render the answer the way the checkout widget does
//! - Clean a composite city before storing an order

use cityfill::checkout::{AddressFields, CheckoutForm, SelectOption};
use cityfill::prelude::*;

fn main() -> Result<()> {
    println!("=== cityfill Basic Usage Example ===\n");

    let store = GazetteerStore::new(GazetteerStore::default_data_dir());
    let available = store.available_countries()?;
    println!(
        "Gazetteer files: {}",
        available.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
    );

    let engine = SuggestionEngine::in_memory(store, available.into_iter().collect());
    println!("✓ Engine ready\n");

    // Example 1: plain substring search
    println!("--- Example 1: 'sof' in BG ---");
    for place in engine.suggest("sof", "BG")? {
        println!("  {} [{}]", place.city, place.postal_code);
    }
    println!();

    // Example 2: the shopper types without diacritics
    println!("--- Example 2: 'brasov' in RO ---");
    for place in engine.suggest("brasov", "RO")? {
        println!("  {} [{}] region={:?}", place.city, place.postal_code, place.region_code());
    }
    println!();

    // Example 3: what the front end receives and shows
    println!("--- Example 3: select options for 'varn' in BG ---");
    let hits = query::handle(&engine, &SuggestRequest::new("varn", "BG"))?;
    let options: Vec<SelectOption> = hits.iter().map(SelectOption::from).collect();
    for opt in &options {
        println!("  id={:?} text={:?} state={:?}", opt.id, opt.text, opt.state_code);
    }
    println!();

    // Example 4: picking an option and saving the order
    println!("--- Example 4: checkout ---");
    let mut form = CheckoutForm {
        country: "BG".into(),
        billing: AddressFields::default(),
        shipping: None,
    };
    if let Some(opt) = options.first() {
        form.billing.apply_selection(opt);
        println!("  selected: {} / {} / {}", form.billing.city, form.billing.postcode, form.billing.state);
    }
    form.clean_order_cities();
    println!("  stored city: {}", form.billing.city);

    Ok(())
}
