// crates/cityfill-core/src/checkout.rs

//! Collaborators for the checkout form: picking a suggestion fills the
//! postcode and state, and composite `"City / Град"` labels are reduced to
//! their primary name before an order is stored.

use crate::config::Settings;
use crate::query::Suggestion;
use serde::{Deserialize, Serialize};

pub const COMPOSITE_SEPARATOR: &str = " / ";

/// Reduce a bilingual label to its primary name.
///
/// ```rust
/// use cityfill_core::checkout::clean_composite;
///
/// assert_eq!(clean_composite("Varna / Варна"), "Varna");
/// assert_eq!(clean_composite("  Sofia "), "Sofia");
/// assert_eq!(clean_composite("Baia-Mare/Nagybánya"), "Baia-Mare/Nagybánya");
/// ```
pub fn clean_composite(name: &str) -> &str {
    let primary = match name.split_once(COMPOSITE_SEPARATOR) {
        Some((head, _)) => head,
        None => name,
    };
    primary.trim()
}

/// An option of the city selector, as rendered by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Full label as stored in the gazetteer; submitted with the form.
    pub id: String,
    /// `"City [postal]"`, shown to the shopper.
    pub text: String,
    pub city: String,
    pub postal_code: String,
    /// Empty when the gazetteer has no region for the place.
    pub state_code: String,
}

impl From<&Suggestion> for SelectOption {
    fn from(s: &Suggestion) -> Self {
        let city = clean_composite(&s.city).to_string();
        SelectOption {
            id: s.city.clone(),
            text: format!("{} [{}]", city, s.postal_code),
            city,
            postal_code: s.postal_code.clone(),
            state_code: s.state_code.clone().unwrap_or_default(),
        }
    }
}

/// City, postcode and state of one address block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub city: String,
    pub postcode: String,
    pub state: String,
}

impl AddressFields {
    /// Mirror a selected option into the dependent fields. Empty postal or
    /// state values leave the current field untouched.
    pub fn apply_selection(&mut self, option: &SelectOption) {
        self.city = option.id.clone();
        if !option.postal_code.is_empty() {
            self.postcode = option.postal_code.clone();
        }
        if !option.state_code.is_empty() {
            self.state = option.state_code.clone();
        }
    }

    pub fn clean_city(&mut self) {
        let cleaned = clean_composite(&self.city);
        if cleaned.len() != self.city.len() {
            self.city = cleaned.to_string();
        }
    }
}

/// The address part of a submitted checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub country: String,
    pub billing: AddressFields,
    #[serde(default)]
    pub shipping: Option<AddressFields>,
}

impl CheckoutForm {
    /// Strip alternate names from billing and shipping cities before the
    /// order is persisted.
    pub fn clean_order_cities(&mut self) {
        self.billing.clean_city();
        if let Some(shipping) = self.shipping.as_mut() {
            shipping.clean_city();
        }
    }
}

/// How the checkout form changes for a country with autocomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverrides {
    pub city_priority: i64,
    pub city_required: bool,
    pub postcode_required: bool,
    pub postcode_readonly: bool,
    pub postcode_hidden: bool,
}

/// `None` when autocomplete is not active for `country`; the form is left
/// as the storefront built it.
pub fn field_overrides(country: &str, settings: &Settings) -> Option<FieldOverrides> {
    if !settings.enabled_set().contains_code(country) {
        return None;
    }
    Some(FieldOverrides {
        city_priority: settings.city_priority(),
        city_required: true,
        postcode_required: false,
        postcode_readonly: true,
        postcode_hidden: true,
    })
}
