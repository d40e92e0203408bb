//! Nutrient concentration calculator.
//!
//! Pure functions only: grams of each dosed product plus the finished
//! solution volume in, mg/L per element out. Invoked inline by the dose
//! service when an entry is recorded.

use std::collections::BTreeMap;

use crate::model::formulation::{Element, Product};

/// Grams dosed per product for one event. pH adjusters are tracked on
/// the entry but carry no formulation, so they do not appear here.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DoseAmounts {
    pub masterblend: f64,
    pub calcium_nitrate: f64,
    pub magnesium_sulfate: f64,
}

impl DoseAmounts {
    fn amount_of(&self, product: Product) -> f64 {
        match product {
            Product::Masterblend => self.masterblend,
            Product::CalciumNitrate => self.calcium_nitrate,
            Product::MagnesiumSulfate => self.magnesium_sulfate,
        }
    }
}

/// Elemental concentration in mg/L for a dose event, summed across all
/// products contributing each element.
///
/// Per product: `dose_g * percent / 100 * 1000 / volume_l`.
///
/// A volume that is zero, negative, or non-finite yields an empty map
/// rather than NaN or infinity; the same goes for negative or
/// non-finite dose amounts, which are skipped. Elements that end up at
/// exactly zero (nothing dosed contains them) are omitted.
pub fn concentrations(doses: &DoseAmounts, volume_l: f64) -> BTreeMap<Element, f64> {
    let mut totals = BTreeMap::new();

    if !volume_l.is_finite() || volume_l <= 0.0 {
        return totals;
    }

    for product in Product::ALL {
        let grams = doses.amount_of(product);
        if !grams.is_finite() || grams <= 0.0 {
            continue;
        }
        for (element, percent) in product.formulation().elements() {
            let mg_per_l = grams * percent / 100.0 * 1000.0 / volume_l;
            *totals.entry(element).or_insert(0.0) += mg_per_l;
        }
    }

    totals
}
