use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chemical elements tracked across the formulation table.
/// Serialized by symbol, which is also how they appear as keys
/// in the persisted `calculatedElements` maps.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    N,
    P,
    K,
    Ca,
    Mg,
    S,
    Fe,
    B,
    Cu,
    Mn,
    Zn,
    Mo,
}

impl Element {
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::N => "N",
            Element::P => "P",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Mg => "Mg",
            Element::S => "S",
            Element::Fe => "Fe",
            Element::B => "B",
            Element::Cu => "Cu",
            Element::Mn => "Mn",
            Element::Zn => "Zn",
            Element::Mo => "Mo",
        }
    }
}

/// A named fertilizer product with a fixed percent-by-weight breakdown.
/// The table is static reference data; nothing mutates it after startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Formulation {
    pub name: &'static str,
    pub grade: &'static str,
    elements: &'static [(Element, f64)],
}

impl Formulation {
    /// Percent by weight for one element, 0.0 if the product does not carry it.
    pub fn percent_of(&self, element: Element) -> f64 {
        self.elements
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, pct)| *pct)
            .unwrap_or(0.0)
    }

    pub fn elements(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        self.elements.iter().copied()
    }

    pub fn element_map(&self) -> BTreeMap<Element, f64> {
        self.elements.iter().copied().collect()
    }
}

/// The three products the dosing log tracks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Product {
    Masterblend,
    CalciumNitrate,
    MagnesiumSulfate,
}

const MASTERBLEND: Formulation = Formulation {
    name: "Masterblend",
    grade: "4-18-38",
    elements: &[
        (Element::N, 4.0),
        (Element::P, 7.9),
        (Element::K, 31.5),
        (Element::Mg, 0.5),
        (Element::S, 0.7),
        (Element::Fe, 0.1),
        (Element::B, 0.02),
        (Element::Cu, 0.05),
        (Element::Mn, 0.05),
        (Element::Zn, 0.05),
        (Element::Mo, 0.01),
    ],
};

const CALCIUM_NITRATE: Formulation = Formulation {
    name: "Calcium Nitrate",
    grade: "15.5-0-0",
    elements: &[(Element::N, 15.5), (Element::Ca, 19.0)],
};

const MAGNESIUM_SULFATE: Formulation = Formulation {
    name: "Magnesium Sulfate",
    grade: "Epsom salt",
    elements: &[(Element::Mg, 9.86), (Element::S, 12.9)],
};

impl Product {
    pub const ALL: [Product; 3] = [
        Product::Masterblend,
        Product::CalciumNitrate,
        Product::MagnesiumSulfate,
    ];

    pub fn formulation(&self) -> &'static Formulation {
        match self {
            Product::Masterblend => &MASTERBLEND,
            Product::CalciumNitrate => &CALCIUM_NITRATE,
            Product::MagnesiumSulfate => &MAGNESIUM_SULFATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_lookup() {
        let mb = Product::Masterblend.formulation();
        assert_eq!(mb.percent_of(Element::N), 4.0);
        assert_eq!(mb.percent_of(Element::K), 31.5);
        // Masterblend carries no calcium
        assert_eq!(mb.percent_of(Element::Ca), 0.0);
    }

    #[test]
    fn test_element_serializes_as_symbol() {
        assert_eq!(serde_json::to_string(&Element::Ca).unwrap(), "\"Ca\"");
        assert_eq!(
            serde_json::from_str::<Element>("\"Mg\"").unwrap(),
            Element::Mg
        );
    }

    #[test]
    fn test_every_product_has_a_formulation() {
        for product in Product::ALL {
            assert!(product.formulation().elements().count() > 0);
        }
    }
}
