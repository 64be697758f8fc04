//! Static disposal guidance keyed by category.
//!
//! Results never carry backend-written guidance text: instructions, impact
//! and alternatives always come from these tables so that phrasing is the
//! same whichever backend answered.

use serde::Serialize;

use crate::category::Category;

/// Fallback alternatives for categories without a dedicated list.
pub const GENERIC_ALTERNATIVES: &[&str] = &[
    "Reduce consumption",
    "Reuse when possible",
    "Choose sustainable alternatives",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryGuide {
    pub category: Category,
    pub recyclable: &'static str,
    pub non_recyclable: &'static str,
    pub impact: &'static str,
    #[serde(skip)]
    own_alternatives: Option<&'static [&'static str]>,
}

impl CategoryGuide {
    pub fn instructions(&self, recyclable: bool) -> &'static str {
        if recyclable {
            self.recyclable
        } else {
            self.non_recyclable
        }
    }

    pub fn alternatives(&self) -> &'static [&'static str] {
        self.own_alternatives.unwrap_or(GENERIC_ALTERNATIVES)
    }
}

const PLASTIC: CategoryGuide = CategoryGuide {
    category: Category::Plastic,
    recyclable: "Rinse the container thoroughly to remove any food residue. Check for the recycling number on the bottom. Place in your recycling bin with the cap on if accepted locally.",
    non_recyclable: "This type of plastic cannot be recycled in regular programs. Check for special drop-off locations for plastic bags and films at grocery stores. Consider reusing or reducing use.",
    impact: "Plastic recycling prevents ocean pollution and reduces petroleum consumption. Each ton of recycled plastic saves 5,774 kWh of energy.",
    own_alternatives: Some(&[
        "Use reusable bags instead of plastic bags",
        "Choose products with minimal packaging",
        "Opt for glass or metal containers",
    ]),
};

const PAPER: CategoryGuide = CategoryGuide {
    category: Category::Paper,
    recyclable: "Keep paper clean and dry. Remove any plastic windows from envelopes. Flatten cardboard boxes and remove tape. Bundle similar items together if required by your local program.",
    non_recyclable: "Contaminated paper cannot be recycled. Compost food-soiled paper if possible. Shredded paper may need special handling - check local guidelines.",
    impact: "Paper recycling saves trees and reduces landfill waste. One ton of recycled paper saves 17 trees and 7,000 gallons of water.",
    own_alternatives: Some(&[
        "Go digital when possible",
        "Use both sides of paper",
        "Choose recycled paper products",
    ]),
};

const GLASS: CategoryGuide = CategoryGuide {
    category: Category::Glass,
    recyclable: "Rinse glass containers and remove lids. Sort by color if required. Do not break glass unless necessary. Place carefully in recycling bin to avoid injury to workers.",
    non_recyclable: "Window glass, mirrors, and ceramics have different melting points and cannot be recycled with container glass. Dispose in regular trash or check for special programs.",
    impact: "Glass is 100% recyclable and can be recycled endlessly without quality loss. Recycling glass reduces raw material extraction.",
    own_alternatives: Some(&[
        "Reuse glass jars for storage",
        "Return bottles for deposit where available",
    ]),
};

const METAL: CategoryGuide = CategoryGuide {
    category: Category::Metal,
    recyclable: "Rinse metal cans and containers. Aluminum foil should be clean and balled up to at least 2 inches. Steel and aluminum can be recycled together in most programs.",
    non_recyclable: "Paint cans must be completely empty or dried out. Hazardous material containers need special disposal. Large metal items may require special pickup.",
    impact: "Metal recycling is highly efficient. Recycling aluminum saves 95% of the energy needed to produce new aluminum from raw materials.",
    own_alternatives: Some(&[
        "Choose products with refillable options",
        "Donate or sell metal items instead of discarding",
    ]),
};

const ORGANIC: CategoryGuide = CategoryGuide {
    category: Category::Organic,
    recyclable: "Collect food scraps in a kitchen caddy. If you have curbside composting, follow local guidelines. For home composting, maintain proper green to brown ratio.",
    non_recyclable: "Pet waste, diseased plants, and treated wood should not be composted. Meat and dairy may attract pests - check local rules.",
    impact: "Composting reduces methane emissions from landfills and creates valuable soil amendment, completing the natural nutrient cycle.",
    own_alternatives: None,
};

const ELECTRONIC: CategoryGuide = CategoryGuide {
    category: Category::Electronic,
    recyclable: "Never put e-waste in regular recycling. Find certified e-waste recyclers or retailer take-back programs. Remove personal data and batteries first.",
    non_recyclable: "Damaged electronics with leaking batteries need special handling. Medical equipment may have biohazard concerns. Contact specialized disposal services.",
    impact: "E-waste contains precious metals and rare earth elements. Proper recycling recovers these materials and prevents toxic substances from entering the environment.",
    own_alternatives: Some(&[
        "Repair devices instead of replacing",
        "Donate working electronics",
        "Trade in old devices",
    ]),
};

const HAZARDOUS: CategoryGuide = CategoryGuide {
    category: Category::Hazardous,
    recyclable: "Never put hazardous materials in regular recycling. Locate household hazardous waste collection events or permanent drop-off sites in your area.",
    non_recyclable: "Unknown chemicals, medical waste, and asbestos require professional disposal. Contact your local waste management for guidance.",
    impact: "Proper hazardous waste disposal prevents contamination of water supplies and soil, protecting both human health and ecosystems.",
    own_alternatives: None,
};

const MIXED: CategoryGuide = CategoryGuide {
    category: Category::Mixed,
    recyclable: "Items made of multiple materials may need to be separated. Check if components can be recycled individually.",
    non_recyclable: "Mixed material items often cannot be recycled. Consider ways to reuse or repurpose before disposal.",
    impact: "Reducing mixed material waste through conscious purchasing decisions has the greatest environmental benefit.",
    own_alternatives: None,
};

pub fn guide(category: Category) -> &'static CategoryGuide {
    match category {
        Category::Plastic => &PLASTIC,
        Category::Paper => &PAPER,
        Category::Glass => &GLASS,
        Category::Metal => &METAL,
        Category::Organic => &ORGANIC,
        Category::Electronic => &ELECTRONIC,
        Category::Hazardous => &HAZARDOUS,
        Category::Mixed => &MIXED,
    }
}
