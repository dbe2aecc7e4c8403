//! Catalog of ready-made house modifications

use serde::Serialize;

/// A named example modification with the prompt it sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
}

pub const FEATURES: &[Feature] = &[
    Feature {
        title: "Modern Roof Tiles",
        description: "Add sleek, dark grey slate tiles to the roof.",
        prompt: "Replace the existing roof of the house with modern, dark grey slate tiles. Maintain realism and proper lighting.",
    },
    Feature {
        title: "Solar Panels",
        description: "Install solar panels seamlessly onto the roof.",
        prompt: "Add an array of modern, high-efficiency solar panels to the largest, sun-facing section of the roof. Blend them realistically with the existing roof style.",
    },
    Feature {
        title: "Cedar Wood Siding",
        description: "Change the exterior walls to beautiful cedar siding.",
        prompt: "Change the exterior walls of the house to have horizontal cedar wood siding. Keep windows, doors, and other features intact.",
    },
    Feature {
        title: "Change Wall Color to Blue",
        description: "Paint the house a stylish navy blue.",
        prompt: "Repaint the exterior walls of the house a deep, stylish navy blue. Keep the trim white for contrast. Ensure the texture of the walls is preserved.",
    },
    Feature {
        title: "Lush Flower Garden",
        description: "Add a vibrant flower garden in the front yard.",
        prompt: "In the front yard, add a lush and colorful flower garden with a mix of perennial flowers like lavender, roses, and daisies. Add a stone border around it.",
    },
    Feature {
        title: "Modern Front Door",
        description: "Replace the front door with a modern, glass-paneled one.",
        prompt: "Replace the existing front door with a modern one featuring a dark wood finish and vertical frosted glass panels. Make sure it fits the entryway perfectly.",
    },
    Feature {
        title: "Stone Veneer Accent",
        description: "Add a stylish stone veneer to the front facade.",
        prompt: "Add a stacked stone veneer accent to the lower third of the front-facing walls of the house. Use a mix of grey and brown tones for a natural look.",
    },
    Feature {
        title: "Add a Balcony",
        description: "Construct a small balcony over the front entrance.",
        prompt: "Add a small, elegant wrought-iron balcony above the front entrance. Make it look structurally sound and integrated with the house design.",
    },
];

/// Look up a feature by title, ignoring case and surrounding whitespace
#[must_use]
pub fn find_feature(title: &str) -> Option<&'static Feature> {
    let wanted = title.trim();
    FEATURES.iter().find(|f| f.title.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_well_formed() {
        assert_eq!(FEATURES.len(), 8);
        for feature in FEATURES {
            assert!(!feature.title.is_empty());
            assert!(!feature.prompt.trim().is_empty());
        }
    }

    #[test]
    fn test_find_feature() {
        assert_eq!(find_feature(" solar panels ").map(|f| f.title), Some("Solar Panels"));
        assert!(find_feature("Swimming Pool").is_none());
    }
}
