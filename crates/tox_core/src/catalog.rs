//! Static attribute catalog
//!
//! Every specimen is described by 22 categorical attributes, each drawn from
//! a closed alphabet of single-letter codes. The catalog is compiled in:
//! attribute names, codes and human labels are known at build time, so
//! lookups go through the [`Attribute`] enum instead of string maps.
//!
//! Variant order is the dataset column order (after the target column).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CatalogError;

/// Number of attribute columns in a specimen record
pub const ATTRIBUTE_COUNT: usize = 22;

/// Catalog entries for one attribute: `(code, label)` in display order
pub type CatalogEntries = &'static [(char, &'static str)];

/// A categorical mushroom attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Attribute {
    CapShape,
    CapSurface,
    CapColor,
    Bruises,
    Odor,
    GillAttachment,
    GillSpacing,
    GillSize,
    GillColor,
    StalkShape,
    StalkRoot,
    StalkSurfaceAboveRing,
    StalkSurfaceBelowRing,
    StalkColorAboveRing,
    StalkColorBelowRing,
    VeilType,
    VeilColor,
    RingNumber,
    RingType,
    SporePrintColor,
    Population,
    Habitat,
}

const CAP_SHAPE: CatalogEntries = &[
    ('b', "Bell"),
    ('c', "Conical"),
    ('x', "Convex"),
    ('f', "Flat"),
    ('k', "Knobbed"),
    ('s', "Sunken"),
];

const CAP_SURFACE: CatalogEntries = &[
    ('f', "Fibrous"),
    ('g', "Grooves"),
    ('y', "Scaly"),
    ('s', "Smooth"),
];

const CAP_COLOR: CatalogEntries = &[
    ('n', "Brown"),
    ('b', "Buff"),
    ('c', "Cinnamon"),
    ('g', "Gray"),
    ('r', "Green"),
    ('p', "Pink"),
    ('u', "Purple"),
    ('e', "Red"),
    ('w', "White"),
    ('y', "Yellow"),
];

const BRUISES: CatalogEntries = &[('t', "Present"), ('f', "None")];

const ODOR: CatalogEntries = &[
    ('a', "Almond"),
    ('l', "Anise"),
    ('c', "Creosote"),
    ('y', "Fishy"),
    ('f', "Foul"),
    ('m', "Musty"),
    ('n', "None"),
    ('p', "Pungent"),
    ('s', "Spicy"),
];

const GILL_ATTACHMENT: CatalogEntries = &[
    ('a', "Attached"),
    ('d', "Descending"),
    ('f', "Free"),
    ('n', "Notched"),
];

const GILL_SPACING: CatalogEntries = &[('c', "Close"), ('w', "Crowded"), ('d', "Distant")];

const GILL_SIZE: CatalogEntries = &[('b', "Broad"), ('n', "Narrow")];

const GILL_COLOR: CatalogEntries = &[
    ('k', "Black"),
    ('n', "Brown"),
    ('b', "Buff"),
    ('h', "Chocolate"),
    ('g', "Gray"),
    ('r', "Green"),
    ('o', "Orange"),
    ('p', "Pink"),
    ('u', "Purple"),
    ('e', "Red"),
    ('w', "White"),
    ('y', "Yellow"),
];

const STALK_SHAPE: CatalogEntries = &[('e', "Enlarging"), ('t', "Tapering")];

const STALK_ROOT: CatalogEntries = &[
    ('b', "Bulbous"),
    ('c', "Club"),
    ('u', "Cup"),
    ('e', "Equal"),
    ('z', "Rhizomorphs"),
    ('r', "Rooted"),
    ('?', "Unknown"),
];

// shared by the above-ring and below-ring columns
const STALK_SURFACE: CatalogEntries = &[
    ('f', "Fibrous"),
    ('y', "Scaly"),
    ('k', "Silky"),
    ('s', "Smooth"),
];

const STALK_COLOR: CatalogEntries = &[
    ('n', "Brown"),
    ('b', "Buff"),
    ('c', "Cinnamon"),
    ('g', "Gray"),
    ('o', "Orange"),
    ('p', "Pink"),
    ('e', "Red"),
    ('w', "White"),
    ('y', "Yellow"),
];

const VEIL_TYPE: CatalogEntries = &[('p', "Partial"), ('u', "Universal")];

const VEIL_COLOR: CatalogEntries = &[
    ('n', "Brown"),
    ('o', "Orange"),
    ('w', "White"),
    ('y', "Yellow"),
];

const RING_NUMBER: CatalogEntries = &[('n', "None"), ('o', "One"), ('t', "Two")];

const RING_TYPE: CatalogEntries = &[
    ('c', "Cobwebby"),
    ('e', "Evanescent"),
    ('f', "Flaring"),
    ('l', "Large"),
    ('n', "None"),
    ('p', "Pendant"),
    ('s', "Sheathing"),
    ('z', "Zone"),
];

const SPORE_PRINT_COLOR: CatalogEntries = &[
    ('k', "Black"),
    ('n', "Brown"),
    ('b', "Buff"),
    ('h', "Chocolate"),
    ('r', "Green"),
    ('o', "Orange"),
    ('u', "Purple"),
    ('w', "White"),
    ('y', "Yellow"),
];

const POPULATION: CatalogEntries = &[
    ('a', "Abundant"),
    ('c', "Clustered"),
    ('n', "Numerous"),
    ('s', "Scattered"),
    ('v', "Several"),
    ('y', "Solitary"),
];

const HABITAT: CatalogEntries = &[
    ('g', "Grasses"),
    ('l', "Leaves"),
    ('m', "Meadows"),
    ('p', "Paths"),
    ('u', "Urban"),
    ('w', "Waste"),
    ('d', "Woods"),
];

impl Attribute {
    /// All attributes in dataset column order
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Attribute::CapShape,
        Attribute::CapSurface,
        Attribute::CapColor,
        Attribute::Bruises,
        Attribute::Odor,
        Attribute::GillAttachment,
        Attribute::GillSpacing,
        Attribute::GillSize,
        Attribute::GillColor,
        Attribute::StalkShape,
        Attribute::StalkRoot,
        Attribute::StalkSurfaceAboveRing,
        Attribute::StalkSurfaceBelowRing,
        Attribute::StalkColorAboveRing,
        Attribute::StalkColorBelowRing,
        Attribute::VeilType,
        Attribute::VeilColor,
        Attribute::RingNumber,
        Attribute::RingType,
        Attribute::SporePrintColor,
        Attribute::Population,
        Attribute::Habitat,
    ];

    /// Zero-based column position within a specimen record
    pub fn index(self) -> usize {
        self as usize
    }

    /// Dataset column name, e.g. `stalk-color-above-ring`
    pub fn name(self) -> &'static str {
        match self {
            Attribute::CapShape => "cap-shape",
            Attribute::CapSurface => "cap-surface",
            Attribute::CapColor => "cap-color",
            Attribute::Bruises => "bruises",
            Attribute::Odor => "odor",
            Attribute::GillAttachment => "gill-attachment",
            Attribute::GillSpacing => "gill-spacing",
            Attribute::GillSize => "gill-size",
            Attribute::GillColor => "gill-color",
            Attribute::StalkShape => "stalk-shape",
            Attribute::StalkRoot => "stalk-root",
            Attribute::StalkSurfaceAboveRing => "stalk-surface-above-ring",
            Attribute::StalkSurfaceBelowRing => "stalk-surface-below-ring",
            Attribute::StalkColorAboveRing => "stalk-color-above-ring",
            Attribute::StalkColorBelowRing => "stalk-color-below-ring",
            Attribute::VeilType => "veil-type",
            Attribute::VeilColor => "veil-color",
            Attribute::RingNumber => "ring-number",
            Attribute::RingType => "ring-type",
            Attribute::SporePrintColor => "spore-print-color",
            Attribute::Population => "population",
            Attribute::Habitat => "habitat",
        }
    }

    /// Look up an attribute by its column name
    pub fn from_name(name: &str) -> Option<Attribute> {
        Attribute::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Title-cased name for display: `stalk-root` becomes `Stalk Root`
    pub fn display_name(self) -> String {
        self.name()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Every catalogued `(code, label)` pair for this attribute
    pub fn catalog(self) -> CatalogEntries {
        match self {
            Attribute::CapShape => CAP_SHAPE,
            Attribute::CapSurface => CAP_SURFACE,
            Attribute::CapColor => CAP_COLOR,
            Attribute::Bruises => BRUISES,
            Attribute::Odor => ODOR,
            Attribute::GillAttachment => GILL_ATTACHMENT,
            Attribute::GillSpacing => GILL_SPACING,
            Attribute::GillSize => GILL_SIZE,
            Attribute::GillColor => GILL_COLOR,
            Attribute::StalkShape => STALK_SHAPE,
            Attribute::StalkRoot => STALK_ROOT,
            Attribute::StalkSurfaceAboveRing | Attribute::StalkSurfaceBelowRing => STALK_SURFACE,
            Attribute::StalkColorAboveRing | Attribute::StalkColorBelowRing => STALK_COLOR,
            Attribute::VeilType => VEIL_TYPE,
            Attribute::VeilColor => VEIL_COLOR,
            Attribute::RingNumber => RING_NUMBER,
            Attribute::RingType => RING_TYPE,
            Attribute::SporePrintColor => SPORE_PRINT_COLOR,
            Attribute::Population => POPULATION,
            Attribute::Habitat => HABITAT,
        }
    }

    /// Human label for a code, if the code is catalogued
    pub fn label_for(self, code: char) -> Option<&'static str> {
        self.catalog()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Resolve user input to a code.
    ///
    /// Accepts either a catalogued single-letter code or a human label
    /// (case-insensitive), so `x`, `Convex` and `convex` all resolve to `x`
    /// for `cap-shape`.
    pub fn code_for(self, value: &str) -> Result<char, CatalogError> {
        let value = value.trim();
        let mut chars = value.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            if self.label_for(code).is_some() {
                return Ok(code);
            }
        }

        self.catalog()
            .iter()
            .find(|(_, label)| label.eq_ignore_ascii_case(value))
            .map(|(code, _)| *code)
            .ok_or_else(|| CatalogError::UnknownValue {
                attribute: self.name().to_string(),
                value: value.to_string(),
            })
    }

    /// Form section this attribute belongs to
    pub fn group(self) -> AttributeGroup {
        use Attribute::*;
        match self {
            CapShape | CapSurface | CapColor | Bruises | Odor => AttributeGroup::Cap,
            GillAttachment | GillSpacing | GillSize | GillColor => AttributeGroup::Gills,
            StalkShape | StalkRoot | StalkSurfaceAboveRing | StalkSurfaceBelowRing
            | StalkColorAboveRing | StalkColorBelowRing => AttributeGroup::Stalk,
            VeilType | VeilColor | RingNumber | RingType => AttributeGroup::VeilRing,
            SporePrintColor | Population | Habitat => AttributeGroup::Ecology,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Attribute::from_name(&normalized).ok_or_else(|| CatalogError::UnknownAttribute(s.to_string()))
    }
}

/// Sections used to present attributes in a guided form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeGroup {
    Cap,
    Gills,
    Stalk,
    VeilRing,
    Ecology,
}

impl AttributeGroup {
    pub const ALL: [AttributeGroup; 5] = [
        AttributeGroup::Cap,
        AttributeGroup::Gills,
        AttributeGroup::Stalk,
        AttributeGroup::VeilRing,
        AttributeGroup::Ecology,
    ];

    pub fn title(self) -> &'static str {
        match self {
            AttributeGroup::Cap => "Cap",
            AttributeGroup::Gills => "Gills",
            AttributeGroup::Stalk => "Stalk",
            AttributeGroup::VeilRing => "Veil/Ring",
            AttributeGroup::Ecology => "Ecology",
        }
    }

    /// Attributes in this section, in column order
    pub fn attributes(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL.into_iter().filter(move |a| a.group() == self)
    }
}

impl fmt::Display for AttributeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
