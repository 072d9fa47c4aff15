//! Specimen records
//!
//! A [`SpecimenRecord`] holds exactly one code per attribute, in column
//! order. Records built from caller input go through schema validation:
//! every attribute named once, no unknown names, one code per value.

use std::collections::BTreeMap;
use std::fmt;

use toxtrack_core::{Attribute, ATTRIBUTE_COUNT};

use crate::errors::{ClassifierError, Result};

/// One complete set of attribute codes for a single specimen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecimenRecord {
    codes: [char; ATTRIBUTE_COUNT],
}

impl SpecimenRecord {
    /// Build from codes in column order
    pub fn from_codes(codes: [char; ATTRIBUTE_COUNT]) -> Self {
        Self { codes }
    }

    /// Build from `(attribute name, code)` pairs.
    ///
    /// Every attribute must appear exactly once and every value must be a
    /// single character. Codes are not checked against the catalog here;
    /// the column encoders decide what is predictable.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = SpecimenBuilder::new();
        for (name, value) in pairs {
            let attribute = parse_attribute(name.as_ref())?;
            let code = single_code(attribute, value.as_ref())?;
            builder.insert_once(attribute, code)?;
        }
        builder.build()
    }

    /// Like [`SpecimenRecord::from_pairs`] but values may also be human
    /// labels from the catalog (`Convex`, `foul`).
    pub fn from_labels<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = SpecimenBuilder::new();
        for (name, value) in pairs {
            let attribute = parse_attribute(name.as_ref())?;
            let code = resolve_value(attribute, value.as_ref())?;
            builder.insert_once(attribute, code)?;
        }
        builder.build()
    }

    pub fn get(&self, attribute: Attribute) -> char {
        self.codes[attribute.index()]
    }

    /// Copy of this record with one attribute replaced
    pub fn with(mut self, attribute: Attribute, code: char) -> Self {
        self.codes[attribute.index()] = code;
        self
    }

    pub fn codes(&self) -> &[char; ATTRIBUTE_COUNT] {
        &self.codes
    }

    /// `(attribute, code)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, char)> + '_ {
        Attribute::ALL.iter().map(move |&a| (a, self.codes[a.index()]))
    }

    /// Column name to code, for reports
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        self.iter().map(|(a, c)| (a.name(), c.to_string())).collect()
    }
}

impl fmt::Display for SpecimenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(a, c)| format!("{a}={c}")).collect();
        f.write_str(&parts.join(","))
    }
}

/// Incrementally assembles a record, typically starting from the modal
/// specimen and overriding the attributes the user picked.
#[derive(Debug, Clone, Default)]
pub struct SpecimenBuilder {
    codes: [Option<char>; ATTRIBUTE_COUNT],
}

impl SpecimenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with every attribute already set from `base`
    pub fn from_record(base: &SpecimenRecord) -> Self {
        let mut builder = Self::new();
        for (attribute, code) in base.iter() {
            builder.codes[attribute.index()] = Some(code);
        }
        builder
    }

    /// Set or replace an attribute code
    pub fn set(&mut self, attribute: Attribute, code: char) -> &mut Self {
        self.codes[attribute.index()] = Some(code);
        self
    }

    /// Set an attribute value given as a code or catalog label
    pub fn set_value(&mut self, attribute: Attribute, value: &str) -> Result<&mut Self> {
        let code = resolve_value(attribute, value)?;
        Ok(self.set(attribute, code))
    }

    fn insert_once(&mut self, attribute: Attribute, code: char) -> Result<()> {
        let slot = &mut self.codes[attribute.index()];
        if slot.is_some() {
            return Err(ClassifierError::SchemaMismatch(format!(
                "attribute {attribute} given more than once"
            )));
        }
        *slot = Some(code);
        Ok(())
    }

    pub fn build(&self) -> Result<SpecimenRecord> {
        let missing: Vec<&str> = Attribute::ALL
            .iter()
            .filter(|a| self.codes[a.index()].is_none())
            .map(|a| a.name())
            .collect();
        if !missing.is_empty() {
            return Err(ClassifierError::SchemaMismatch(format!(
                "missing attributes: {}",
                missing.join(", ")
            )));
        }

        let mut codes = [' '; ATTRIBUTE_COUNT];
        for (slot, code) in codes.iter_mut().zip(self.codes.iter()) {
            *slot = code.unwrap_or(' ');
        }
        Ok(SpecimenRecord::from_codes(codes))
    }
}

fn parse_attribute(name: &str) -> Result<Attribute> {
    name.parse::<Attribute>()
        .map_err(|err| ClassifierError::SchemaMismatch(err.to_string()))
}

fn single_code(attribute: Attribute, value: &str) -> Result<char> {
    let mut chars = value.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(code), None) => Ok(code),
        _ => Err(ClassifierError::SchemaMismatch(format!(
            "{attribute}: expected a single-character code, got '{value}'"
        ))),
    }
}

/// Catalogued labels and codes resolve through the catalog; any other
/// single character passes through so the encoder can reject it as an
/// unknown category.
fn resolve_value(attribute: Attribute, value: &str) -> Result<char> {
    match attribute.code_for(value) {
        Ok(code) => Ok(code),
        Err(err) => single_code(attribute, value)
            .map_err(|_| ClassifierError::SchemaMismatch(err.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const MODAL_CODES: [char; ATTRIBUTE_COUNT] = [
        'x', 'y', 'n', 'f', 'n', 'f', 'c', 'b', 'b', 't', 'b', 's', 's', 'w', 'w', 'p', 'w', 'o',
        'p', 'n', 'v', 'd',
    ];

    fn full_pairs() -> Vec<(&'static str, String)> {
        Attribute::ALL
            .iter()
            .map(|a| (a.name(), MODAL_CODES[a.index()].to_string()))
            .collect()
    }

    #[test]
    fn test_from_pairs_in_any_order() {
        let mut pairs = full_pairs();
        pairs.reverse();
        let record = SpecimenRecord::from_pairs(pairs).unwrap();
        assert_eq!(record, SpecimenRecord::from_codes(MODAL_CODES));
        assert_eq!(record.get(Attribute::Odor), 'n');
    }

    #[test]
    fn test_missing_attribute_is_schema_mismatch() {
        let pairs: Vec<_> = full_pairs()
            .into_iter()
            .filter(|(name, _)| *name != "habitat")
            .collect();
        let err = SpecimenRecord::from_pairs(pairs).unwrap_err();
        assert!(matches!(err, ClassifierError::SchemaMismatch(ref m) if m.contains("habitat")));
    }

    #[test]
    fn test_unknown_and_duplicate_names_rejected() {
        let mut pairs = full_pairs();
        pairs.push(("cap-texture", "x".to_string()));
        assert!(matches!(
            SpecimenRecord::from_pairs(pairs),
            Err(ClassifierError::SchemaMismatch(_))
        ));

        let mut pairs = full_pairs();
        pairs.push(("odor", "f".to_string()));
        assert!(matches!(
            SpecimenRecord::from_pairs(pairs),
            Err(ClassifierError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_multi_character_code_rejected() {
        let mut pairs = full_pairs();
        pairs[0].1 = "xx".to_string();
        assert!(matches!(
            SpecimenRecord::from_pairs(pairs),
            Err(ClassifierError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_from_labels_resolves_catalog_labels() {
        let mut pairs = full_pairs();
        pairs[Attribute::Odor.index()].1 = "Foul".to_string();
        pairs[Attribute::CapShape.index()].1 = "bell".to_string();
        let record = SpecimenRecord::from_labels(pairs).unwrap();
        assert_eq!(record.get(Attribute::Odor), 'f');
        assert_eq!(record.get(Attribute::CapShape), 'b');
    }

    #[test]
    fn test_from_labels_passes_uncatalogued_codes_through() {
        let mut pairs = full_pairs();
        pairs[Attribute::Odor.index()].1 = "q".to_string();
        let record = SpecimenRecord::from_labels(pairs).unwrap();
        assert_eq!(record.get(Attribute::Odor), 'q');

        let mut pairs = full_pairs();
        pairs[Attribute::Odor.index()].1 = "Rotten".to_string();
        assert!(SpecimenRecord::from_labels(pairs).is_err());
    }

    #[test]
    fn test_builder_overrides_base() {
        let base = SpecimenRecord::from_codes(MODAL_CODES);
        let mut builder = SpecimenBuilder::from_record(&base);
        builder.set(Attribute::Odor, 'a');
        builder.set_value(Attribute::Habitat, "Urban").unwrap();
        let record = builder.build().unwrap();

        assert_eq!(record.get(Attribute::Odor), 'a');
        assert_eq!(record.get(Attribute::Habitat), 'u');
        assert_eq!(record.get(Attribute::CapShape), 'x');
        assert_eq!(record, base.with(Attribute::Odor, 'a').with(Attribute::Habitat, 'u'));
    }

    #[test]
    fn test_display_lists_columns() {
        let record = SpecimenRecord::from_codes(MODAL_CODES);
        let text = record.to_string();
        assert!(text.starts_with("cap-shape=x,cap-surface=y"));
        assert_eq!(record.to_map().len(), ATTRIBUTE_COUNT);
    }
}
