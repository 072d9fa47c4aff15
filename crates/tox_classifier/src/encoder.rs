//! Categorical column encoders
//!
//! Each column gets a bijection between the codes observed in the training
//! data and dense indices `0..k`, ordered lexicographically by code. Codes
//! never observed during fitting cannot be encoded.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

use toxtrack_core::{Attribute, Edibility, ATTRIBUTE_COUNT};

use crate::errors::{ClassifierError, Result};
use crate::specimen::SpecimenRecord;

/// Bijection between observed codes and `0..k`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnEncoder {
    classes: Vec<char>,
}

impl ColumnEncoder {
    /// Fit on the codes observed in one column
    pub fn fit<I: IntoIterator<Item = char>>(codes: I) -> Self {
        let classes: BTreeSet<char> = codes.into_iter().collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    /// Observed codes, indexed by their encoding
    pub fn classes(&self) -> &[char] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, code: char) -> bool {
        self.encode(code).is_some()
    }

    pub fn encode(&self, code: char) -> Option<u32> {
        self.classes.binary_search(&code).ok().map(|i| i as u32)
    }

    pub fn decode(&self, index: u32) -> Option<char> {
        self.classes.get(index as usize).copied()
    }
}

/// Target column encoder, decoding straight to [`Edibility`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetEncoder {
    column: ColumnEncoder,
}

impl TargetEncoder {
    pub fn fit<I: IntoIterator<Item = Edibility>>(labels: I) -> Self {
        Self {
            column: ColumnEncoder::fit(labels.into_iter().map(Edibility::code)),
        }
    }

    pub fn encode(&self, label: Edibility) -> Option<u32> {
        self.column.encode(label.code())
    }

    pub fn decode(&self, index: u32) -> Result<Edibility> {
        let code = self.column.decode(index).ok_or_else(|| {
            ClassifierError::Inference(format!("class index {index} has no target code"))
        })?;
        Edibility::from_code(code).map_err(|err| ClassifierError::Inference(err.to_string()))
    }

    /// Labels in encoded order
    pub fn labels(&self) -> Vec<Edibility> {
        self.column
            .classes()
            .iter()
            .filter_map(|&c| Edibility::from_code(c).ok())
            .collect()
    }

    pub fn codes(&self) -> &[char] {
        self.column.classes()
    }

    pub fn len(&self) -> usize {
        self.column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column.is_empty()
    }
}

/// One encoder per attribute column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecimenEncoder {
    columns: Vec<ColumnEncoder>,
}

impl SpecimenEncoder {
    /// Fit every column independently on the given records
    pub fn fit<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SpecimenRecord> + Clone,
    {
        let columns = Attribute::ALL
            .iter()
            .map(|&attribute| {
                ColumnEncoder::fit(records.clone().into_iter().map(|r| r.get(attribute)))
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, attribute: Attribute) -> &ColumnEncoder {
        &self.columns[attribute.index()]
    }

    /// Encode a record into a feature vector in column order.
    ///
    /// Fails on the first code the matching column never observed.
    pub fn encode(&self, record: &SpecimenRecord) -> Result<Vec<u32>> {
        record
            .iter()
            .map(|(attribute, code)| {
                self.column(attribute)
                    .encode(code)
                    .ok_or(ClassifierError::UnknownCategory { attribute, code })
            })
            .collect()
    }

    /// Observed codes with their catalog labels, per column, in encoded order.
    ///
    /// Observed codes missing from the catalog stay encodable but are not
    /// offered as options.
    pub fn valid_options(&self) -> ValidOptions {
        let per_column = Attribute::ALL
            .iter()
            .map(|&attribute| {
                self.column(attribute)
                    .classes()
                    .iter()
                    .filter_map(|&code| match attribute.label_for(code) {
                        Some(label) => Some((code, label)),
                        None => {
                            warn!(%attribute, %code, "observed code is not in the attribute catalog");
                            None
                        }
                    })
                    .collect()
            })
            .collect();
        ValidOptions { per_column }
    }
}

/// Selectable `(code, label)` pairs per attribute, sorted by code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOptions {
    per_column: Vec<Vec<(char, &'static str)>>,
}

impl ValidOptions {
    pub fn for_attribute(&self, attribute: Attribute) -> &[(char, &'static str)] {
        &self.per_column[attribute.index()]
    }

    pub fn contains(&self, attribute: Attribute, code: char) -> bool {
        self.for_attribute(attribute).iter().any(|(c, _)| *c == code)
    }

    /// Total number of selectable options across all attributes
    pub fn total(&self) -> usize {
        debug_assert_eq!(self.per_column.len(), ATTRIBUTE_COUNT);
        self.per_column.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specimen::tests::MODAL_CODES;

    #[test]
    fn test_fit_sorts_codes() {
        let encoder = ColumnEncoder::fit("pfnfaxn".chars());
        assert_eq!(encoder.classes(), &['a', 'f', 'n', 'p', 'x']);
        assert_eq!(encoder.encode('a'), Some(0));
        assert_eq!(encoder.encode('x'), Some(4));
        assert_eq!(encoder.decode(2), Some('n'));
    }

    #[test]
    fn test_unseen_code_is_not_encoded() {
        let encoder = ColumnEncoder::fit("ab".chars());
        assert_eq!(encoder.encode('c'), None);
        assert_eq!(encoder.decode(2), None);
    }

    #[test]
    fn test_round_trip() {
        let encoder = ColumnEncoder::fit("?bcer".chars());
        for (i, &code) in encoder.classes().iter().enumerate() {
            assert_eq!(encoder.encode(code), Some(i as u32));
            assert_eq!(encoder.decode(i as u32), Some(code));
        }
    }

    #[test]
    fn test_target_encoder() {
        let encoder = TargetEncoder::fit([Edibility::Poisonous, Edibility::Edible]);
        assert_eq!(encoder.codes(), &['e', 'p']);
        assert_eq!(encoder.encode(Edibility::Poisonous), Some(1));
        assert_eq!(encoder.decode(0).unwrap(), Edibility::Edible);
        assert!(encoder.decode(2).is_err());
        assert_eq!(encoder.labels(), vec![Edibility::Edible, Edibility::Poisonous]);
    }

    #[test]
    fn test_specimen_encoder_rejects_unknown_code() {
        let base = SpecimenRecord::from_codes(MODAL_CODES);
        let other = base.with(Attribute::Odor, 'f');
        let records = [base, other];
        let encoder = SpecimenEncoder::fit(records.iter());

        assert_eq!(encoder.column(Attribute::Odor).classes(), &['f', 'n']);
        assert_eq!(encoder.encode(&other).unwrap()[Attribute::Odor.index()], 0);
        assert!(encoder.encode(&base).unwrap().iter().all(|&v| v <= 1));

        let unseen = base.with(Attribute::Odor, 'a');
        match encoder.encode(&unseen) {
            Err(ClassifierError::UnknownCategory { attribute, code }) => {
                assert_eq!(attribute, Attribute::Odor);
                assert_eq!(code, 'a');
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_options_follow_code_order() {
        let base = SpecimenRecord::from_codes(MODAL_CODES);
        let records = [
            base,
            base.with(Attribute::Odor, 'a'),
            base.with(Attribute::Odor, 'f'),
            base.with(Attribute::Odor, 'l'),
            base.with(Attribute::Odor, 'c'),
            base.with(Attribute::StalkRoot, '?'),
            // not in the catalog: encodable, never offered
            base.with(Attribute::Habitat, 'q'),
        ];
        let encoder = SpecimenEncoder::fit(records.iter());
        let options = encoder.valid_options();

        assert_eq!(
            options.for_attribute(Attribute::Odor),
            &[
                ('a', "Almond"),
                ('c', "Creosote"),
                ('f', "Foul"),
                ('l', "Anise"),
                ('n', "None")
            ]
        );
        assert_eq!(
            options.for_attribute(Attribute::StalkRoot),
            &[('?', "Unknown"), ('b', "Bulbous")]
        );
        assert!(encoder.column(Attribute::Habitat).contains('q'));
        assert!(!options.contains(Attribute::Habitat, 'q'));
        assert!(options.contains(Attribute::Habitat, 'd'));

        for attribute in Attribute::ALL {
            let column = encoder.column(attribute);
            for &(code, _) in options.for_attribute(attribute) {
                let index = column.encode(code).unwrap();
                assert_eq!(column.decode(index), Some(code));
            }
        }
    }
}
