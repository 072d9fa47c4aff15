//! Reference dataset loading and encoding
//!
//! The dataset is a comma-separated file without a header: the target code
//! (`e`/`p`) first, then one single-character code per attribute in catalog
//! column order. Blank lines and `#` comments are skipped.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use toxtrack_core::{Attribute, Edibility, ATTRIBUTE_COUNT};

use crate::encoder::{SpecimenEncoder, TargetEncoder};
use crate::errors::{ClassifierError, Result};
use crate::specimen::SpecimenRecord;

/// Target column plus one column per attribute
pub const COLUMN_COUNT: usize = ATTRIBUTE_COUNT + 1;

/// Labeled specimens as read from disk
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub records: Vec<SpecimenRecord>,
    pub targets: Vec<Edibility>,
}

/// Dataset after column encoding, ready for training
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedDataset {
    pub features: Vec<Vec<u32>>,
    pub targets: Vec<u32>,
    pub feature_count: usize,
    pub class_count: usize,
}

impl Dataset {
    /// Load the dataset file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            ClassifierError::DataLoad(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Parse dataset text
    pub fn parse(content: &str) -> Result<Self> {
        let mut records = Vec::new();
        let mut targets = Vec::new();

        for (line_idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = line_idx + 1;

            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            if cells.len() != COLUMN_COUNT {
                return Err(ClassifierError::DataLoad(format!(
                    "line {line_no}: expected {COLUMN_COUNT} columns, got {}",
                    cells.len()
                )));
            }

            let target = cell_code(cells[0], line_no, 1)?;
            let target = Edibility::from_code(target).map_err(|_| {
                ClassifierError::DataLoad(format!("line {line_no}: invalid target code '{target}'"))
            })?;

            let mut codes = [' '; ATTRIBUTE_COUNT];
            for (i, cell) in cells[1..].iter().enumerate() {
                codes[i] = cell_code(cell, line_no, i + 2)?;
            }

            records.push(SpecimenRecord::from_codes(codes));
            targets.push(target);
        }

        if records.is_empty() {
            return Err(ClassifierError::DataLoad("dataset is empty".to_string()));
        }

        Ok(Self { records, targets })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Samples per label
    pub fn class_counts(&self) -> BTreeMap<Edibility, usize> {
        let mut counts = BTreeMap::new();
        for &target in &self.targets {
            *counts.entry(target).or_insert(0) += 1;
        }
        counts
    }

    /// Most frequent code per column; ties resolve to the smallest code
    pub fn modal_record(&self) -> SpecimenRecord {
        let mut codes = [' '; ATTRIBUTE_COUNT];
        for attribute in Attribute::ALL {
            let mut counts: HashMap<char, usize> = HashMap::new();
            for record in &self.records {
                *counts.entry(record.get(attribute)).or_insert(0) += 1;
            }
            if let Some((&code, _)) = counts
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            {
                codes[attribute.index()] = code;
            }
        }
        SpecimenRecord::from_codes(codes)
    }

    /// Fit the column and target encoders on this dataset
    pub fn fit_encoders(&self) -> (SpecimenEncoder, TargetEncoder) {
        let encoder = SpecimenEncoder::fit(self.records.iter());
        let target_encoder = TargetEncoder::fit(self.targets.iter().copied());
        (encoder, target_encoder)
    }

    /// Encode every row with encoders fit on this dataset
    pub fn encode(
        &self,
        encoder: &SpecimenEncoder,
        target_encoder: &TargetEncoder,
    ) -> Result<EncodedDataset> {
        let features = self
            .records
            .iter()
            .map(|record| encoder.encode(record))
            .collect::<Result<Vec<_>>>()?;

        let targets = self
            .targets
            .iter()
            .map(|&label| {
                target_encoder.encode(label).ok_or_else(|| {
                    ClassifierError::DataLoad(format!("label {label} missing from target encoder"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EncodedDataset {
            features,
            targets,
            feature_count: ATTRIBUTE_COUNT,
            class_count: target_encoder.len(),
        })
    }
}

impl EncodedDataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

fn cell_code(cell: &str, line_no: usize, column: usize) -> Result<char> {
    let mut chars = cell.chars();
    match (chars.next(), chars.next()) {
        (Some(code), None) => Ok(code),
        _ => Err(ClassifierError::DataLoad(format!(
            "line {line_no}, column {column}: expected a single-character code, got '{cell}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ROWS: &str = "\
# target first, then 22 attributes
p,x,s,n,t,p,f,c,n,k,e,e,s,s,w,w,p,w,o,p,k,s,u
e,x,s,y,t,a,f,c,b,k,e,c,s,s,w,w,p,w,o,p,n,n,g

e,b,s,w,t,l,f,c,b,n,e,c,s,s,w,w,p,w,o,p,n,n,m
p,x,y,w,t,p,f,c,n,n,e,e,s,s,w,w,p,w,o,p,k,s,u
";

    fn write_rows(rows: &str) -> std::io::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(rows.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> anyhow::Result<()> {
        let file = write_rows(ROWS)?;
        let dataset = Dataset::from_csv(file.path())?;

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.targets[0], Edibility::Poisonous);
        assert_eq!(dataset.records[1].get(Attribute::Odor), 'a');
        assert_eq!(dataset.records[3].get(Attribute::Habitat), 'u');
        assert_eq!(dataset.class_counts()[&Edibility::Edible], 2);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::from_csv("/nonexistent/agaricus.csv").unwrap_err();
        assert!(matches!(err, ClassifierError::DataLoad(_)));
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let err = Dataset::parse("p,x,s,n,t,p,f,c,n,k,e,e,s,s,w,w,p,w,o,p,k,s\n").unwrap_err();
        assert!(matches!(err, ClassifierError::DataLoad(ref m) if m.contains("expected 23 columns")));
    }

    #[test]
    fn test_malformed_cells_are_rejected() {
        assert!(Dataset::parse("p,xx,s,n,t,p,f,c,n,k,e,e,s,s,w,w,p,w,o,p,k,s,u\n").is_err());
        assert!(Dataset::parse("p,,s,n,t,p,f,c,n,k,e,e,s,s,w,w,p,w,o,p,k,s,u\n").is_err());
        assert!(Dataset::parse("z,x,s,n,t,p,f,c,n,k,e,e,s,s,w,w,p,w,o,p,k,s,u\n").is_err());
        assert!(Dataset::parse("# only a comment\n\n").is_err());
    }

    #[test]
    fn test_modal_record() -> anyhow::Result<()> {
        let dataset = Dataset::parse(ROWS)?;
        let modal = dataset.modal_record();

        assert_eq!(modal.get(Attribute::CapShape), 'x');
        assert_eq!(modal.get(Attribute::Odor), 'p');
        // k and n both appear twice: smallest code wins
        assert_eq!(modal.get(Attribute::GillColor), 'k');
        assert_eq!(modal.get(Attribute::CapColor), 'w');
        Ok(())
    }

    #[test]
    fn test_encode() -> anyhow::Result<()> {
        let dataset = Dataset::parse(ROWS)?;
        let (encoder, target_encoder) = dataset.fit_encoders();
        let encoded = dataset.encode(&encoder, &target_encoder)?;

        assert_eq!(encoded.len(), 4);
        assert_eq!(encoded.feature_count, ATTRIBUTE_COUNT);
        assert_eq!(encoded.class_count, 2);
        assert_eq!(encoded.targets, vec![1, 0, 0, 1]);
        // odor codes p, a, l, p -> sorted a, l, p
        let odor: Vec<u32> = encoded.features.iter().map(|f| f[Attribute::Odor.index()]).collect();
        assert_eq!(odor, vec![2, 0, 1, 2]);
        Ok(())
    }
}
