//! l-diversity scoring

use crate::domain::PersonalRecord;
use std::collections::HashSet;

/// Which sensitive attribute a group is scored on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SensitiveAttribute {
    /// The record's primary `condition` field
    #[default]
    Condition,
    /// A named entry of `sensitive_attributes`; records without it share one
    /// "absent" value
    Named(String),
}

impl SensitiveAttribute {
    /// Build from an optional configured attribute name
    pub fn from_config(name: Option<&str>) -> Self {
        match name {
            None | Some("condition") => Self::Condition,
            Some(other) => Self::Named(other.to_string()),
        }
    }

    fn value_of<'a>(&self, record: &'a PersonalRecord) -> Option<&'a str> {
        match self {
            Self::Condition => Some(record.condition.as_str()),
            Self::Named(name) => record.sensitive_attributes.get(name).map(String::as_str),
        }
    }
}

/// Scores groups by the number of distinct sensitive values they contain
#[derive(Debug, Clone, Default)]
pub struct DiversityScorer {
    attribute: SensitiveAttribute,
}

impl DiversityScorer {
    /// Create a scorer for the given attribute
    pub fn new(attribute: SensitiveAttribute) -> Self {
        Self { attribute }
    }

    /// The attribute being scored
    pub fn attribute(&self) -> &SensitiveAttribute {
        &self.attribute
    }

    /// Distinct sensitive values in the group, never less than 1
    pub fn score<'a, I>(&self, group: I) -> usize
    where
        I: IntoIterator<Item = &'a PersonalRecord>,
    {
        let distinct: HashSet<Option<&str>> =
            group.into_iter().map(|r| self.attribute.value_of(r)).collect();
        distinct.len().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PersonalRecordBuilder;

    fn record(id: &str, condition: &str, blood: Option<&str>) -> PersonalRecord {
        let mut builder = PersonalRecordBuilder::new()
            .id(id)
            .unwrap()
            .age(40)
            .zip_code("10001")
            .gender("F")
            .condition(condition);
        if let Some(b) = blood {
            builder = builder.attribute("blood_type", b);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_condition_diversity() {
        let group = vec![
            record("1", "flu", None),
            record("2", "flu", None),
            record("3", "asthma", None),
        ];
        assert_eq!(DiversityScorer::default().score(&group), 2);
    }

    #[test]
    fn test_empty_group_scores_one() {
        let group: Vec<PersonalRecord> = Vec::new();
        assert_eq!(DiversityScorer::default().score(&group), 1);
    }

    #[test]
    fn test_named_attribute_counts_absent_once() {
        let scorer = DiversityScorer::new(SensitiveAttribute::Named("blood_type".to_string()));
        let group = vec![
            record("1", "flu", Some("A")),
            record("2", "flu", Some("B")),
            record("3", "flu", None),
            record("4", "flu", None),
        ];
        assert_eq!(scorer.score(&group), 3);
    }

    #[test]
    fn test_score_never_exceeds_group_size() {
        let group = vec![record("1", "a", None), record("2", "b", None)];
        let score = DiversityScorer::default().score(&group);
        assert!(score >= 1 && score <= group.len());
    }

    #[test]
    fn test_from_config() {
        assert_eq!(SensitiveAttribute::from_config(None), SensitiveAttribute::Condition);
        assert_eq!(
            SensitiveAttribute::from_config(Some("condition")),
            SensitiveAttribute::Condition
        );
        assert_eq!(
            SensitiveAttribute::from_config(Some("income_band")),
            SensitiveAttribute::Named("income_band".to_string())
        );
    }
}
