use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::core::similarity::{GroupCost, PairCost};
use crate::models::{AttributeValue, Record};

/// Weighted attribute distance between two records
///
/// cost = Σ weight(attr) * distance(a[attr], b[attr])
///
/// Per-attribute distances are in [0, 1]:
/// - numbers: |a - b| / scale, capped at 1
/// - text: Jaccard distance of comma-separated tag sets (case-insensitive)
/// - booleans: 0 if equal, 1 otherwise
/// - missing, null or mismatched types: 1
#[derive(Debug, Clone, Default)]
pub struct AttributeCost {
    weights: Vec<(String, f64)>,
    scales: HashMap<String, f64>,
}

impl AttributeCost {
    pub fn new<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            weights: weights.into_iter().map(|(name, w)| (name.into(), w)).collect(),
            scales: HashMap::new(),
        }
    }

    /// Set the distance at which two numeric values count as fully different
    pub fn with_scale(mut self, attribute: impl Into<String>, scale: f64) -> Self {
        self.scales.insert(attribute.into(), scale);
        self
    }

    pub fn with_scales<I, S>(mut self, scales: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.scales
            .extend(scales.into_iter().map(|(name, scale)| (name.into(), scale)));
        self
    }

    fn scale_of(&self, attribute: &str) -> f64 {
        match self.scales.get(attribute) {
            Some(&scale) if scale > 0.0 => scale,
            _ => 1.0,
        }
    }
}

impl PairCost for AttributeCost {
    fn cost(&self, a: &Record, b: &Record) -> f64 {
        self.weights
            .iter()
            .map(|(attribute, weight)| {
                weight * attribute_distance(a.get(attribute), b.get(attribute), self.scale_of(attribute))
            })
            .sum()
    }
}

/// How member-to-target costs combine into one group cost
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Min,
    Max,
}

/// Group cost built from an [`AttributeCost`] between each member and the target
#[derive(Debug, Clone, Default)]
pub struct GroupAttributeCost {
    member_cost: AttributeCost,
    aggregation: Aggregation,
}

impl GroupAttributeCost {
    pub fn new(member_cost: AttributeCost, aggregation: Aggregation) -> Self {
        Self {
            member_cost,
            aggregation,
        }
    }
}

impl GroupCost for GroupAttributeCost {
    fn cost(&self, group: &[&Record], target: &Record) -> f64 {
        if group.is_empty() {
            return f64::INFINITY;
        }

        let costs = group.iter().map(|member| self.member_cost.cost(member, target));
        match self.aggregation {
            Aggregation::Mean => costs.sum::<f64>() / group.len() as f64,
            Aggregation::Min => costs.fold(f64::INFINITY, f64::min),
            Aggregation::Max => costs.fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Distance in [0, 1] between two attribute values
#[inline]
pub fn attribute_distance(a: Option<&AttributeValue>, b: Option<&AttributeValue>, scale: f64) -> f64 {
    match (a, b) {
        (Some(AttributeValue::Number(x)), Some(AttributeValue::Number(y))) => {
            ((x - y).abs() / scale).min(1.0)
        }
        (Some(AttributeValue::Bool(x)), Some(AttributeValue::Bool(y))) => {
            if x == y { 0.0 } else { 1.0 }
        }
        _ => match (a.and_then(AttributeValue::as_str), b.and_then(AttributeValue::as_str)) {
            (Some(x), Some(y)) => tag_distance(x, y),
            _ => 1.0,
        },
    }
}

/// Jaccard distance between comma-separated tag lists
///
/// A single value without commas degenerates to case-insensitive equality.
#[inline]
fn tag_distance(a: &str, b: &str) -> f64 {
    let left = tags(a);
    let right = tags(b);

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let shared = left.intersection(&right).count();

    1.0 - shared as f64 / union as f64
}

fn tags(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentor(id: &str, year: f64, interests: &str) -> Record {
        Record::new(id).with("year", year).with("interests", interests)
    }

    #[test]
    fn test_identical_records_cost_zero() {
        let cost = AttributeCost::new([("year", 1.0), ("interests", 2.0)]);
        let a = mentor("a", 3.0, "rust, web");

        assert_eq!(cost.cost(&a, &a.clone()), 0.0);
    }

    #[test]
    fn test_numeric_distance_scaled_and_capped() {
        let cost = AttributeCost::new([("year", 1.0)]).with_scale("year", 4.0);
        let a = mentor("a", 1.0, "");
        let b = mentor("b", 3.0, "");
        let c = mentor("c", 20.0, "");

        assert_eq!(cost.cost(&a, &b), 0.5);
        assert_eq!(cost.cost(&a, &c), 1.0);
    }

    #[test]
    fn test_tag_distance() {
        assert_eq!(tag_distance("Rust, Web", "web,rust"), 0.0);
        assert_eq!(tag_distance("rust, web", "rust, ml"), 1.0 - 1.0 / 3.0);
        assert_eq!(tag_distance("design", "Design"), 0.0);
        assert_eq!(tag_distance("design", "backend"), 1.0);
        assert_eq!(tag_distance("", " , "), 0.0);
    }

    #[test]
    fn test_missing_attribute_is_maximal() {
        let cost = AttributeCost::new([("year", 1.0), ("track", 3.0)]);
        let a = mentor("a", 1.0, "x");
        let b = mentor("b", 1.0, "x");

        assert_eq!(cost.cost(&a, &b), 3.0);
    }

    #[test]
    fn test_mismatched_types() {
        let number = AttributeValue::from(1.0);
        let text = AttributeValue::from("1");
        assert_eq!(attribute_distance(Some(&number), Some(&text), 1.0), 1.0);
        assert_eq!(attribute_distance(Some(&AttributeValue::Null), Some(&AttributeValue::Null), 1.0), 1.0);
    }

    #[test]
    fn test_text_values_compare_as_tags() {
        let left = AttributeValue::from("Rust, Web");
        let right = AttributeValue::from("rust");
        assert_eq!(left.as_str(), Some("Rust, Web"));
        assert_eq!(attribute_distance(Some(&left), Some(&right), 1.0), 0.5);
        assert_eq!(attribute_distance(Some(&left), Some(&AttributeValue::from(true)), 1.0), 1.0);
    }

    #[test]
    fn test_group_aggregations() {
        let members = [mentor("a", 1.0, ""), mentor("b", 5.0, "")];
        let group: Vec<&Record> = members.iter().collect();
        let target = mentor("t", 2.0, "");
        let base = AttributeCost::new([("year", 1.0)]).with_scale("year", 10.0);

        let mean = GroupAttributeCost::new(base.clone(), Aggregation::Mean);
        let min = GroupAttributeCost::new(base.clone(), Aggregation::Min);
        let max = GroupAttributeCost::new(base, Aggregation::Max);

        assert!((mean.cost(&group, &target) - 0.2).abs() < 1e-12);
        assert!((min.cost(&group, &target) - 0.1).abs() < 1e-12);
        assert!((max.cost(&group, &target) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_empty_group_is_infinite() {
        let cost = GroupAttributeCost::default();
        assert!(cost.cost(&[], &mentor("t", 0.0, "")).is_infinite());
    }
}
