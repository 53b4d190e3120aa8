//! Problem capability model
//! A problem kind is the set of expressiveness features a problem uses; a
//! backend declares which sets it accepts via a static capability table.

use std::collections::BTreeSet;

/// Expressiveness features a planning problem may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Feature {
    // Temporal reasoning
    ContinuousTime,
    DiscreteTime,
    IntermediateConditionsAndEffects,
    TimedGoals,
    TimedEffects,
    DurationInequalities,

    // Hierarchical structure
    HierarchicalStructure,
    MethodPreconditions,

    // Typing discipline
    FlatTyping,
    HierarchicalTyping,

    // Condition kinds
    NegativeConditions,
    Equalities,
    DisjunctiveConditions,
    ExistentialConditions,
    UniversalConditions,

    // Fluent kinds
    ObjectFluents,
    NumericFluents,
}

/// The feature set of a problem (or the feature set a backend accepts).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemKind {
    features: BTreeSet<Feature>,
}

impl ProblemKind {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn is_subset_of(&self, other: &ProblemKind) -> bool {
        self.features.is_subset(&other.features)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }
}

/// Everything the Aries backend declares support for: temporal and
/// hierarchical problems over typed object fluents. Numeric fluents and
/// quantified or disjunctive conditions are not declared.
pub fn supported_kind() -> ProblemKind {
    ProblemKind::new()
        .with(Feature::ContinuousTime)
        .with(Feature::DiscreteTime)
        .with(Feature::IntermediateConditionsAndEffects)
        .with(Feature::TimedGoals)
        .with(Feature::TimedEffects)
        .with(Feature::DurationInequalities)
        .with(Feature::HierarchicalStructure)
        .with(Feature::MethodPreconditions)
        .with(Feature::FlatTyping)
        .with(Feature::HierarchicalTyping)
        .with(Feature::NegativeConditions)
        .with(Feature::Equalities)
        .with(Feature::ObjectFluents)
}
