mod tables;

use serde::{Deserialize, Serialize};

use super::domain::LeadClassification;
use tables::{
    budget_points, project_type_points, property_type_points, timeline_points, urgency_points,
    DEFAULT_LOCAL_AREAS, LOCAL_BONUS,
};

pub const MAX_LEAD_SCORE: u16 = 500;

const HOT_THRESHOLD: u16 = 350;
const WARM_THRESHOLD: u16 = 200;

/// Classification field a score contribution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadFactor {
    ProjectType,
    Timeline,
    Budget,
    PropertyType,
    Urgency,
    Locality,
}

impl LeadFactor {
    pub fn label(&self) -> &'static str {
        match self {
            LeadFactor::ProjectType => "Project type",
            LeadFactor::Timeline => "Timeline",
            LeadFactor::Budget => "Budget",
            LeadFactor::PropertyType => "Property type",
            LeadFactor::Urgency => "Urgency",
            LeadFactor::Locality => "Locality",
        }
    }
}

/// Triage tier derived from the capped score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadPriority {
    Hot,
    Warm,
    Cold,
}

impl LeadPriority {
    fn from_score(score: u16) -> Self {
        if score >= HOT_THRESHOLD {
            LeadPriority::Hot
        } else if score >= WARM_THRESHOLD {
            LeadPriority::Warm
        } else {
            LeadPriority::Cold
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeadPriority::Hot => "Hot",
            LeadPriority::Warm => "Warm",
            LeadPriority::Cold => "Cold",
        }
    }
}

/// Discrete contribution to a lead score, kept for audit logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: LeadFactor,
    pub points: u16,
    pub note: String,
}

/// Prioritization score in `0..=MAX_LEAD_SCORE` plus its breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadScore {
    pub total: u16,
    pub raw_total: u16,
    pub priority: LeadPriority,
    pub components: Vec<ScoreComponent>,
}

impl LeadScore {
    pub fn points_for(&self, factor: LeadFactor) -> u16 {
        self.components
            .iter()
            .filter(|component| component.factor == factor)
            .map(|component| component.points)
            .sum()
    }
}

/// Stateless additive scorer. Used for triage ordering only.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    local_areas: Vec<String>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::with_local_areas(DEFAULT_LOCAL_AREAS.iter().copied())
    }
}

impl ScoringEngine {
    /// Replaces the place names that earn the locality bonus.
    pub fn with_local_areas<I, S>(areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let local_areas = areas
            .into_iter()
            .map(|area| area.into().trim().to_lowercase())
            .filter(|area| !area.is_empty())
            .collect();
        Self { local_areas }
    }

    pub fn score(&self, lead: &LeadClassification) -> LeadScore {
        let mut components = Vec::new();

        let tables: [(LeadFactor, Option<&str>, fn(&str) -> u16); 5] = [
            (
                LeadFactor::ProjectType,
                lead.project_type(),
                project_type_points,
            ),
            (LeadFactor::Timeline, lead.timeline(), timeline_points),
            (LeadFactor::Budget, lead.budget(), budget_points),
            (
                LeadFactor::PropertyType,
                lead.property_type(),
                property_type_points,
            ),
            (LeadFactor::Urgency, lead.urgency(), urgency_points),
        ];

        for (factor, value, lookup) in tables {
            let Some(value) = value else {
                continue;
            };
            let points = lookup(value);
            let note = if points > 0 {
                format!("{} '{value}'", factor.label())
            } else {
                format!("{} '{value}' not recognized", factor.label())
            };
            components.push(ScoreComponent {
                factor,
                points,
                note,
            });
        }

        if let Some(area) = lead.address().and_then(|address| self.matching_area(address)) {
            components.push(ScoreComponent {
                factor: LeadFactor::Locality,
                points: LOCAL_BONUS,
                note: format!("address within service area ({area})"),
            });
        }

        let raw_total: u16 = components.iter().map(|component| component.points).sum();
        let total = raw_total.min(MAX_LEAD_SCORE);

        LeadScore {
            total,
            raw_total,
            priority: LeadPriority::from_score(total),
            components,
        }
    }

    fn matching_area(&self, address: &str) -> Option<&str> {
        let address = address.to_lowercase();
        self.local_areas
            .iter()
            .find(|area| address.contains(area.as_str()))
            .map(String::as_str)
    }
}
