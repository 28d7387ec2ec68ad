use clap::Args;
use contact_intake::error::AppError;
use contact_intake::intake::{LeadClassification, LeadScore, ScoringEngine};

#[derive(Args, Debug, Default)]
pub(crate) struct LeadScoreArgs {
    /// Project category, e.g. drainage or retaining-wall
    #[arg(long)]
    pub(crate) project_type: Option<String>,
    /// Timeline, e.g. immediate or 1-3-months
    #[arg(long)]
    pub(crate) timeline: Option<String>,
    /// Budget band, e.g. 15k-50k
    #[arg(long)]
    pub(crate) budget: Option<String>,
    /// Property type, e.g. commercial
    #[arg(long)]
    pub(crate) property_type: Option<String>,
    /// Urgency, e.g. urgent
    #[arg(long)]
    pub(crate) urgency: Option<String>,
    /// Project address, checked against the local service area
    #[arg(long)]
    pub(crate) address: Option<String>,
    /// Print the score as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_lead_score(args: LeadScoreArgs) -> Result<(), AppError> {
    let json = args.json;
    let lead = classification_from(args);
    let score = ScoringEngine::default().score(&lead);

    if json {
        let rendered = serde_json::to_string_pretty(&score)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        render_lead_score(&score);
    }
    Ok(())
}

fn classification_from(args: LeadScoreArgs) -> LeadClassification {
    LeadClassification {
        project_type: args.project_type,
        timeline: args.timeline,
        budget: args.budget,
        property_type: args.property_type,
        urgency: args.urgency,
        address: args.address,
    }
}

fn render_lead_score(score: &LeadScore) {
    println!("Lead score: {} / 500 ({})", score.total, score.priority.label());
    if score.raw_total > score.total {
        println!("Uncapped total: {}", score.raw_total);
    }

    if score.components.is_empty() {
        println!("\nNo classification fields supplied");
        return;
    }

    println!("\nBreakdown");
    for component in &score.components {
        println!(
            "- {:<14} {:>3}  {}",
            component.factor.label(),
            component.points,
            component.note
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_classification() {
        let args = LeadScoreArgs {
            project_type: Some("flooding".to_string()),
            urgency: Some("low".to_string()),
            ..LeadScoreArgs::default()
        };

        let lead = classification_from(args);
        let score = ScoringEngine::default().score(&lead);

        assert_eq!(lead.project_type(), Some("flooding"));
        assert!(lead.timeline().is_none());
        assert_eq!(score.total, 130);
    }

    #[test]
    fn json_output_succeeds() {
        let args = LeadScoreArgs {
            budget: Some("over-100k".to_string()),
            json: true,
            ..LeadScoreArgs::default()
        };
        run_lead_score(args).expect("score prints");
    }
}
