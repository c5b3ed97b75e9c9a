use std::sync::Arc;

use hilight_core::errors::DomainError;
use hilight_core::recommend::MIN_RECOMMENDATION_SCORE;
use hilight_core::{RecommendationEngine, SelectedTags, TagCategory};
use serde_json::json;

use crate::commands::{load_catalog, load_config, CommandResult};

pub fn run(tags: &[String], explain: bool) -> CommandResult {
    let selected = match parse_selection(tags) {
        Ok(selected) => selected,
        Err(error) => {
            return CommandResult::failure("recommend", "invalid_input", error.to_string(), 3);
        }
    };
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let engine = RecommendationEngine::new(Arc::new(load_catalog(&config)));
    let recommendation = engine.recommend(&selected);
    let message = match &recommendation {
        Some(found) => format!("recommended {} (score {:.2})", found.product, found.total),
        None => format!("no product reached the {MIN_RECOMMENDATION_SCORE} threshold"),
    };

    let data = if explain {
        json!({ "recommendation": recommendation, "ranking": engine.rank(&selected) })
    } else {
        json!({ "recommendation": recommendation })
    };
    CommandResult::success_with_data("recommend", message, data)
}

/// Parses `category:tag` arguments into a selection.
pub fn parse_selection(tags: &[String]) -> Result<SelectedTags, DomainError> {
    let mut selected = SelectedTags::new();
    for raw in tags {
        let Some((category, tag)) = raw.split_once(':') else {
            return Err(DomainError::InvalidSelection(format!(
                "`{raw}` is not in category:tag form"
            )));
        };
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(DomainError::InvalidSelection(format!("`{raw}` has an empty tag")));
        }
        selected.push(category.parse::<TagCategory>()?, tag);
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use hilight_core::errors::DomainError;
    use hilight_core::TagCategory;

    use super::parse_selection;

    #[test]
    fn selection_accepts_labels_and_aliases() {
        let selected = parse_selection(&["risk:#화재".to_string(), "누구:#가족".to_string()])
            .expect("valid selection");

        assert_eq!(selected.tags(TagCategory::Risk), ["#화재".to_string()]);
        assert_eq!(selected.tags(TagCategory::Who), ["#가족".to_string()]);
    }

    #[test]
    fn selection_rejects_malformed_arguments() {
        assert!(matches!(
            parse_selection(&["#화재".to_string()]),
            Err(DomainError::InvalidSelection(_))
        ));
        assert!(matches!(
            parse_selection(&["risk: ".to_string()]),
            Err(DomainError::InvalidSelection(_))
        ));
        assert!(matches!(
            parse_selection(&["budget:#저렴".to_string()]),
            Err(DomainError::UnknownCategory(_))
        ));
    }
}
