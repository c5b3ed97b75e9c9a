use hilight_core::taxonomy::{self, Interest};
use hilight_core::TagCategory;

use crate::commands::CommandResult;

/// Quick-pick preview for an interest, or every tag of a category.
pub fn run(interest: Option<&str>, category: Option<&str>) -> CommandResult {
    match (interest, category) {
        (Some(interest), _) => match interest.parse::<Interest>() {
            Ok(interest) => CommandResult::success_with_data(
                "tags",
                format!("tag preview for {interest}"),
                taxonomy::recommended_tags(interest),
            ),
            Err(error) => CommandResult::failure("tags", "invalid_input", error.to_string(), 3),
        },
        (None, Some(category)) => match category.parse::<TagCategory>() {
            Ok(category) => {
                let tags = taxonomy::all_tags_by_category(category);
                CommandResult::success_with_data(
                    "tags",
                    format!("{} tags in {category}", tags.len()),
                    tags,
                )
            }
            Err(error) => CommandResult::failure("tags", "invalid_input", error.to_string(), 3),
        },
        (None, None) => CommandResult::failure(
            "tags",
            "invalid_input",
            "pass --interest <name> or --category <category>",
            3,
        ),
    }
}
