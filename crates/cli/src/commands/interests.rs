use hilight_core::taxonomy;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let interests = taxonomy::interests();
    CommandResult::success_with_data(
        "interests",
        format!("{} interests", interests.len()),
        interests,
    )
}
