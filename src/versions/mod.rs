// Version ledger - append-only history of prior content versions
//
// Whenever a generation's content is edited, the pre-edit content is
// snapshotted under the current version number before the live content is
// replaced. Version numbers are never reused; the live content is always one
// past the last ledger entry.

use crate::models::{ContentVersion, GenerationRecord};
use chrono::Utc;

/// Record an edit on a generation's content.
///
/// A `new_content` identical to the live content is a no-op: repeated
/// identical edits never grow the ledger or bump the version.
pub fn record_edit(
    mut generation: GenerationRecord,
    new_content: &str,
    editor: &str,
    notes: Option<String>,
) -> GenerationRecord {
    let current_content = generation.result.clone().unwrap_or_default();
    if current_content == new_content {
        return generation;
    }

    let current_version = generation.current_version;
    let duplicate = generation
        .versions
        .iter()
        .any(|v| v.version_number == current_version);

    if duplicate {
        log::warn!(
            "Generation {} already has a ledger entry for version {}; skipping snapshot",
            generation.id,
            current_version
        );
    } else {
        generation.versions.push(ContentVersion {
            version_number: current_version,
            content: current_content,
            updated_at: Utc::now(),
            updated_by: editor.to_string(),
            notes,
        });
        generation.current_version += 1;
    }

    generation.result = Some(new_content.to_string());
    generation.updated_at = Utc::now();
    generation
}
