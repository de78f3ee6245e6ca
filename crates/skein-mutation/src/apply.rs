//! Validate-before-commit application of mutations
//!
//! [`apply`] computes a candidate document, runs the schema validator
//! against it, and hands the candidate back only when the violation list
//! is empty. The input artefact is never modified, so a failed apply
//! leaves the caller exactly where it started.

use crate::error::MutationError;
use crate::op::Mutation;
use skein_artefact::{Artefact, TaskLine, append_task, map_task, remove_task};
use skein_schema::validate_artefact;

/// Apply one document edit, returning the validated candidate
///
/// Store-level operations (`create_artefact`, `delete_artefact`) are
/// resolved by the batch coordinator and rejected here.
///
/// # Errors
/// - [`MutationError::SchemaViolations`] when the candidate fails its
///   kind's rules; nothing is applied
/// - [`MutationError::TaskNotFound`] when a task edit matches no line
/// - [`MutationError::NotADocumentEdit`] for store-level operations
pub fn apply(artefact: &Artefact, mutation: &Mutation) -> Result<Artefact, MutationError> {
    let mut candidate = artefact.clone();
    edit(&mut candidate, mutation)?;

    let violations = validate_artefact(&candidate);
    if violations.is_empty() {
        tracing::debug!(artefact = %artefact.id(), op = mutation.name(), "mutation applied");
        Ok(candidate)
    } else {
        tracing::debug!(
            artefact = %artefact.id(),
            op = mutation.name(),
            count = violations.len(),
            "mutation rejected by schema"
        );
        Err(MutationError::SchemaViolations(violations))
    }
}

fn edit(candidate: &mut Artefact, mutation: &Mutation) -> Result<(), MutationError> {
    match mutation {
        Mutation::CreateArtefact { .. } | Mutation::DeleteArtefact => {
            Err(MutationError::NotADocumentEdit {
                op: mutation.name(),
            })
        }
        Mutation::UpdateFrontmatter { field, value } => {
            candidate.set_field(field.clone(), value.clone());
            Ok(())
        }
        Mutation::AppendToSection { section, text } => {
            candidate.sections_mut().append(section, text);
            Ok(())
        }
        Mutation::CreateTask {
            description,
            tags,
            annotations,
            section,
        } => {
            let target = section
                .clone()
                .unwrap_or_else(|| candidate.kind().task_section().to_string());
            let mut task = TaskLine::new(description.clone());
            task.tags.clone_from(tags);
            task.annotations.clone_from(annotations);

            let appended = candidate
                .sections()
                .get(&target)
                .map(|existing| append_task(existing.text(), &task));
            match appended {
                Some(text) => replace_section(candidate, &target, text),
                None => {
                    let mut line = task.render();
                    line.push('\n');
                    candidate.sections_mut().append(&target, &line);
                    Ok(())
                }
            }
        }
        Mutation::RemoveTask { description } => {
            let mut matched = false;
            for name in section_names(candidate) {
                let text = section_text(candidate, &name);
                if let Some(stripped) = remove_task(&text, description) {
                    matched = true;
                    replace_section(candidate, &name, stripped)?;
                }
            }
            if matched {
                Ok(())
            } else {
                Err(MutationError::TaskNotFound {
                    description: description.clone(),
                })
            }
        }
        Mutation::UpdateTaskStatus { description, done } => {
            rewrite_task(candidate, description, |mut task| {
                task.checked = *done;
                task
            })
        }
        Mutation::AddTag { description, tag } => rewrite_task(candidate, description, |mut task| {
            task.add_tag(tag.clone());
            task
        }),
        Mutation::RemoveTag { description, tag } => {
            rewrite_task(candidate, description, |mut task| {
                task.remove_tag(tag);
                task
            })
        }
        Mutation::UpdateTaskContent {
            description,
            new_description,
        } => rewrite_task(candidate, description, |mut task| {
            task.description.clone_from(new_description);
            task
        }),
    }
}

fn section_names(artefact: &Artefact) -> Vec<String> {
    artefact
        .sections()
        .iter()
        .filter_map(|s| s.heading().map(str::to_string))
        .collect()
}

fn section_text(artefact: &Artefact, name: &str) -> String {
    artefact
        .sections()
        .get(name)
        .map(|s| s.text().to_string())
        .unwrap_or_default()
}

fn replace_section(
    artefact: &mut Artefact,
    name: &str,
    text: String,
) -> Result<(), MutationError> {
    artefact
        .sections_mut()
        .replace(name, text)
        .map_err(|_| MutationError::SectionNotFound {
            name: name.to_string(),
        })
}

/// Rewrite the first task line matching `description`, searching the
/// sections in document order
fn rewrite_task<F>(
    artefact: &mut Artefact,
    description: &str,
    mut f: F,
) -> Result<(), MutationError>
where
    F: FnMut(TaskLine) -> TaskLine,
{
    for name in section_names(artefact) {
        let text = section_text(artefact, &name);
        if let Some(rewritten) = map_task(&text, description, &mut f) {
            return replace_section(artefact, &name, rewritten);
        }
    }
    Err(MutationError::TaskNotFound {
        description: description.to_string(),
    })
}
