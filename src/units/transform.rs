//! OS path transformation of unit names and content.
use super::UnitTemplate;
use super::validate::{is_share_uri, what_value};
use crate::error::ReconcileError;
use crate::platform::{OsVariant, PathRule};

/// A template's name and content after applying an OS [`PathRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// Installed file name.
    pub final_name: String,
    /// Installed file content.
    pub final_content: String,
}

/// The path rule of `variant`.
///
/// # Errors
///
/// Returns [`ReconcileError::UnsupportedPlatform`] when `variant` has no rule.
pub fn rule_for(variant: OsVariant) -> Result<&'static PathRule, ReconcileError> {
    variant
        .path_rule()
        .ok_or_else(|| ReconcileError::UnsupportedPlatform {
            platform: variant.to_string(),
        })
}

/// Apply the path rule of `variant` to `template`.
///
/// Content rules rewrite every line except a `What=` naming a network
/// share; the share path belongs to the remote host.
///
/// # Errors
///
/// Returns [`ReconcileError::UnsupportedPlatform`] when `variant` has no rule.
pub fn transform(
    template: &UnitTemplate,
    variant: OsVariant,
) -> Result<Transformed, ReconcileError> {
    let rule = rule_for(variant)?;

    let final_content = template
        .raw_content
        .split_inclusive('\n')
        .map(|line| {
            if what_value(line).is_some_and(is_share_uri) {
                line.to_string()
            } else {
                rule.content
                    .iter()
                    .fold(line.to_string(), |line, (from, to)| {
                        rewrite_prefix(&line, from, to)
                    })
            }
        })
        .collect();

    let final_name = rule.rename.map_or_else(
        || template.name.clone(),
        |rename| {
            let base = template
                .name
                .strip_prefix(rename.strip)
                .unwrap_or(&template.name);
            format!("{}{base}", rename.prepend)
        },
    );

    Ok(Transformed {
        final_name,
        final_content,
    })
}

/// Replace every occurrence of `from` with `to`.
///
/// When `to` ends with `from` (as `/var/mnt/` ends with `/mnt/`), an
/// occurrence that is already the tail of `to` is left alone so text that
/// uses the target root stays unchanged.
fn rewrite_prefix(content: &str, from: &str, to: &str) -> String {
    let lead = to.strip_suffix(from);
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for (idx, _) in content.match_indices(from) {
        let already = lead.is_some_and(|lead| {
            content
                .get(..idx)
                .is_some_and(|before| !lead.is_empty() && before.ends_with(lead))
        });
        if let Some(chunk) = content.get(last..idx) {
            out.push_str(chunk);
        }
        out.push_str(if already { from } else { to });
        last = idx + from.len();
    }
    if let Some(rest) = content.get(last..) {
        out.push_str(rest);
    }
    out
}
