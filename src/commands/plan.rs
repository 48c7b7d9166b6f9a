//! Command: show what `apply` would install, without side effects.
use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::cli::{GlobalOpts, PlanOpts};
use crate::error::{ConfigError, ReconcileError};
use crate::logging::Logger;
use crate::platform::Platform;
use crate::tasks::Context;
use crate::units::discover::discover;
use crate::units::plan::{InstallPlan, PlannedUnit, build_plan};

/// Discover, validate and transform the templates for the context's platform.
///
/// Exclusions are logged: unreachable devices as info, broken templates as
/// warnings.
///
/// # Errors
///
/// Returns an error if the template directory is missing or unreadable, or
/// the platform is unsupported.
pub fn plan_units(ctx: &Context) -> Result<InstallPlan> {
    let source = &ctx.config.source_dir;
    if !ctx.fs_ops.exists(source) {
        return Err(ConfigError::MissingSourceDir(source.clone()).into());
    }

    ctx.log.stage("Planning units");
    let templates = discover(ctx.fs_ops.as_ref(), source, ctx.log.as_ref())?;
    let plan = build_plan(templates, ctx.fs_ops.as_ref(), ctx.platform.variant)?;

    for exclusion in &plan.excluded {
        match exclusion.reason {
            ReconcileError::DeviceUnreachable { .. } => {
                ctx.log.info(&format!("skipping {}", exclusion.reason));
            }
            _ => ctx.log.warn(&format!("skipping {}", exclusion.reason)),
        }
    }
    ctx.log.info(&format!(
        "{} unit(s) planned, {} excluded",
        plan.units.len(),
        plan.excluded.len()
    ));
    Ok(plan)
}

/// A template left out of the plan, as reported by `plan --json`.
#[derive(Debug, Serialize)]
struct ExcludedEntry<'a> {
    unit: &'a str,
    reason: String,
}

/// Machine-readable plan.
#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    platform: &'a str,
    variant: String,
    requires_credentials: bool,
    units: &'a [PlannedUnit],
    excluded: Vec<ExcludedEntry<'a>>,
}

/// Render `plan` as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(plan: &InstallPlan, platform: &Platform) -> Result<String> {
    let report = PlanReport {
        platform: &platform.name,
        variant: platform.variant.to_string(),
        requires_credentials: plan.requires_credentials(),
        units: &plan.units,
        excluded: plan
            .excluded
            .iter()
            .map(|e| ExcludedEntry {
                unit: &e.unit,
                reason: e.reason.to_string(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Render `plan` as a human-readable report.
#[must_use]
pub fn render_text(plan: &InstallPlan, platform: &Platform) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "platform: {} ({})", platform.name, platform.variant);

    if plan.units.is_empty() {
        let _ = writeln!(out, "planned: none");
    } else {
        let _ = writeln!(out, "planned:");
        for unit in &plan.units {
            let credentials = if unit.requires_credentials {
                " [credentials]"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "  {} -> {} ({}){credentials}",
                unit.template, unit.final_name, unit.target.path
            );
        }
    }

    if !plan.excluded.is_empty() {
        let _ = writeln!(out, "excluded:");
        for exclusion in &plan.excluded {
            let _ = writeln!(out, "  {}: {}", exclusion.unit, exclusion.reason);
        }
    }
    out
}

/// Run the plan command.
///
/// # Errors
///
/// Returns an error if configuration loading or planning fails.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &PlanOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let ctx = setup.context(true, log);
    let plan = plan_units(&ctx)?;

    if opts.json {
        println!("{}", render_json(&plan, &setup.platform)?);
    } else {
        print!("{}", render_text(&plan, &setup.platform));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;
    use crate::platform::OsVariant;
    use crate::service::MockServiceManager;
    use crate::tasks::test_helpers::{make_context, silent_prompt};

    fn source_fs() -> MockFileSystemOps {
        MockFileSystemOps::new()
            .with_file(
                "/src/mnt-home.mount",
                "[Mount]\nWhat=//nas/home\nWhere=/mnt/home\nType=cifs\n",
            )
            .with_file("/src/mnt-home.automount", "[Automount]\nWhere=/mnt/home\n")
            .with_file("/src/mnt-games.mount", "[Mount]\nWhat=/dev/disk/by-label/games\n")
            .with_file("/src/mnt-broken.swap", "[Swap]\nPriority=10\n")
            .with_file("/src/notes.txt", "ignore me")
    }

    fn planned() -> InstallPlan {
        let (ctx, _log) = make_context(
            Arc::new(source_fs()),
            MockServiceManager::new(),
            silent_prompt(),
            true,
        );
        plan_units(&ctx).unwrap()
    }

    #[test]
    fn plan_units_reads_templates_from_the_source_dir() {
        let plan = planned();
        assert_eq!(
            plan.unit_names(),
            vec!["mnt-home.automount", "mnt-home.mount"]
        );
        assert_eq!(plan.excluded.len(), 2);
        assert!(plan.requires_credentials());
    }

    #[test]
    fn missing_source_dir_is_a_config_error() {
        let (ctx, _log) = make_context(
            Arc::new(MockFileSystemOps::new()),
            MockServiceManager::new(),
            silent_prompt(),
            true,
        );
        let err = plan_units(&ctx).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn text_report() {
        let platform = Platform::new(OsVariant::StandardRoot, "Arch Linux");
        insta::assert_snapshot!(render_text(&planned(), &platform), @r"
        platform: Arch Linux (standard)
        planned:
          mnt-home.automount -> mnt-home.automount (//nas/home) [credentials]
          mnt-home.mount -> mnt-home.mount (//nas/home)
        excluded:
          mnt-broken.swap: malformed unit 'mnt-broken.swap': no What= line
          mnt-games.mount: device for 'mnt-games.mount' is not reachable: /dev/disk/by-label/games
        ");
    }

    #[test]
    fn text_report_with_nothing_planned() {
        let platform = Platform::new(OsVariant::ImmutableRoot, "Bazzite");
        let text = render_text(&InstallPlan::default(), &platform);
        assert_eq!(text, "platform: Bazzite (immutable)\nplanned: none\n");
    }

    #[test]
    fn json_report() {
        let platform = Platform::new(OsVariant::StandardRoot, "Arch Linux");
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&planned(), &platform).unwrap()).unwrap();
        assert_eq!(json["variant"], "standard");
        assert_eq!(json["requires_credentials"], true);
        assert_eq!(json["units"][0]["final_name"], "mnt-home.automount");
        assert_eq!(json["units"][0]["kind"], "automount");
        assert_eq!(json["units"][0]["target"]["path"], "//nas/home");
        assert!(json["units"][0].get("final_content").is_none());
        assert_eq!(json["excluded"][0]["unit"], "mnt-broken.swap");
    }
}
