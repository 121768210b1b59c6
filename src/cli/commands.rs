//! Command implementations

use super::{BumpArgs, CheckMarkdownArgs};
use crate::fixer::{markdown_targets, MarkdownFixer, RunDisposition};
use crate::repo::{Project, ProjectConfig};
use crate::service::ClaudeCli;
use crate::version::{BumpKind, CommandRunner, ReleasePipeline, VersionFile};
use anyhow::Result;
use std::path::Path;

const HOOK_NAME: &str = "pre-commit";

const HOOK_MARKER: &str = "# DocPolish pre-commit hook";

/// Check markdown files with the correction service
pub async fn check_markdown(path: &Path, args: &CheckMarkdownArgs) -> Result<RunDisposition> {
    // Decided before loading config so a broken config cannot block unrelated commits
    let Some(targets) = markdown_targets(args.files.as_slice()) else {
        return Ok(RunDisposition::NothingToDo);
    };

    let project = Project::open(path)?;
    let config = &project.config().fixer;

    let program = args.program.as_deref().unwrap_or(&config.program);
    let model = args.model.as_deref().unwrap_or(&config.model);
    let max_turns = args.max_turns.unwrap_or(config.max_turns);

    let service = ClaudeCli::new(program);
    let fixer = MarkdownFixer::new(&service, project.root())
        .with_model(model)
        .with_max_turns(max_turns);

    Ok(fixer.run_targets(&targets).await)
}

/// Bump the version and run the release pipeline
pub fn bump(path: &Path, args: &BumpArgs, runner: &dyn CommandRunner) -> Result<()> {
    let kind: BumpKind = args.kind.parse()?;

    let project = Project::open(path)?;
    let release = &project.config().release;
    let relative = args.file.as_deref().unwrap_or(&release.version_file);

    let version_file = VersionFile::load(&project.resolve(relative))?;
    let current = version_file.version();
    let next = current.bump(kind)?;
    let pipeline = ReleasePipeline::plan(&next, relative, release);

    if args.dry_run {
        println!("Would bump version from {} to {} ({})", current, next, kind);
        println!("  Update {:?}", version_file.path());
        for step in pipeline.steps() {
            println!("  {}", step);
        }
        return Ok(());
    }

    version_file.write(&next)?;
    pipeline.run(runner, project.root())?;

    println!("Version bumped from {} to {}", current, next);
    println!(
        "Git operations completed and release {}{} created",
        release.tag_prefix, next
    );

    Ok(())
}

/// Print the greeting
pub fn hello() {
    println!("{}", crate::greeting());
}

/// Install or manage git hooks
pub fn hooks(path: &Path, install: bool, uninstall: bool) -> Result<()> {
    let project = Project::open_git(path)?;
    let hooks_dir = project.hooks_dir()?;
    let hook = hooks_dir.join(HOOK_NAME);

    if install {
        if hook.exists() && !is_own_hook(&hook) {
            anyhow::bail!(
                "A {} hook already exists at {:?}; remove it first",
                HOOK_NAME,
                hook
            );
        }

        let hook_content = format!(
            r#"#!/bin/sh
{}
git diff --cached --name-only -z --diff-filter=ACM -- '*.md' | xargs -0 docpolish check-markdown
"#,
            HOOK_MARKER
        );

        std::fs::create_dir_all(&hooks_dir)?;
        std::fs::write(&hook, hook_content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&hook)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&hook, perms)?;
        }

        println!("✓ Installed {} hook", HOOK_NAME);
    }

    if uninstall {
        if is_own_hook(&hook) {
            std::fs::remove_file(&hook)?;
            println!("✓ Removed {} hook", HOOK_NAME);
        } else if hook.exists() {
            println!("{} hook was not installed by docpolish; leaving it", HOOK_NAME);
        }
    }

    if !install && !uninstall {
        if is_own_hook(&hook) {
            println!("{} hook: installed", HOOK_NAME);
        } else {
            println!("{} hook: not installed", HOOK_NAME);
        }
    }

    Ok(())
}

fn is_own_hook(hook: &Path) -> bool {
    std::fs::read_to_string(hook)
        .map(|content| content.contains(HOOK_MARKER))
        .unwrap_or(false)
}

/// Show the effective configuration, or write the default one
pub fn config(path: &Path, init: bool, force: bool) -> Result<()> {
    let project = Project::open(path)?;

    if init {
        let config_path = ProjectConfig::path(project.root());
        if config_path.exists() && !force {
            anyhow::bail!(
                "Configuration already exists at {:?}. Use --force to overwrite.",
                config_path
            );
        }
        ProjectConfig::default().save(project.root())?;
        println!("✓ Wrote {:?}", config_path);
        return Ok(());
    }

    let config = project.config();

    println!("DocPolish Configuration");
    println!("=======================\n");
    println!("Project root: {:?}", project.root());
    println!("Git repository: {}", project.is_git());

    println!("\nMarkdown fixer:");
    println!("  Program: {}", config.fixer.program);
    println!("  Model: {}", config.fixer.model);
    println!("  Max turns: {}", config.fixer.max_turns);

    println!("\nRelease:");
    println!("  Version file: {}", config.release.version_file);
    println!("  Tag prefix: {}", config.release.tag_prefix);
    println!("  Commit message: {}", config.release.commit_message);
    println!("  Release title: {}", config.release.release_title);
    println!("  Push: {}", config.release.push);
    println!("  Create release: {}", config.release.create_release);

    Ok(())
}
