use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::context::{CONFIG_FILE_NAME, default_config_toml};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Initialize",
    commands: &[
        "gqlcheck init                     # Write .gqlcheck.toml with defaults",
        "gqlcheck init --force             # Overwrite an existing config file",
        "gqlcheck init --path ci/gql.toml  # Write the config somewhere else",
    ],
}];

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,

    /// Where to write the config file
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    pub path: PathBuf,
}

pub async fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    output.heading("Initialize gqlcheck");

    if args.path.exists() && !args.force {
        output.warning(&format!("{} already exists", args.path.display()));
        output.info("Use --force to overwrite it.");
        anyhow::bail!("Config file already exists");
    }

    let content = default_config_toml()?;
    if let Some(parent) = args.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&args.path, content)
        .await
        .with_context(|| format!("Failed to write {}", args.path.display()))?;

    output.success(&format!("Created {}", args.path.display()));
    output.info("Run 'gqlcheck diff <old> <new>' to compare two schema versions.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ConfigContext;
    use crate::output::GlobalOptions;

    fn quiet_output() -> OutputManager {
        OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        handle_init(InitArgs { force: false, path: path.clone() }, &quiet_output())
            .await
            .unwrap();

        let ctx = ConfigContext::load(&path).unwrap();
        assert!(ctx.config.diff.rules.is_empty());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "# custom\n").unwrap();

        let result = handle_init(InitArgs { force: false, path: path.clone() }, &quiet_output()).await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# custom\n");

        handle_init(InitArgs { force: true, path: path.clone() }, &quiet_output())
            .await
            .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[diff]"));
    }
}
