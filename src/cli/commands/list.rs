//! List command implementation.
//!
//! The `node-doctor list` command prints every detected installation,
//! newest version first.

use crate::aggregate::AggregateOptions;
use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The list command implementation.
pub struct ListCommand<'a> {
    ctx: &'a CommandContext,
    args: ListArgs,
}

impl<'a> ListCommand<'a> {
    /// Create a new list command.
    pub fn new(ctx: &'a CommandContext, args: ListArgs) -> Self {
        Self { ctx, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let results = self.ctx.registry.scan_all(&self.ctx.env);
        let installations = self.ctx.registry.all_installations(
            &results,
            AggregateOptions {
                include_non_deletable: self.args.all,
            },
        );
        tracing::debug!("Listing {} installation(s)", installations.len());

        let formatter = self.ctx.formatter(ui);
        formatter.installations(&installations, ui.out())?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{context, StubDetector};
    use crate::report::OutputFormat;
    use crate::ui::MockUI;

    fn detectors() -> Vec<StubDetector> {
        vec![
            StubDetector {
                name: "nvm",
                can_delete: true,
                versions: vec![("18.19.0", 10), ("20.11.0", 20)],
            },
            StubDetector {
                name: "system",
                can_delete: false,
                versions: vec![("21.0.0", 30)],
            },
        ]
    }

    #[test]
    fn lists_deletable_newest_first() {
        let ctx = context(OutputFormat::Text, detectors());
        let mut ui = MockUI::new();

        let result = ListCommand::new(&ctx, ListArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        let output = ui.output();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].contains("v20.11.0"));
        assert!(lines[1].contains("v18.19.0"));
        assert!(!output.contains("v21.0.0"));
    }

    #[test]
    fn all_includes_non_deletable() {
        let ctx = context(OutputFormat::Json, detectors());
        let mut ui = MockUI::new();

        ListCommand::new(&ctx, ListArgs { all: true })
            .execute(&mut ui)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.output()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["detector_name"], "system");
        assert_eq!(items[0]["can_delete"], false);
    }
}
