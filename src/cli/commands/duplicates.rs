//! Duplicates command implementation.
//!
//! The `node-doctor duplicates` command shows versions installed under more
//! than one manager and the space a cleanup would free.

use crate::aggregate::find_duplicates;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The duplicates command implementation.
pub struct DuplicatesCommand<'a> {
    ctx: &'a CommandContext,
}

impl<'a> DuplicatesCommand<'a> {
    pub fn new(ctx: &'a CommandContext) -> Self {
        Self { ctx }
    }
}

impl Command for DuplicatesCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let results = self.ctx.registry.scan_all(&self.ctx.env);
        let duplicates = find_duplicates(self.ctx.registry.managed_installations(&results));

        let formatter = self.ctx.formatter(ui);
        formatter.duplicates(&duplicates, ui.out())?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{context, StubDetector};
    use crate::report::OutputFormat;
    use crate::ui::MockUI;

    #[test]
    fn reports_shared_versions() {
        let ctx = context(
            OutputFormat::Text,
            vec![
                StubDetector {
                    name: "nvm",
                    can_delete: true,
                    versions: vec![("20.11.0", 1024), ("18.19.0", 10)],
                },
                StubDetector {
                    name: "fnm",
                    can_delete: true,
                    versions: vec![("v20.11.0", 1024)],
                },
            ],
        );
        let mut ui = MockUI::new();

        let result = DuplicatesCommand::new(&ctx).execute(&mut ui).unwrap();

        assert!(result.success);
        let output = ui.output();
        assert!(output.starts_with("v20.11.0  nvm, fnm  2.0 KB (reclaim ~1.0 KB)"));
        assert!(!output.contains("18.19.0"));
    }

    #[test]
    fn none_found() {
        let ctx = context(
            OutputFormat::Text,
            vec![StubDetector {
                name: "nvm",
                can_delete: true,
                versions: vec![("20.11.0", 1)],
            }],
        );
        let mut ui = MockUI::new();

        DuplicatesCommand::new(&ctx).execute(&mut ui).unwrap();
        assert_eq!(ui.output(), "No duplicate versions\n");
    }
}
