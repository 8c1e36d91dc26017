//! Doctor command implementation.
//!
//! The `node-doctor doctor` command scans the machine, evaluates every
//! health rule and exits non-zero when any check fails.

use crate::cli::args::DoctorArgs;
use crate::error::Result;
use crate::health::{run_assessment, CollectOptions, HealthCollector, RuleSet};
use crate::net::{FeedClient, HttpFetcher, RetryPolicy};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The doctor command implementation.
pub struct DoctorCommand<'a> {
    ctx: &'a CommandContext,
    args: DoctorArgs,
    retry: RetryPolicy,
}

impl<'a> DoctorCommand<'a> {
    /// Create a new doctor command.
    pub fn new(ctx: &'a CommandContext, args: DoctorArgs) -> Self {
        Self {
            ctx,
            args,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the feed retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Probe options after merging flags with the config file.
    pub fn options(&self) -> CollectOptions {
        CollectOptions {
            skip_ports: self.args.skip_ports || self.ctx.config.skip_ports(),
            skip_shell: self.args.skip_shell || self.ctx.config.skip_shell(),
        }
    }

    fn collector(&self) -> HealthCollector {
        let config = &self.ctx.config;
        let feeds = FeedClient::new(HttpFetcher::with_timeout(config.network_timeout()), self.retry)
            .with_urls(config.schedule_url(), config.dist_index_url());
        let collector = HealthCollector::new(self.ctx.env.clone(), feeds);
        match &config.registry_url {
            Some(url) => collector.with_registry_url(url.clone()),
            None => collector,
        }
    }
}

impl Command for DoctorCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = &self.ctx.registry;
        let results = registry.scan_all(&self.ctx.env);
        let assessment = run_assessment(
            &self.collector(),
            registry,
            &results,
            &RuleSet::with_builtins(),
            self.options(),
            chrono::Utc::now(),
        );
        tracing::debug!(
            "Assessment: {} ({} checks)",
            assessment.overall_status,
            assessment.summary.total
        );

        let formatter = self.ctx.formatter(ui);
        formatter.assessment(&assessment, ui.out())?;

        if assessment.exit_code == 0 {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(assessment.exit_code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::context;
    use crate::report::OutputFormat;
    use crate::ui::MockUI;
    use httpmock::prelude::*;

    #[test]
    fn options_merge_flags_and_config() {
        let mut ctx = context(OutputFormat::Text, vec![]);
        ctx.config.skip_shell = Some(true);
        let cmd = DoctorCommand::new(
            &ctx,
            DoctorArgs {
                skip_ports: true,
                skip_shell: false,
            },
        );
        let options = cmd.options();
        assert!(options.skip_ports);
        assert!(options.skip_shell);
    }

    #[test]
    fn no_runtime_fails_with_exit_one() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::HEAD).path("/");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path("/schedule.json");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/index.json");
            then.status(404);
        });

        let mut ctx = context(OutputFormat::Json, vec![]);
        ctx.config.registry_url = Some(server.url("/"));
        ctx.config.schedule_url = Some(server.url("/schedule.json"));
        ctx.config.dist_index_url = Some(server.url("/index.json"));

        let cmd = DoctorCommand::new(
            &ctx,
            DoctorArgs {
                skip_ports: true,
                skip_shell: true,
            },
        )
        .with_retry(RetryPolicy::none());
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 1);

        let value: serde_json::Value = serde_json::from_str(&ui.output()).unwrap();
        assert_eq!(value["overall_status"], "fail");
        let checks = value["checks"].as_array().unwrap();
        let node = checks.iter().find(|c| c["id"] == "node-in-path").unwrap();
        assert_eq!(node["status"], "fail");
        let npm = checks.iter().find(|c| c["id"] == "npm-registry").unwrap();
        assert_eq!(npm["status"], "pass");
    }
}
