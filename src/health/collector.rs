//! Health data collection.
//!
//! Collection runs in three phases:
//!
//! 1. Network: registry probe and both release feeds, concurrently.
//! 2. Local probes: PATH, ports, shell profiles, package managers,
//!    permissions, corepack, globals, project and the probing heuristics,
//!    concurrently.
//! 3. Pure checks over what phases 1 and 2 gathered.
//!
//! Every probe degrades to empty or unknown data, so `collect` never fails.

use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::data::{
    host_arch, EnvVarFlags, FeedStatus, HealthData, InstalledVersionStatus, ManagerInfo, SystemInfo,
};
use crate::aggregate::{by_version_desc, find_duplicates};
use crate::detectors::managed::find_def;
use crate::detectors::{DetectorRegistry, ScanResults};
use crate::net::{check_eol, check_security, DistRelease, FeedClient, HttpFetcher, ReleaseSchedule};
use crate::platform::{is_ci, HostEnv};
use crate::probes::extended::{
    cache_health, engines, global_root, ide, native_build, npm_prefix, shell_startup,
    stale_native, symlink, version_files, ExtendedChecks,
};
use crate::probes::registry::{configured_registry, probe_registry, REGISTRY_TIMEOUT};
use crate::probes::{
    corepack, global_packages, package_managers, path_scan, permissions, ports, project,
    shell_config, RegistryInfo,
};
use crate::sys::command;

/// Which optional probes to skip.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    pub skip_ports: bool,
    pub skip_shell: bool,
}

/// Gathers a [`HealthData`] snapshot.
pub struct HealthCollector {
    env: HostEnv,
    feeds: FeedClient,
    registry_fetcher: HttpFetcher,
    registry_override: Option<String>,
    default_registry: String,
    today: Option<NaiveDate>,
}

impl HealthCollector {
    pub fn new(env: HostEnv, feeds: FeedClient) -> Self {
        Self {
            env,
            feeds,
            registry_fetcher: HttpFetcher::with_timeout(REGISTRY_TIMEOUT),
            registry_override: None,
            default_registry: crate::net::DEFAULT_REGISTRY_URL.to_string(),
            today: None,
        }
    }

    /// Probe `url` instead of the registry npm is configured with.
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_override = Some(url.into());
        self
    }

    /// Timeout for the registry probe.
    pub fn with_registry_timeout(mut self, timeout: Duration) -> Self {
        self.registry_fetcher = HttpFetcher::with_timeout(timeout);
        self
    }

    /// Fix the date used for EOL classification.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn env(&self) -> &HostEnv {
        &self.env
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    fn registry_info(&self) -> RegistryInfo {
        match &self.registry_override {
            Some(url) => RegistryInfo {
                url: url.clone(),
                source: "config".to_string(),
            },
            None => configured_registry(&self.env, &self.default_registry),
        }
    }

    /// Run every probe and assemble the snapshot.
    pub fn collect(
        &self,
        registry: &DetectorRegistry,
        results: &ScanResults,
        options: CollectOptions,
    ) -> HealthData {
        let env = &self.env;
        let platform = env.platform;
        let registry_config = self.registry_info();

        // Phase 1: network
        tracing::debug!("Probing registry {} and release feeds", registry_config.url);
        let (registry_status, schedule, dist_index) = thread::scope(|s| {
            let registry_handle =
                s.spawn(|| probe_registry(&self.registry_fetcher, &registry_config.url));
            let schedule_handle = s.spawn(|| self.feeds.schedule());
            let index_handle = s.spawn(|| self.feeds.dist_index());
            (
                join_or_default(registry_handle),
                join_or(schedule_handle, crate::net::FetchError::Transport {
                    url: String::new(),
                    message: "schedule fetch panicked".to_string(),
                }),
                join_or(index_handle, crate::net::FetchError::Transport {
                    url: String::new(),
                    message: "distribution index fetch panicked".to_string(),
                }),
            )
        });

        let mut feeds = FeedStatus::default();
        let schedule: Option<Arc<ReleaseSchedule>> = match schedule {
            Ok(schedule) => {
                feeds.schedule_available = true;
                Some(schedule)
            }
            Err(e) => {
                tracing::warn!("Release schedule unavailable: {}", e);
                feeds.errors.push(format!("release schedule: {}", e));
                None
            }
        };
        let dist_index: Option<Arc<Vec<DistRelease>>> = match dist_index {
            Ok(index) => {
                feeds.dist_index_available = true;
                Some(index)
            }
            Err(e) => {
                tracing::warn!("Distribution index unavailable: {}", e);
                feeds.errors.push(format!("distribution index: {}", e));
                None
            }
        };
        let today = self.today();
        let schedule_ref = schedule.as_deref();
        let index_ref = dist_index.as_deref().map(Vec::as_slice);

        // PATH attribution only reads the scan results
        let mut nodes_in_path = path_scan::scan_path(registry, results, platform);
        for node in &mut nodes_in_path {
            if let Some(version) = node.version.as_deref() {
                node.eol = Some(check_eol(schedule_ref, version, today));
                node.security = Some(check_security(index_ref, version));
            }
        }
        let active_managers = path_scan::active_managers(&nodes_in_path);
        let active_exe = nodes_in_path.first().map(|n| n.executable.clone());
        let active_version = nodes_in_path.first().and_then(|n| n.version.clone());

        // Phase 2: local probes
        tracing::debug!("Running local probes");
        let project_root = env.cwd.clone();
        let local = thread::scope(|s| {
            let ports = (!options.skip_ports).then(|| s.spawn(|| ports::scan_ports(platform)));
            let shell = (!options.skip_shell).then(|| s.spawn(|| shell_config::scan_shell_configs(env)));
            let npm = s.spawn(|| {
                let managers = package_managers::probe_package_managers();
                let permissions = permissions::check_permissions(
                    platform,
                    managers.npm_prefix.as_deref(),
                    managers.npm_cache.as_deref(),
                );
                let cache = managers.npm_cache.as_deref().map(cache_health::probe_cache);
                (managers, permissions, cache)
            });
            let globals = s.spawn(global_packages::probe_global_packages);
            let project = s.spawn(|| project::probe_project(&project_root));
            let corepack = s.spawn(|| {
                let bin_dir = active_exe.as_deref().and_then(Path::parent);
                corepack::probe_corepack(bin_dir)
            });
            let arch = s.spawn(|| {
                let exe = active_exe.as_deref()?;
                command::run_line(&exe.to_string_lossy(), &["-p", "process.arch"])
            });
            let native = s.spawn(|| native_build::probe_native_build(platform));
            let links = s.spawn(|| symlink::probe_symlinks(platform));

            LocalProbes {
                ports: ports.and_then(join_optional),
                shell: shell.and_then(join_optional),
                npm: join_or_default(npm),
                global_packages: join_or_default(globals),
                project: join_or_default(project),
                corepack: join_or_default(corepack),
                active_arch: join_or_default(arch),
                native_build: join_optional(native),
                symlinks: join_optional(links),
            }
        });
        let (package_managers, permissions, cache) = local.npm;

        // Phase 3: pure checks
        let active_owner = nodes_in_path
            .first()
            .map(|n| n.owner.clone())
            .unwrap_or_else(|| path_scan::OWNER_UNKNOWN.to_string());
        // only directory-per-version managers own an npm prefix
        let manager_root = results
            .get(&active_owner)
            .filter(|_| find_def(&active_owner).is_some())
            .map(|r| r.base_dir.clone());
        let global_root_dir = local.global_packages.as_ref().and_then(|g| g.root.clone());

        let extended = ExtendedChecks {
            npm_prefix: npm_prefix::check_npm_prefix(
                package_managers.npm_prefix.as_deref(),
                manager_root
                    .as_deref()
                    .map(|root| (active_owner.as_str(), root)),
            ),
            shell_startup: local.shell.as_ref().map(shell_startup::check_shell_startup),
            version_files: version_files::check_version_files(&local.project),
            engines: engines::check_engines(
                &local.project,
                active_version.as_deref(),
                &package_managers,
            ),
            native_build: local.native_build,
            cache,
            global_root: global_root::check_global_root(
                platform,
                global_root_dir.as_deref(),
                active_exe.as_deref(),
                &active_owner,
            ),
            symlinks: local.symlinks,
            stale_native: stale_native::check_stale_native(
                &local.project.root,
                local.project.engines_node(),
                active_version.as_deref(),
            ),
            ide: ide::check_ide(&local.project.root, local.project.pinned_version().is_some()),
        };

        let managers = manager_infos(registry, results);
        let installed = registry
            .managed_installations(results)
            .into_iter()
            .map(|inst| InstalledVersionStatus {
                manager: inst.manager.clone(),
                version: inst.version.clone(),
                eol: check_eol(schedule_ref, &inst.version, today),
                security: check_security(index_ref, &inst.version),
            })
            .collect();
        let duplicates = find_duplicates(registry.managed_installations(results));

        HealthData {
            system: SystemInfo {
                platform,
                arch: host_arch().to_string(),
                is_ci: is_ci(env),
                running_as_root: permissions.running_as_root,
            },
            nodes_in_path,
            active_arch: local.active_arch,
            managers,
            active_managers,
            registry: registry_status,
            registry_config,
            feeds,
            installed,
            ports: local.ports,
            shell: local.shell,
            package_managers,
            duplicates,
            env_vars: EnvVarFlags {
                node_path: env.var("NODE_PATH").map(String::from),
                node_options: env.var("NODE_OPTIONS").map(String::from),
                npm_config_prefix: env
                    .var("npm_config_prefix")
                    .or_else(|| env.var("NPM_CONFIG_PREFIX"))
                    .map(String::from),
            },
            global_packages: local.global_packages,
            permissions,
            corepack: local.corepack,
            project: local.project,
            extended,
        }
    }
}

struct LocalProbes {
    ports: Option<Vec<crate::probes::PortProcess>>,
    shell: Option<crate::probes::ShellScan>,
    npm: (
        crate::probes::PackageManagers,
        crate::probes::PermissionReport,
        Option<cache_health::CacheHealth>,
    ),
    global_packages: Option<crate::probes::GlobalPackages>,
    project: crate::probes::ProjectInfo,
    corepack: crate::probes::CorepackStatus,
    active_arch: Option<String>,
    native_build: Option<native_build::NativeBuildTools>,
    symlinks: Option<symlink::SymlinkCapability>,
}

/// Detected managers, analysis-only sentinels excluded.
fn manager_infos(registry: &DetectorRegistry, results: &ScanResults) -> Vec<ManagerInfo> {
    results
        .detected()
        .filter(|(name, _)| !registry.is_analysis_only(name))
        .map(|(name, result)| {
            let mut installations: Vec<_> = result.installations.iter().collect();
            installations.sort_by(|a, b| by_version_desc(a, b));
            ManagerInfo {
                name: name.to_string(),
                display_name: registry
                    .get(name)
                    .map(|d| d.display_name().to_string())
                    .unwrap_or_else(|| name.to_string()),
                base_dir: result.base_dir.clone(),
                versions: installations.iter().map(|i| i.version.clone()).collect(),
                total_size: result.total_size(),
                default_version: result.default_version.clone(),
                env_var: result.env_var.clone(),
                env_var_set: result.env_var_set,
                env_required: find_def(name).is_some_and(|def| def.env_required),
            }
        })
        .collect()
}

fn join_optional<T>(handle: thread::ScopedJoinHandle<'_, T>) -> Option<T> {
    match handle.join() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Probe panicked; continuing without it");
            None
        }
    }
}

fn join_or_default<T: Default>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    join_optional(handle).unwrap_or_default()
}

fn join_or<T, E>(handle: thread::ScopedJoinHandle<'_, Result<T, E>>, error: E) -> Result<T, E> {
    join_optional(handle).unwrap_or(Err(error))
}
