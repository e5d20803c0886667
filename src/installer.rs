//! Package installation
//!
//! An install runs in two stages. Planning resolves the whole dependency
//! graph and validates every strategy, so nothing is downloaded while the
//! graph still has a missing recipe, an unknown strategy or a cycle. The
//! plan is then installed in order, dependencies first, each package
//! through its strategy:
//!
//! - `vendor_install`: acquire the artifact and run the scripts against it
//! - `zip_install`: acquire and extract the archive, locate the installer
//!   binary inside it and run the scripts against that
//!
//! Scripts run as `pre-install`, `install`, `post-install`; blank phases
//! are skipped and the first failure stops the package. Temporary
//! artifacts are owned by the strategy and removed when it returns.

use crate::core::context::FormatContext;
use crate::core::deps;
use crate::core::error::{InstallError, Result};
use crate::helpers::acquire::Pipeline;
use crate::helpers::acquire::extract::ArchiveFormat;
use crate::helpers::discover;
use crate::helpers::script::{ScriptRunner, ShellExecutor};
use crate::helpers::template::Variables;
use crate::recipe::{PackageDescriptor, Phase, Strategy};
use crate::resolver::RecipeSource;

/// Installs packages resolved from `S`, running scripts through `R`.
pub struct Installer<S, R = ShellExecutor> {
    source: S,
    runner: R,
    pipeline: Pipeline,
    context: FormatContext,
    dry_run: bool,
}

impl<S: RecipeSource> Installer<S, ShellExecutor> {
    /// Installer that runs scripts under the platform shell.
    pub fn new(source: S, context: FormatContext) -> Self {
        Self::with_runner(source, ShellExecutor::new(), context)
    }
}

impl<S: RecipeSource, R: ScriptRunner> Installer<S, R> {
    pub fn with_runner(source: S, runner: R, context: FormatContext) -> Self {
        Self {
            source,
            runner,
            pipeline: Pipeline::default(),
            context,
            dry_run: false,
        }
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Plan and report only; nothing is downloaded or run.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn context(&self) -> &FormatContext {
        &self.context
    }

    /// Resolve a recipe by name.
    pub fn resolve(&self, name: &str) -> Result<PackageDescriptor> {
        self.source.resolve(name)
    }

    /// Install order for `descriptor`, dependencies first.
    pub fn plan(&self, descriptor: PackageDescriptor) -> Result<Vec<PackageDescriptor>> {
        let name = descriptor.name.clone();
        deps::plan(descriptor, &self.source).map_err(|e| e.for_package(&name))
    }

    /// Resolve `name` and install it with its dependencies.
    pub fn install_by_name(&self, name: &str) -> Result<()> {
        let descriptor = self.resolve(name).map_err(|e| e.for_package(name))?;
        self.install(descriptor)
    }

    /// Install `descriptor` and everything it depends on.
    pub fn install(&self, descriptor: PackageDescriptor) -> Result<()> {
        let name = descriptor.name.clone();
        let plan = self.plan(descriptor).inspect_err(|e| {
            tracing::error!("planning {} failed: {}", name, e);
        })?;

        let total = plan.len();
        if total > 1 {
            let names: Vec<&str> = plan.iter().map(|p| p.name.as_str()).collect();
            tracing::info!("Install order: {}", names.join(", "));
        }

        for (i, package) in plan.iter().enumerate() {
            let is_target = i + 1 == total;
            if is_target {
                tracing::info!("Installing {} {}", package.name, package.version);
            } else {
                tracing::info!(
                    "({}/{}) Installing dependency {} {}",
                    i + 1,
                    total - 1,
                    package.name,
                    package.version
                );
            }

            if self.dry_run {
                tracing::info!("dry run: skipping {} ({})", package.name, package.strategy);
                continue;
            }

            if let Err(e) = self.install_one(package) {
                tracing::error!("{} failed during {}: {}", package.name, e.phase(), e);
                return Err(if is_target {
                    e.for_package(&name)
                } else {
                    InstallError::DependencyInstallFailed {
                        package: name.clone(),
                        dependency: package.name.clone(),
                        source: Box::new(e),
                    }
                });
            }

            tracing::info!("{} installed", package.name);
        }

        Ok(())
    }

    /// Uninstalling is not supported yet; logs a warning and does nothing.
    pub fn uninstall(&self, name: &str) -> Result<()> {
        // TODO: mirror install in reverse dependency order once installs
        // leave a manifest behind.
        tracing::warn!("uninstall is not implemented; nothing was removed for {}", name);
        Ok(())
    }

    /// Install a single package, dependencies assumed present.
    fn install_one(&self, package: &PackageDescriptor) -> Result<()> {
        match &package.strategy {
            Strategy::VendorInstall => self.vendor_install(package),
            Strategy::ZipInstall => self.zip_install(package),
            Strategy::Unsupported(s) => Err(InstallError::UnsupportedStrategy(s.clone())),
        }
    }

    fn vendor_install(&self, package: &PackageDescriptor) -> Result<()> {
        let artifact = self
            .pipeline
            .fetch_and_prepare(&package.location, package.expected_checksum())?;

        let vars = self.context.variables(package, artifact.path(), None);
        self.run_phases(package, &vars)
    }

    fn zip_install(&self, package: &PackageDescriptor) -> Result<()> {
        let extracted = self
            .pipeline
            .fetch_and_prepare(&package.location, package.expected_checksum())?
            .into_extracted(ArchiveFormat::Zip)?;

        let binary = discover::find_installer(extracted.path())?;
        tracing::info!("Found installer {}", binary.display());

        let vars = self
            .context
            .variables(package, &binary, Some(extracted.path()));
        self.run_phases(package, &vars)
    }

    fn run_phases(&self, package: &PackageDescriptor, vars: &Variables) -> Result<()> {
        for phase in Phase::INSTALL_ORDER {
            let Some(body) = package.script(phase) else {
                continue;
            };
            tracing::info!("Running {} script for {}", phase, package.name);
            self.runner.run(phase, body, vars)?;
        }
        Ok(())
    }
}
