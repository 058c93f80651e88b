//! Hand-off of a finished plan to the installer and dependents checker.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::application::Target;
use crate::runtime::Runtime;

use super::config::InstallConfig;

/// Installs the planned targets.
#[cfg_attr(test, mockall::automock)]
pub trait Installer {
    fn install(&self, targets: &[Target], config: &InstallConfig) -> Result<()>;
}

/// Checks installed dependents of freshly upgraded targets.
#[cfg_attr(test, mockall::automock)]
pub trait DependentsChecker {
    fn check_dependents(&self, targets: &[Target], config: &InstallConfig) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffStage {
    Install,
    Dependents,
}

impl HandoffStage {
    fn file_name(self) -> &'static str {
        match self {
            HandoffStage::Install => "install.json",
            HandoffStage::Dependents => "dependents.json",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HandoffDocument<'a> {
    pub stage: HandoffStage,
    pub targets: &'a [Target],
    pub config: &'a InstallConfig,
}

/// Writes each stage as a JSON document into a directory, or to stdout
/// when no directory is configured. Dry runs always go to stdout.
pub struct HandoffWriter<'a, R: Runtime + ?Sized> {
    runtime: &'a R,
    dir: Option<PathBuf>,
}

impl<'a, R: Runtime + ?Sized> HandoffWriter<'a, R> {
    pub fn new(runtime: &'a R, dir: Option<PathBuf>) -> Self {
        Self { runtime, dir }
    }

    #[tracing::instrument(skip(self, targets, config))]
    fn emit(&self, stage: HandoffStage, targets: &[Target], config: &InstallConfig) -> Result<()> {
        let document = HandoffDocument {
            stage,
            targets,
            config,
        };
        let json = serde_json::to_string_pretty(&document)
            .context("Failed to serialize hand-off document")?;

        match self.dir.as_deref() {
            Some(dir) if !config.dry_run => self.write_to(dir, stage, &json),
            _ => {
                debug!("Printing {:?} hand-off to stdout", stage);
                println!("{}", json);
                Ok(())
            }
        }
    }

    fn write_to(&self, dir: &Path, stage: HandoffStage, json: &str) -> Result<()> {
        self.runtime
            .create_dir_all(dir)
            .with_context(|| format!("Failed to create hand-off directory {:?}", dir))?;
        let path = dir.join(stage.file_name());
        self.runtime
            .write(&path, json.as_bytes())
            .with_context(|| format!("Failed to write hand-off document {:?}", path))?;
        info!("Wrote {:?} hand-off to {:?}", stage, path);
        Ok(())
    }
}

impl<R: Runtime + ?Sized> Installer for HandoffWriter<'_, R> {
    fn install(&self, targets: &[Target], config: &InstallConfig) -> Result<()> {
        self.emit(HandoffStage::Install, targets, config)
    }
}

impl<R: Runtime + ?Sized> DependentsChecker for HandoffWriter<'_, R> {
    fn check_dependents(&self, targets: &[Target], config: &InstallConfig) -> Result<()> {
        self.emit(HandoffStage::Dependents, targets, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::name;

    fn targets() -> Vec<Target> {
        vec![Target {
            name: name("wget"),
            install_name: name("wget"),
            installed_version: "1.21".into(),
            version: "1.24".into(),
            head: false,
        }]
    }

    #[test]
    fn test_writes_install_document() {
        let dir = PathBuf::from("/tmp/handoff");
        let mut runtime = MockRuntime::new();
        runtime
            .expect_create_dir_all()
            .withf(|p| p == Path::new("/tmp/handoff"))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(|p, contents| {
                let json: serde_json::Value = serde_json::from_slice(contents).unwrap();
                p == Path::new("/tmp/handoff/install.json")
                    && json["stage"] == "install"
                    && json["targets"][0]["install_name"] == "wget"
                    && json["config"]["verbosity"] == "normal"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let writer = HandoffWriter::new(&runtime, Some(dir));
        writer
            .install(&targets(), &InstallConfig::default())
            .unwrap();
    }

    #[test]
    fn test_writes_dependents_document() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(|p, _| p == Path::new("/tmp/handoff/dependents.json"))
            .times(1)
            .returning(|_, _| Ok(()));

        let writer = HandoffWriter::new(&runtime, Some(PathBuf::from("/tmp/handoff")));
        writer
            .check_dependents(&targets(), &InstallConfig::default())
            .unwrap();
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().never();
        runtime.expect_write().never();

        let config = InstallConfig {
            dry_run: true,
            ..Default::default()
        };
        let writer = HandoffWriter::new(&runtime, Some(PathBuf::from("/tmp/handoff")));
        writer.install(&targets(), &config).unwrap();
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut runtime = MockRuntime::new();
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let writer = HandoffWriter::new(&runtime, Some(PathBuf::from("/tmp/handoff")));
        let err = writer
            .install(&targets(), &InstallConfig::default())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("disk full"));
    }
}
