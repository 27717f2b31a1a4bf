//! Stage 1: build a native python for the build machine.
//!
//! The cross build needs two things from it: a working `python3` for the
//! build scripts and `Parser/pgen`, which the target build cannot run from
//! its own (cross-compiled) tree.

use anyhow::Result;

use crate::builder::context::BuildEnv;
use crate::core::layout::{Layout, MAKEFILE};
use crate::ops::errors::BuildError;
use crate::util::fs::ensure_dir;
use crate::util::process::{path_arg, CommandRunner, ProcessBuilder};

/// Result of a build stage that may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Built,
    Skipped,
}

/// Build and install the host python unless both artifacts already exist.
pub fn build_host_python(
    layout: &Layout,
    env: &BuildEnv,
    jobs: usize,
    runner: &mut dyn CommandRunner,
) -> Result<StageOutcome> {
    let build_dir = layout.host_build_dir();
    let install_dir = layout.host_install_dir();
    ensure_dir(&build_dir)?;

    if layout.host_python().is_file() && layout.host_pgen().is_file() {
        tracing::info!("Host python found, skipping build.");
        return Ok(StageOutcome::Skipped);
    }

    let command = |cmd: ProcessBuilder| env.apply(cmd.cwd(&build_dir));

    if build_dir.join(MAKEFILE).is_file() {
        // A stale configuration is not fatal; configure will rewrite it.
        let code = runner.run(&command(ProcessBuilder::new("make").arg("distclean")))?;
        if code != 0 {
            tracing::warn!("`make distclean` exited with code {}", code);
        }
    }

    let steps = [
        ProcessBuilder::new(layout.configure_script())
            .arg("--enable-shared")
            .arg(path_arg("--prefix=", &install_dir)),
        ProcessBuilder::new("make").arg(format!("-j{}", jobs)),
        ProcessBuilder::new("make").arg("install"),
    ];

    for step in steps {
        let cmd = command(step);
        let code = runner.run(&cmd)?;
        if code != 0 {
            return Err(BuildError::HostBuild {
                step: cmd.display_command(),
                code,
            }
            .into());
        }
    }

    Ok(StageOutcome::Built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockRunner, TestTree};

    #[test]
    fn test_skips_when_artifacts_exist() {
        let tree = TestTree::new().with_host_artifacts();
        let mut runner = MockRunner::new();

        let outcome = build_host_python(&tree.layout, &tree.env(), 4, &mut runner).unwrap();

        assert_eq!(outcome, StageOutcome::Skipped);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_builds_when_only_python_exists() {
        let tree = TestTree::new();
        tree.touch(tree.layout.host_python());
        let mut runner = MockRunner::new();

        let outcome = build_host_python(&tree.layout, &tree.env(), 4, &mut runner).unwrap();

        assert_eq!(outcome, StageOutcome::Built);
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn test_configure_build_install_in_order() {
        let tree = TestTree::new();
        let mut runner = MockRunner::new();

        build_host_python(&tree.layout, &tree.env(), 8, &mut runner).unwrap();

        let install = tree.layout.host_install_dir();
        assert_eq!(
            runner.commands(),
            vec![
                format!(
                    "{} --enable-shared --prefix={}",
                    tree.layout.configure_script().display(),
                    install.display()
                ),
                "make -j8".to_string(),
                "make install".to_string(),
            ]
        );
        for call in runner.calls() {
            assert_eq!(call.cwd.as_deref(), Some(tree.layout.host_build_dir().as_path()));
            assert_eq!(call.env("PATH").as_deref(), Some("/usr/bin:/bin"));
            assert!(!call.shell);
        }
    }

    #[test]
    fn test_distclean_when_previously_configured() {
        let tree = TestTree::new();
        tree.touch(tree.layout.host_build_dir().join(MAKEFILE));
        let mut runner = MockRunner::new();

        build_host_python(&tree.layout, &tree.env(), 2, &mut runner).unwrap();

        assert_eq!(runner.commands()[0], "make distclean");
        assert_eq!(runner.calls().len(), 4);
    }

    #[test]
    fn test_failure_aborts_remaining_steps() {
        let tree = TestTree::new();
        let mut runner = MockRunner::new();
        runner.fail_on("make -j", 2);

        let err = build_host_python(&tree.layout, &tree.env(), 2, &mut runner).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Could not build host python: `make -j2` exited with code 2; see logs for details."
        );
        let build_err = err.downcast_ref::<BuildError>().unwrap();
        assert_eq!(build_err.exit_code(), Some(2));
        assert!(!runner.commands().contains(&"make install".to_string()));
    }
}
