// tests/toolchain.rs

use std::path::PathBuf;

use devloop::toolchain::go::{build_args, parse_go_version};
use devloop::toolchain::BuildRequest;

#[test]
fn go_version_is_extracted() {
    assert_eq!(
        parse_go_version("go version go1.22.3 linux/amd64\n").as_deref(),
        Some("1.22.3")
    );
    assert_eq!(
        parse_go_version("go version go1.21rc2 darwin/arm64").as_deref(),
        Some("1.21rc2")
    );
    assert_eq!(parse_go_version("command not found"), None);
}

#[test]
fn build_args_include_only_what_is_set() {
    let plain = BuildRequest {
        artifact: "app".to_string(),
        tags: None,
        entry_point: None,
    };
    assert_eq!(build_args(&plain), vec!["build", "-o", "app"]);

    let full = BuildRequest {
        artifact: "server".to_string(),
        tags: Some("dev sqlite".to_string()),
        entry_point: Some(PathBuf::from("cmd/server/main.go")),
    };
    assert_eq!(
        build_args(&full),
        vec!["build", "-o", "server", "-tags", "dev sqlite", "cmd/server/main.go"]
    );
}

#[cfg(unix)]
mod unix {
    use std::error::Error;
    use std::fs;

    use tempfile::TempDir;
    use tokio::process::Command;

    use devloop::toolchain::capture::run_captured;
    use devloop::toolchain::{BuildRequest, GoToolchain, Toolchain};

    type TestResult = Result<(), Box<dyn Error>>;

    #[tokio::test]
    async fn captured_output_includes_both_streams() -> TestResult {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo to-stdout; echo to-stderr 1>&2; exit 3"]);

        let result = run_captured(cmd, "sh").await?;

        assert!(!result.success);
        assert!(result.output.contains("to-stdout"));
        assert!(result.output.contains("to-stderr"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_program_is_an_error_not_a_failed_build() -> TestResult {
        let dir = TempDir::new()?;
        let go = GoToolchain::new("devloop-no-such-go", dir.path(), vec!["true".to_string()]);
        let request = BuildRequest {
            artifact: "app".to_string(),
            tags: None,
            entry_point: None,
        };

        assert!(go.build(&request).await.is_err());
        assert!(go.version().await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn vendor_update_clears_godeps_and_runs_command() -> TestResult {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("vendor"))?;
        fs::create_dir_all(dir.path().join("Godeps"))?;
        fs::write(dir.path().join("Godeps/Godeps.json"), "{}")?;
        let go = GoToolchain::new("go", dir.path(), vec!["true".to_string()]);

        assert!(go.has_vendor_dir());
        let result = go.update_vendor().await?;

        assert!(result.success);
        assert!(!dir.path().join("Godeps").exists());
        Ok(())
    }

    #[tokio::test]
    async fn failing_tool_yields_unsuccessful_result() -> TestResult {
        let dir = TempDir::new()?;
        let go = GoToolchain::new("false", dir.path(), vec!["false".to_string()]);

        let result = go.install("example.com/app/pkg").await?;

        assert!(!result.success);
        assert!(!go.has_vendor_dir());
        Ok(())
    }
}
