use std::fs;
use std::path::{Path, PathBuf};

use taskdag::cli::parse_from;
use taskdag::engine::checkpoint::resume_file_path;
use taskdag::{RunStatus, run};
use taskdag_test_utils::{init_tracing, with_timeout};
use tempfile::TempDir;

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Taskdag.toml");
    fs::write(&path, contents).unwrap();
    path
}

async fn run_with(config: &Path, extra: &[&str]) -> anyhow::Result<RunStatus> {
    let mut argv = vec![
        "taskdag".to_string(),
        "--config".to_string(),
        config.display().to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    run(parse_from(argv)?).await
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}

const PIPELINE: &str = r#"
[task.a]
cmd = 'echo a >> runs.log; printf a > "$TASKDAG_OUTPUT"'

[task.b]
cmd = 'test -f fixed || exit 3; echo b >> runs.log; printf b > "$TASKDAG_OUTPUT"'

[task.c]
cmd = 'echo c >> runs.log; cat out/a out/b > "$TASKDAG_OUTPUT"'
after = ["a", "b"]

[task.d]
cmd = 'echo d >> runs.log; printf d > "$TASKDAG_OUTPUT"'
after = ["a"]
"#;

#[tokio::test]
async fn test_run_builds_everything_in_order() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("fixed"), "").unwrap();
        let config = write_config(tmp.path(), PIPELINE);

        let status = run_with(&config, &[]).await.unwrap();

        assert_eq!(status, RunStatus::Success);
        assert_eq!(status.exit_code(), 0);
        assert_eq!(read(tmp.path().join("runs.log")), "a\nb\nc\nd\n");
        assert_eq!(read(tmp.path().join("out/c")), "ab");
    })
    .await;
}

#[tokio::test]
async fn test_failed_run_resumes_from_resume_file() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        let config = write_config(tmp.path(), PIPELINE);
        let out = tmp.path().join("out");

        let status = run_with(&config, &["-k"]).await.unwrap();
        assert_eq!(status, RunStatus::Incomplete);
        assert_eq!(status.exit_code(), 1);
        assert_eq!(read(tmp.path().join("runs.log")), "a\nd\n");

        let resume = resume_file_path(&out);
        assert_eq!(read(&resume), "-f\n^a$\n-f\n^d$\n");

        fs::write(tmp.path().join("fixed"), "").unwrap();
        let resume_arg = format!("@{}", resume.display());
        let status = run_with(&config, &[&resume_arg]).await.unwrap();

        assert_eq!(status, RunStatus::Success);
        // a and d were not rebuilt.
        assert_eq!(read(tmp.path().join("runs.log")), "a\nd\nb\nc\n");
        assert_eq!(read(out.join("c")), "ab");
    })
    .await;
}

#[tokio::test]
async fn test_abort_policy_from_config() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        let contents = format!("[config]\non_failure = \"abort\"\n{PIPELINE}");
        let config = write_config(tmp.path(), &contents);

        let status = run_with(&config, &[]).await.unwrap();

        assert_eq!(status, RunStatus::Incomplete);
        // b fails; d would still be buildable but abort stops the run.
        assert_eq!(read(tmp.path().join("runs.log")), "a\n");
        assert_eq!(
            read(resume_file_path(&tmp.path().join("out"))),
            "-f\n^a$\n"
        );
    })
    .await;
}

#[tokio::test]
async fn test_keep_going_flag_overrides_abort_in_config() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        let contents = format!("[config]\non_failure = \"abort\"\n{PIPELINE}");
        let config = write_config(tmp.path(), &contents);

        let status = run_with(&config, &["-k"]).await.unwrap();

        assert_eq!(status, RunStatus::Incomplete);
        assert_eq!(read(tmp.path().join("runs.log")), "a\nd\n");
    })
    .await;
}

#[tokio::test]
async fn test_dry_run_builds_nothing() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        let config = write_config(tmp.path(), PIPELINE);

        let status = run_with(&config, &["-d", "-e", "^c$"]).await.unwrap();

        assert_eq!(status, RunStatus::Success);
        assert!(!tmp.path().join("runs.log").exists());
        assert!(!tmp.path().join("out/a").exists());
        assert!(!resume_file_path(&tmp.path().join("out")).exists());
    })
    .await;
}

#[tokio::test]
async fn test_output_flag_overrides_config_and_visualize_writes_dot() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("fixed"), "").unwrap();
        let config = write_config(tmp.path(), PIPELINE);
        let dist = tmp.path().join("dist");
        let dist_arg = dist.display().to_string();

        let status = run_with(&config, &["-o", &dist_arg, "-v", "-e", "^d$"])
            .await
            .unwrap();

        assert_eq!(status, RunStatus::Success);
        assert_eq!(read(dist.join("d")), "d");
        assert!(dist.join(taskdag::viz::DOT_FILE).exists());
        assert!(!tmp.path().join("out").exists());
    })
    .await;
}

#[tokio::test]
async fn test_nothing_to_build_when_every_final_is_impossible() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        let config = write_config(tmp.path(), PIPELINE);

        let status = run_with(&config, &["-f", "^a$"]).await.unwrap();

        assert_eq!(status, RunStatus::NothingToBuild);
        assert_eq!(status.exit_code(), 1);
        assert!(!tmp.path().join("runs.log").exists());
    })
    .await;
}

#[tokio::test]
async fn test_cycle_in_task_file_is_reported_before_running() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        let config = write_config(
            tmp.path(),
            r#"
[config]
default = ["a"]

[task.a]
cmd = 'echo a >> runs.log'
after = ["b"]

[task.b]
cmd = 'echo b >> runs.log'
after = ["a"]
"#,
        );

        let err = run_with(&config, &[]).await.unwrap_err();

        assert!(err.to_string().contains("cycle"), "{err}");
        assert!(!tmp.path().join("runs.log").exists());
    })
    .await;
}

#[tokio::test]
async fn test_task_without_cmd_and_output_is_not_frozen_for_resume() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        let config = write_config(
            tmp.path(),
            r#"
[task.vendor]

[task.build]
cmd = 'test -f fixed || exit 3; echo build >> runs.log; printf b > "$TASKDAG_OUTPUT"'
after = ["vendor"]
"#,
        );
        let out = tmp.path().join("out");
        let resume = resume_file_path(&out);
        let resume_arg = format!("@{}", resume.display());

        let status = run_with(&config, &[]).await.unwrap();
        assert_eq!(status, RunStatus::Incomplete);
        assert_eq!(read(&resume), "");

        // vendor's output is still missing: the resumed run must retry the
        // pipeline rather than report nothing to build.
        fs::write(tmp.path().join("fixed"), "").unwrap();
        let status = run_with(&config, &[&resume_arg]).await.unwrap();
        assert_eq!(status, RunStatus::Incomplete);
        assert!(!tmp.path().join("runs.log").exists());

        fs::write(out.join("vendor"), "v").unwrap();
        let status = run_with(&config, &[&resume_arg]).await.unwrap();
        assert_eq!(status, RunStatus::Success);
        assert_eq!(read(tmp.path().join("runs.log")), "build\n");
        assert_eq!(read(out.join("build")), "b");
    })
    .await;
}

#[tokio::test]
async fn test_cmd_that_writes_nothing_is_retried_on_resume() {
    init_tracing();
    with_timeout(async {
        let tmp = TempDir::new().unwrap();
        let config = write_config(
            tmp.path(),
            r#"
[task.gen]
cmd = 'echo gen >> runs.log; if test -f fixed; then printf g > "$TASKDAG_OUTPUT"; fi'

[task.build]
cmd = 'test -f fixed || exit 3; echo build >> runs.log; printf b > "$TASKDAG_OUTPUT"'
after = ["gen"]
"#,
        );
        let out = tmp.path().join("out");
        let resume = resume_file_path(&out);

        let status = run_with(&config, &[]).await.unwrap();
        assert_eq!(status, RunStatus::Incomplete);
        assert_eq!(read(tmp.path().join("runs.log")), "gen\n");
        assert_eq!(read(&resume), "");

        fs::write(tmp.path().join("fixed"), "").unwrap();
        let resume_arg = format!("@{}", resume.display());
        let status = run_with(&config, &[&resume_arg]).await.unwrap();

        assert_eq!(status, RunStatus::Success);
        assert_eq!(read(tmp.path().join("runs.log")), "gen\ngen\nbuild\n");
        assert_eq!(read(out.join("gen")), "g");
        assert_eq!(read(out.join("build")), "b");
    })
    .await;
}
