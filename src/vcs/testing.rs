use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

/// Runs git in `dir` with a throwaway identity and returns its trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let mut command = Command::new("git");
    for key in GIT_ENV_OVERRIDES {
        command.env_remove(key);
    }
    let output = command
        .args([
            "-c",
            "user.name=repofetch",
            "-c",
            "user.email=repofetch@example.org",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// A repository at `dir` with one commit on `main`.
pub fn upstream(dir: &Path) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "-q"]);
    commit(dir, "README");
    git(dir, &["branch", "-M", "main"]);
    dir.to_path_buf()
}

/// Commits a new file named `name` and returns the new head.
pub fn commit(repo: &Path, name: &str) -> String {
    fs::write(repo.join(name), name).unwrap();
    git(repo, &["add", name]);
    git(repo, &["commit", "-q", "-m", name]);
    git(repo, &["rev-parse", "HEAD"])
}

pub fn clone(upstream: &Path, dest: &Path) {
    let parent = dest.parent().unwrap();
    fs::create_dir_all(parent).unwrap();
    let upstream = upstream.to_string_lossy().into_owned();
    let dest = dest.to_string_lossy().into_owned();
    git(parent, &["clone", "-q", upstream.as_str(), dest.as_str()]);
}
