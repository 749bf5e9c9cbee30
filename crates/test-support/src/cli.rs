use std::path::PathBuf;
use std::process::Command;

/// Runs the `provgran` binary through cargo from the workspace root.
pub struct CliHarness {
    workspace_dir: PathBuf,
}

impl Default for CliHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl CliHarness {
    pub fn new() -> Self {
        Self {
            workspace_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .parent()
                .and_then(|path| path.parent())
                .expect("test-support crate should be under crates/")
                .to_path_buf(),
        }
    }

    pub fn provgran_command(&self) -> Command {
        let mut command = Command::new("cargo");
        command
            .current_dir(&self.workspace_dir)
            .arg("run")
            .arg("--quiet")
            .arg("-p")
            .arg("provgran-cli")
            .arg("--bin")
            .arg("provgran")
            .arg("--");
        command
    }
}
