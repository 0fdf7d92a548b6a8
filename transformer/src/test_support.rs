//! Test-only helpers: scripted process runners, fixed version sources and
//! scratch projects.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::core::types::{ToolKind, Version};
use crate::io::probe::VersionProbe;
use crate::io::process::{CommandOutput, CommandRequest, CommandRunner};

/// Successful process output.
pub fn succeeded(stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
        ..CommandOutput::default()
    }
}

/// Failed process output with exit code `code`.
pub fn failed(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        code: Some(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
        ..CommandOutput::default()
    }
}

/// Side effect applied when a scripted response is consumed.
pub type ScriptedEffect = Box<dyn Fn(&CommandRequest)>;

/// One queued response of a [`ScriptedRunner`].
pub struct ScriptedCall {
    pub output: CommandOutput,
    pub effect: Option<ScriptedEffect>,
}

impl From<CommandOutput> for ScriptedCall {
    fn from(output: CommandOutput) -> Self {
        Self {
            output,
            effect: None,
        }
    }
}

/// Runner that replays queued outputs in order and records every request.
///
/// Once the queue is exhausted, `run` fails as if the program could not be spawned.
#[derive(Default)]
pub struct ScriptedRunner {
    queue: RefCell<VecDeque<ScriptedCall>>,
    requests: RefCell<Vec<CommandRequest>>,
}

impl ScriptedRunner {
    pub fn new(outputs: Vec<CommandOutput>) -> Self {
        Self::with_calls(outputs.into_iter().map(ScriptedCall::from).collect())
    }

    pub fn with_calls(calls: Vec<ScriptedCall>) -> Self {
        Self {
            queue: RefCell::new(calls.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<CommandRequest> {
        self.requests.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput> {
        self.requests.borrow_mut().push(request.clone());
        let call = self
            .queue
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("spawn command: No such file or directory (os error 2)"))?;
        if let Some(effect) = &call.effect {
            effect(request);
        }
        Ok(call.output)
    }
}

/// Version source with fixed answers that counts how often it was asked.
#[derive(Debug, Default)]
pub struct StaticVersions {
    pub toolchain: Option<Version>,
    pub runtime: Option<Version>,
    calls: Cell<u32>,
}

impl StaticVersions {
    pub fn new(toolchain: Option<Version>, runtime: Option<Version>) -> Self {
        Self {
            toolchain,
            runtime,
            calls: Cell::new(0),
        }
    }

    /// Toolchain and runtime both report `version`.
    pub fn matching(version: Version) -> Self {
        Self::new(Some(version), Some(version))
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl VersionProbe for StaticVersions {
    fn version(&self, _command: &str, kind: ToolKind) -> Option<Version> {
        self.calls.set(self.calls.get() + 1);
        match kind {
            ToolKind::Toolchain => self.toolchain,
            ToolKind::Runtime => self.runtime,
        }
    }
}

/// Scratch project directory with a `src/` folder.
pub struct TestProject {
    _temp: tempfile::TempDir,
    root: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let root = temp.path().to_path_buf();
        fs::create_dir_all(root.join("src"))?;
        Ok(Self { _temp: temp, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `contents` to `rel` under the project root, creating parents.
    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write a `package.json` whose transformer section is `section` (raw JSON).
    pub fn write_package_json(&self, section: &str) -> Result<PathBuf> {
        self.write(
            "package.json",
            &format!(r#"{{"name": "demo", "parcel-transformer-transcrypt": {section}}}"#),
        )
    }

    /// Write a run manifest listing `sources` into `outdir` for `stem`.
    pub fn write_manifest(&self, outdir: &Path, stem: &str, sources: &[&str]) -> Result<PathBuf> {
        write_manifest(outdir, stem, sources)
    }
}

/// Write a run manifest listing `sources` as `<outdir>/<stem>.project`.
pub fn write_manifest(outdir: &Path, stem: &str, sources: &[&str]) -> Result<PathBuf> {
    fs::create_dir_all(outdir)?;
    let modules: Vec<_> = sources
        .iter()
        .map(|source| serde_json::json!({ "source": source }))
        .collect();
    let path = outdir.join(format!("{stem}.project"));
    fs::write(&path, serde_json::to_string_pretty(&serde_json::json!({ "modules": modules }))?)?;
    Ok(path)
}
