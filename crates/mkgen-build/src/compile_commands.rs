//! compile_commands.json generation.
//!
//! Every compile recipe written to the Makefile is also recorded as a
//! [`CompileStep`]. Turning the steps into a compilation database lets
//! clangd and friends see the same flags `make` will use.

use crate::config::BuildConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which compiler variable a recipe invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// `$(CC) $(CFLAGS)`
    Cc,
    /// `$(CXX) $(CXXFLAGS) $(PB_INCLUDES)`
    Cxx,
}

impl Tool {
    /// Make variables the recipe starts with.
    pub fn make_prefix(self) -> &'static str {
        match self {
            Tool::Cc => "$(CC) $(CFLAGS)",
            Tool::Cxx => "$(CXX) $(CXXFLAGS) $(PB_INCLUDES)",
        }
    }

    /// The same prefix with the configured values substituted.
    pub fn expand(self, config: &BuildConfig) -> Vec<String> {
        match self {
            Tool::Cc => std::iter::once(config.toolchain.cc.clone())
                .chain(config.cflags())
                .collect(),
            Tool::Cxx => std::iter::once(config.toolchain.cxx.clone())
                .chain(config.cxxflags())
                .chain(
                    config
                        .protobuf
                        .includes
                        .split_whitespace()
                        .map(|s| s.to_string()),
                )
                .collect(),
        }
    }
}

/// One compile recipe: `output: source ...` / `<tool> <flags> -c $< -o $@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileStep {
    pub tool: Tool,
    pub source: String,
    pub output: String,
    /// File-specific flags between the tool prefix and `-c`, each entry
    /// kept as written (a `@compileargs` line may hold several flags).
    pub flags: Vec<String>,
}

impl CompileStep {
    /// The recipe line as written into the Makefile, without the tab.
    pub fn recipe(&self) -> String {
        let mut parts = vec![self.tool.make_prefix().to_string()];
        parts.extend(self.flags.iter().filter(|f| !f.is_empty()).cloned());
        parts.push("-c $< -o $@".to_string());
        parts.join(" ")
    }
}

/// A single entry of compile_commands.json, in the `arguments` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    /// The working directory for compilation.
    pub directory: PathBuf,

    /// The source file path.
    pub file: PathBuf,

    /// The compiler followed by its arguments.
    pub arguments: Vec<String>,

    pub output: PathBuf,
}

impl CompileCommand {
    /// Expand a recorded step with the configured tools and flags.
    pub fn from_step(step: &CompileStep, config: &BuildConfig, directory: &Path) -> Self {
        let mut arguments = step.tool.expand(config);
        for flag in &step.flags {
            arguments.extend(flag.split_whitespace().map(|s| s.to_string()));
        }
        arguments.extend([
            "-c".to_string(),
            step.source.clone(),
            "-o".to_string(),
            step.output.clone(),
        ]);

        Self {
            directory: directory.to_path_buf(),
            file: PathBuf::from(&step.source),
            arguments,
            output: PathBuf::from(&step.output),
        }
    }
}

/// Collection of compile commands (a compile_commands.json document).
#[derive(Debug, Clone, Default)]
pub struct CompileCommands {
    commands: Vec<CompileCommand>,
}

impl CompileCommands {
    pub fn from_steps<'a>(
        steps: impl IntoIterator<Item = &'a CompileStep>,
        config: &BuildConfig,
        directory: &Path,
    ) -> Self {
        Self {
            commands: steps
                .into_iter()
                .map(|step| CompileCommand::from_step(step, config, directory))
                .collect(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.commands)?)
    }

    /// Write the database to `path`, replacing any existing file.
    pub fn write(&self, path: &Path) -> crate::Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step() -> CompileStep {
        CompileStep {
            tool: Tool::Cxx,
            source: "src/net/io.cc".to_string(),
            output: "build/net/io.o".to_string(),
            flags: vec![
                "-Ivendor/a -DFAST".to_string(),
                "-Isrc".to_string(),
                "-Ibuild".to_string(),
            ],
        }
    }

    #[test]
    fn test_recipe_line() {
        assert_eq!(
            step().recipe(),
            "$(CXX) $(CXXFLAGS) $(PB_INCLUDES) -Ivendor/a -DFAST -Isrc -Ibuild -c $< -o $@"
        );
    }

    #[test]
    fn test_expanded_arguments() {
        let mut config = BuildConfig::default();
        config.toolchain.cxx = "clang++".to_string();
        config.flags.cxxflags = vec!["-fPIC".to_string()];
        config.protobuf.includes = "-Ipb".to_string();

        let cmd = CompileCommand::from_step(&step(), &config, Path::new("/work"));
        assert_eq!(
            cmd.arguments,
            vec![
                "clang++", "-g", "-std=c++11", "-O2", "-fPIC", "-Ipb", "-Ivendor/a", "-DFAST",
                "-Isrc", "-Ibuild", "-c", "src/net/io.cc", "-o", "build/net/io.o",
            ]
        );
        assert_eq!(cmd.output, PathBuf::from("build/net/io.o"));
    }

    #[test]
    fn test_c_tool_uses_cflags() {
        let step = CompileStep {
            tool: Tool::Cc,
            source: "src/m.c".to_string(),
            output: "build/m.o".to_string(),
            flags: vec![],
        };
        let cmd = CompileCommand::from_step(&step, &BuildConfig::default(), Path::new("/w"));
        assert_eq!(&cmd.arguments[..3], ["gcc", "-std=c11", "-O2"]);
        assert!(!cmd.arguments.contains(&"-Ipb".to_string()));
    }

    #[test]
    fn test_json_document() {
        let config = BuildConfig::default();
        let commands = CompileCommands::from_steps([&step()], &config, Path::new("/work"));
        let json = commands.to_json().unwrap();
        assert!(json.contains("\"directory\": \"/work\""));
        assert!(!json.contains("\"command\""));

        let parsed: Vec<CompileCommand> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, commands.commands);
    }

    #[test]
    fn test_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compile_commands.json");
        std::fs::write(&path, "stale").unwrap();

        CompileCommands::from_steps([&step()], &BuildConfig::default(), Path::new("/w"))
            .write(&path)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with('['));
        assert!(written.contains("src/net/io.cc"));
    }
}
