mod discover;

pub use discover::discover;

use mkgen_build::{
    graph, AliasMap, BuildConfig, CompileCommands, FileSet, Generated, KindRegistry, Layout,
};
use miette::{miette, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the optional per-tree configuration file.
pub const CONFIG_FILE: &str = "mkgen.toml";

/// What to do besides writing the Makefile.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Create every build directory the rules write into.
    pub provision_dirs: bool,
    /// Also write a compilation database here.
    pub compile_commands: Option<PathBuf>,
}

/// Runs the generation phases over one source tree.
pub struct Driver {
    registry: KindRegistry,
    config: BuildConfig,
    layout: Layout,
    options: Options,
}

impl Driver {
    pub fn new(layout: Layout) -> Self {
        Self {
            registry: KindRegistry::standard(),
            config: BuildConfig::default(),
            layout,
            options: Options::default(),
        }
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: KindRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Load `explicit` if given, else `mkgen.toml` in the source root if it
    /// exists, else the defaults.
    pub fn load_config(src_root: &Path, explicit: Option<&Path>) -> Result<BuildConfig> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = src_root.join(CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(BuildConfig::default());
                }
                candidate
            }
        };
        tracing::debug!(path = %path.display(), "loading config");
        Ok(BuildConfig::from_file(&path)?)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Discover, resolve and render. Nothing is written anywhere.
    pub fn generate(&self) -> Result<Generated> {
        let src_root = Path::new(&self.layout.src_root);
        let build_root = Path::new(&self.layout.build_root);
        let sources = discover(src_root, Some(build_root), &self.registry)?;
        self.generate_from(sources)
    }

    /// Resolve and render an already discovered tree.
    pub fn generate_from(
        &self,
        sources: impl IntoIterator<Item = mkgen_common::SourceFile>,
    ) -> Result<Generated> {
        let mut files = FileSet::load(&self.registry, sources)?;
        let aliases = AliasMap::build(&files)?;
        graph::resolve_edges(&mut files, &aliases)?;
        let generated = mkgen_build::generate(&files, &self.config, &self.layout)?;
        tracing::debug!(
            files = files.len(),
            executables = generated.executables.len(),
            directories = generated.directories.len(),
            "generated"
        );
        Ok(generated)
    }

    /// Generate, write the Makefile to `out`, then produce the side outputs.
    pub fn run(&self, out: &mut dyn Write) -> Result<Generated> {
        let generated = self.generate()?;

        out.write_all(generated.text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| miette!("Failed to write Makefile: {}", e))?;

        if self.options.provision_dirs {
            self.provision(&generated.directories)?;
        }

        if let Some(path) = &self.options.compile_commands {
            let cwd = std::env::current_dir()
                .map_err(|e| miette!("Failed to get current directory: {}", e))?;
            CompileCommands::from_steps(&generated.compiles, &self.config, &cwd).write(path)?;
            tracing::debug!(path = %path.display(), commands = generated.compiles.len(), "wrote compile commands");
        }

        Ok(generated)
    }

    fn provision(&self, directories: &[String]) -> Result<()> {
        for dir in directories {
            std::fs::create_dir_all(dir)
                .map_err(|e| miette!("Failed to create {}: {}", dir, e))?;
        }
        tracing::debug!(count = directories.len(), "build directories provisioned");
        Ok(())
    }
}
