use clap::Parser;
use mkgen_build::Layout;
use mkgen_driver::{Driver, Options};
use miette::{miette, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "mkgen")]
#[command(author, version, about = "Generate a Makefile for a C/C++ source tree from its #include graph")]
struct Cli {
    /// Base directory of the source tree
    src_root: String,

    /// Base directory of the build output
    build_root: String,

    /// C++ standard (overrides mkgen.toml)
    #[arg(long)]
    std: Option<String>,

    /// C standard (overrides mkgen.toml)
    #[arg(long)]
    cstd: Option<String>,

    /// Optimization level, as in -O<LEVEL> (overrides mkgen.toml)
    #[arg(long)]
    optimization: Option<String>,

    /// Configuration file (default: <SRC_ROOT>/mkgen.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the Makefile here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a compile_commands.json
    #[arg(long, value_name = "PATH")]
    compile_commands: Option<PathBuf>,

    /// Do not create the build directories
    #[arg(long)]
    no_mkdir: bool,

    /// Debug logging to stderr
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let mut config = Driver::load_config(Path::new(&cli.src_root), cli.config.as_deref())?;
    if let Some(std) = cli.std {
        config.flags.std = std;
    }
    if let Some(cstd) = cli.cstd {
        config.flags.cstd = cstd;
    }
    if let Some(optimization) = cli.optimization {
        config.flags.optimization = optimization;
    }

    let driver = Driver::new(Layout::new(cli.src_root, cli.build_root))
        .with_config(config)
        .with_options(Options {
            provision_dirs: !cli.no_mkdir,
            compile_commands: cli.compile_commands,
        });

    match cli.output {
        Some(path) => {
            // Buffered so a failed run leaves any existing Makefile alone.
            let mut buf = Vec::new();
            driver.run(&mut buf)?;
            std::fs::write(&path, buf)
                .map_err(|e| miette!("Failed to write {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "wrote Makefile");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            driver.run(&mut lock)?;
            lock.flush()
                .map_err(|e| miette!("Failed to flush stdout: {}", e))?;
        }
    }

    Ok(())
}
