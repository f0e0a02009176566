use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const EXTENSION_CRATE: &str = "extension";
const STATIC_DIR: &str = "extension/static";
const DIST_DIR: &str = "dist";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "TypeSense extension task runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the wasm background worker and assemble an unpacked extension
    Build {
        /// Build without optimizations
        #[arg(long)]
        dev: bool,
    },

    /// Run all Rust tests
    Test,

    /// Run clippy linter
    Clippy,

    /// Remove the assembled extension
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { dev } => build(dev),
        Commands::Test => test(),
        Commands::Clippy => clippy(),
        Commands::Clean => clean(),
    }
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build(dev: bool) -> Result<()> {
    let root = workspace_root();
    let dist = root.join(DIST_DIR);
    let pkg = dist.join("pkg");

    println!("🔨 Building background worker (wasm)...");
    let pkg_arg = pkg.to_string_lossy().to_string();
    let mut args = vec!["build", EXTENSION_CRATE, "--target", "no-modules", "--out-dir", pkg_arg.as_str()];
    args.push(if dev { "--dev" } else { "--release" });
    run_cmd_in(&root, "wasm-pack", &args)?;

    println!("📦 Copying static files into {}...", dist.display());
    copy_dir(&root.join(STATIC_DIR), &dist)?;

    println!("✅ Unpacked extension ready at {}", dist.display());
    Ok(())
}

fn test() -> Result<()> {
    println!("🧪 Running all tests...");
    run_cmd_in(&workspace_root(), "cargo", &["test", "--workspace"])
}

fn clippy() -> Result<()> {
    println!("🔍 Running clippy on workspace (warnings as errors)...");
    run_cmd_in(
        &workspace_root(),
        "cargo",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )
}

fn clean() -> Result<()> {
    let dist = workspace_root().join(DIST_DIR);
    if dist.exists() {
        println!("🧹 Removing {}...", dist.display());
        fs::remove_dir_all(&dist).with_context(|| format!("Failed to remove {}", dist.display()))?;
    }
    Ok(())
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).with_context(|| format!("Failed to create {}", to.display()))?;

    for entry in fs::read_dir(from).with_context(|| format!("Failed to read {}", from.display()))? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

fn run_cmd_in(dir: &Path, program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to run: {} {}", program, args.join(" ")))?;

    if !status.success() {
        anyhow::bail!("Command failed: {} {}", program, args.join(" "));
    }

    Ok(())
}
