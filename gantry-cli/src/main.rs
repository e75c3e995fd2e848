//! Gantry CLI Tool
//!
//! Command-line interface for compiling gantry projects into executable
//! statement artifacts. Suitable for local use and CI pipelines.

use clap::{Parser, Subcommand};
use colored::Colorize;
use gantry::compile::{artifact_body, Compiler};
use gantry_cli::report::{count_noun, display_path, materialization_label};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "gantry")]
#[command(about = "SQL model compiler for warehouse engines")]
#[command(version = "0.1.0")]
struct Cli {
    /// Project directory containing gantry.toml
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile all models and write artifacts to the target directory
    Compile {
        /// Dry run - print compiled statements without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List models with their materialization settings
    List,

    /// Print the compiled statements for a single model
    Show {
        /// Model name, or package-qualified dotted name
        model: String,
    },

    /// Remove the target directory
    Clean,
}

fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    if cli.quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();
    } else if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    log::debug!("Using project directory {}", cli.project_dir.display());

    // Execute command
    let result = match cli.command {
        Commands::Compile { dry_run } => handle_compile(&cli.project_dir, dry_run),
        Commands::List => handle_list(&cli.project_dir),
        Commands::Show { model } => handle_show(&cli.project_dir, &model),
        Commands::Clean => handle_clean(&cli.project_dir),
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            process::exit(1);
        }
    }
}

fn handle_compile(project_dir: &Path, dry_run: bool) -> anyhow::Result<()> {
    let compiler = Compiler::from_dir(project_dir)?;
    let output = compiler.compile()?;

    if dry_run {
        for model in &output.models {
            println!(
                "-- {} ({})",
                model.fqn,
                materialization_label(model.materialized, model.temporary)
            );
            println!("{}", artifact_body(&model.statements));
        }
        for analysis in &output.analyses {
            println!("-- analysis {}", analysis.name);
            println!("{}", analysis.sql);
        }
        println!(
            "Would write {} to {}",
            count_noun(output.models.len() + output.analyses.len() + 2, "file"),
            display_path(&compiler.target_dir(), project_dir)
        );
        return Ok(());
    }

    let summary = compiler.write(&output)?;

    for path in &summary.written {
        println!("  📝 {}", display_path(path, project_dir));
    }
    if summary.skipped_count > 0 {
        println!(
            "  ⏳ Skipped {} (disabled)",
            count_noun(summary.skipped_count, "model")
        );
    }
    println!(
        "✅ Compiled {} and {}",
        count_noun(summary.model_count, "model"),
        count_noun(summary.analysis_count, "analysis file")
    );

    Ok(())
}

fn handle_list(project_dir: &Path) -> anyhow::Result<()> {
    let compiler = Compiler::from_dir(project_dir)?;
    let mut models = compiler.load_models()?;
    models.sort_by_key(|m| m.fqn_string());

    println!("\n📊 Models ({})\n", compiler.project.name);

    let mut disabled = 0;
    for model in &models {
        let label = materialization_label(model.config.materialized, model.config.temporary);
        if model.config.enabled {
            println!("  ✓ {} [{}]", model.fqn_string(), label.cyan());
        } else {
            disabled += 1;
            println!(
                "  - {} [{}]",
                model.fqn_string(),
                "disabled".yellow()
            );
        }
    }

    println!(
        "\n📈 Summary: {}, {} disabled",
        count_noun(models.len(), "model"),
        disabled
    );

    Ok(())
}

fn handle_show(project_dir: &Path, name: &str) -> anyhow::Result<()> {
    let compiler = Compiler::from_dir(project_dir)?;
    let output = compiler.compile()?;

    // Accept either the bare model name or the dotted fully qualified name
    let matches: Vec<_> = output
        .models
        .iter()
        .filter(|m| m.fqn == name || m.name == name)
        .collect();

    match matches.len() {
        0 => {
            if output.skipped.iter().any(|fqn| {
                fqn == name || fqn.rsplit('.').next() == Some(name)
            }) {
                anyhow::bail!("Model '{}' is disabled and was not compiled", name);
            }
            anyhow::bail!("No model named '{}'", name);
        }
        1 => {
            print!("{}", artifact_body(&matches[0].statements));
            Ok(())
        }
        _ => {
            let fqns: Vec<&str> = matches.iter().map(|m| m.fqn.as_str()).collect();
            anyhow::bail!(
                "Model name '{}' is ambiguous: {}. Use the dotted name",
                name,
                fqns.join(", ")
            );
        }
    }
}

fn handle_clean(project_dir: &Path) -> anyhow::Result<()> {
    let compiler = Compiler::from_dir(project_dir)?;
    let target_dir = compiler.target_dir();

    if !target_dir.exists() {
        println!("Target directory does not exist, nothing to clean");
        return Ok(());
    }

    std::fs::remove_dir_all(&target_dir)?;
    println!("✅ Removed {}", display_path(&target_dir, project_dir));

    Ok(())
}
