use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use climviz::cli::{Cli, Commands, ConfigFormat, OutputFormat, RenderArgs, TemplateType};
use climviz::decode::AutoDecoder;
use climviz::info::{get_dataset_info, print_dataset_info_human, print_dataset_info_json, print_dataset_info_yaml};
use climviz::input::TaskConfig;
use climviz::log::{config_echo, show_farewell_with_timing, show_greeting};
use climviz::{animate_task, run_task};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(log::LevelFilter::Error);
    }
    builder.format_timestamp(None).init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Render(args) => render(&args),
        Commands::Animate { config, fps } => {
            let start_time = Instant::now();
            show_greeting(config.to_str());
            let mut task = TaskConfig::from_file(&config)?;
            if let Some(fps) = fps {
                task.fps = fps;
            }
            config_echo(&task);
            let animation = animate_task(&task, &AutoDecoder::new())?;
            show_farewell_with_timing(Some(&animation), start_time.elapsed());
            Ok(())
        }
        Commands::Info {
            file,
            variable,
            format,
        } => {
            let variable = match variable {
                Some(v) => v,
                None => file
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
                    .context("Cannot derive a variable name from the file name; pass -n")?,
            };
            let info = get_dataset_info(&file, &variable, &AutoDecoder::new())?;
            match format {
                OutputFormat::Human => print_dataset_info_human(&info),
                OutputFormat::Json => print_dataset_info_json(&info)?,
                OutputFormat::Yaml => print_dataset_info_yaml(&info)?,
            }
            Ok(())
        }
        Commands::Template {
            template_type,
            output,
            format,
        } => {
            let template = match template_type {
                TemplateType::Scalar => TaskConfig::scalar_template(),
                TemplateType::Vector => TaskConfig::vector_template(),
            };
            let text = match format {
                ConfigFormat::Json => template.to_json()?,
                ConfigFormat::Yaml => template.to_yaml()?,
            };
            write_output(output.as_deref(), text.as_bytes())
        }
        Commands::Completions { shell, output } => {
            let mut buf = Vec::new();
            clap_complete::generate(shell, &mut Cli::command(), "climviz", &mut buf);
            write_output(output.as_deref(), &buf)
        }
    }
}

fn render(args: &RenderArgs) -> Result<()> {
    let start_time = Instant::now();
    show_greeting(args.config.as_deref().and_then(Path::to_str));

    let config = args.to_task_config()?;
    config_echo(&config);

    let animation = run_task(&config, &AutoDecoder::new(), args.frames_only)?;
    show_farewell_with_timing(animation.as_deref(), start_time.elapsed());
    Ok(())
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            let mut file =
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            file.write_all(bytes)?;
            log::info!("Written to {}", path.display());
        }
        None => io::stdout().write_all(bytes)?,
    }
    Ok(())
}
