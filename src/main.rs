/*!
 * Command-line interface for llmcopy
 */

use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use llmcopy::clipboard::SystemClipboard;
use llmcopy::config::{discover_project_root, Args, Settings};
use llmcopy::report::{CopyReport, ReportFormat, Reporter};
use llmcopy::session::{copy_to, run_copy, CopyRequest, Outcome};
use llmcopy::{CancelToken, ConsoleProgress};

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{:?}", e);
            eprintln!("Error copying content: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> llmcopy::Result<u8> {
    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(0);
    }

    let settings_path = args.settings_path()?;
    let mut settings = Settings::load(&settings_path)?;
    settings.apply_args(&args);
    settings.validate()?;

    if args.save {
        settings.save(&settings_path)?;
        eprintln!("Saved settings to {}", settings_path.display());
    }

    if args.show_settings {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(0);
    }

    let root = match &args.root {
        Some(root) => root.clone(),
        None => discover_project_root(&std::env::current_dir()?),
    };
    tracing::debug!("Project root: {}", root.display());

    let request = CopyRequest {
        selection: args.paths.clone(),
        open_files: args.open.clone(),
        filter: settings.filter_configuration(Some(&root)),
        root: Some(root),
        project_name: None,
    };

    let start_time = Instant::now();
    let progress = ConsoleProgress::new(CancelToken::new());
    let to_clipboard = !args.print && args.output.is_none();

    let outcome = if to_clipboard {
        copy_to(&request, progress.clone(), &SystemClipboard)
    } else {
        run_copy(&request, progress.clone())
    };
    progress.finish();

    let destination = match &args.output {
        Some(path) => path.display().to_string(),
        None if args.print => "stdout".to_string(),
        None => "clipboard".to_string(),
    };

    if let Outcome::Copied(result) = &outcome {
        if args.print {
            let mut stdout = io::stdout().lock();
            stdout.write_all(result.content.as_bytes())?;
            stdout.write_all(b"\n")?;
            stdout.flush()?;
        } else if let Some(path) = &args.output {
            fs::write(path, &result.content)?;
        }

        let report = CopyReport::from_result(result, destination.clone(), start_time.elapsed());
        let format = if args.print { ReportFormat::Plain } else { ReportFormat::ConsoleTable };
        Reporter::new(format).print_report(&report);
    }

    if let Some(message) = outcome.message(&destination) {
        eprintln!("{}", message);
    }

    Ok(u8::try_from(outcome.exit_code()).unwrap_or(1))
}
