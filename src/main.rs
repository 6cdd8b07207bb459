use std::io;
use std::process::ExitCode;

use tracing::{error, info};

use ansible_parallel::cli::Args;
use ansible_parallel::command::Invocation;
use ansible_parallel::display::LiveRenderer;
use ansible_parallel::engine::Engine;
use ansible_parallel::error::Result;
use ansible_parallel::job::JobList;
use ansible_parallel::logging::init_logging;

/// Run all playbooks and return the process exit status
async fn run_playbooks(args: Args) -> Result<u8> {
    let jobs = JobList::new(args.playbooks.iter().cloned())?;
    let engine = Engine::new(
        Invocation::ansible_playbook(args.forwarded_args()),
        args.max_playbooks,
    );
    info!(
        playbooks = jobs.len(),
        max_parallel = engine.max_parallel(),
        "starting run"
    );

    let renderer = LiveRenderer::new(io::stderr(), &jobs);
    let outcome = engine.run(&jobs, renderer).await?;
    info!(exit_code = outcome.exit_code, "run finished");
    Ok(outcome.exit_status())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::try_parse_known(std::env::args()).unwrap_or_else(|err| err.exit());

    if let Err(err) = init_logging(args.log_level, args.log_file.as_deref()) {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    if args.verify_playbooks {
        let missing = args.missing_playbooks();
        if !missing.is_empty() {
            for playbook in missing {
                eprintln!("Could not find playbook: {playbook}");
            }
            return ExitCode::FAILURE;
        }
    }

    match run_playbooks(args).await {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            error!(error = %err, "run failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
