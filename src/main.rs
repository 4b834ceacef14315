use std::process::ExitCode;
use timebound::logger::*;
use timebound::server::*;
use timebound::settings::*;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    if project_settings.store.is_ephemeral() && !matches!(cli.command, Command::Batch) {
        anyhow::bail!(
            "the {} store does not outlive a single command; use `timebound batch` or a persistent backend",
            project_settings.store.backend
        );
    }

    let server = Server::try_new(&project_settings).await?;

    let succeeded = match cli.command {
        Command::Batch => {
            let input = BufReader::new(tokio::io::stdin());
            let failures = run_batch(&server, input, tokio::io::stdout()).await;
            server.shutdown().await;
            let failures = failures?;
            if failures > 0 {
                warn!(failures, "batch finished with failed commands");
            }
            failures == 0
        }
        command => {
            let (reply, ok) = render(execute(&server, command).await);
            server.shutdown().await;
            println!("{}", serde_json::to_string_pretty(&reply)?);
            ok
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
