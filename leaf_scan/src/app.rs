use crate::cli::{Cli, Command};
use crate::client::InferenceClient;
use crate::config::Config;
use crate::render::{render, View};
use crate::selection::{FsImagePicker, ImageSource};
use crate::state::{AnalysisSession, ClientState};

use anyhow::Context;
use std::io::IsTerminal;
use std::process::ExitCode;

pub async fn start_app(config: Config, cli: Cli) -> anyhow::Result<ExitCode> {
    let client = InferenceClient::new(config.inference_service.clone())
        .context("failed to initialize inference client")?;
    let color = !cli.no_color && std::io::stdout().is_terminal();

    match cli.command {
        Command::Ping => Ok(ping(&client).await),
        Command::Analyze(args) => Ok(analyze(&config, client, &args.source(), color).await),
    }
}

async fn ping(client: &InferenceClient) -> ExitCode {
    match client.ping().await {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn analyze(
    config: &Config,
    client: InferenceClient,
    source: &ImageSource,
    color: bool,
) -> ExitCode {
    let picker = FsImagePicker::new(&config.camera);
    let mut session = AnalysisSession::new(picker, client);

    let selected = session.select_image(source).is_ok();
    print!("{}", render(&View::from(&session), color));
    if !selected {
        return ExitCode::FAILURE;
    }

    tracing::info!(base_url = %config.inference_service.base_url, "Starting analysis");
    if let Err(e) = session.analyze().await {
        tracing::warn!("Analysis was not started: {}", e);
    }
    print!("{}", render(&View::from(&session), color));

    exit_code(&View::from(&session))
}

fn exit_code(view: &View<'_>) -> ExitCode {
    if succeeded(view) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn succeeded(view: &View<'_>) -> bool {
    matches!(view.state, ClientState::Success(_)) && view.advisory.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::PredictionResult;
    use crate::selection::ImageReference;

    fn view<'a>(
        state: &'a ClientState,
        image: &'a ImageReference,
        advisory: Option<&'a str>,
    ) -> View<'a> {
        View {
            state,
            image: Some(image),
            advisory,
        }
    }

    #[test]
    fn test_only_clean_success_exits_zero() {
        let image = ImageReference::from_path("leaf.jpg").unwrap();
        let success = ClientState::Success(PredictionResult::new("Healthy".to_string().into(), 0.9));
        let failed = ClientState::Failed("Server error 500: boom".to_string());

        assert!(succeeded(&view(&success, &image, None)));
        assert!(!succeeded(&view(&success, &image, Some("No image selected."))));
        assert!(!succeeded(&view(&failed, &image, None)));
        assert!(!succeeded(&view(&ClientState::Idle, &image, None)));
        assert!(!succeeded(&view(&ClientState::Loading, &image, None)));
        assert_eq!(
            format!("{:?}", exit_code(&view(&success, &image, None))),
            format!("{:?}", ExitCode::SUCCESS)
        );
        assert_eq!(
            format!("{:?}", exit_code(&view(&failed, &image, None))),
            format!("{:?}", ExitCode::FAILURE)
        );
    }
}
