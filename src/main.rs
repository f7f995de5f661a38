use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use youtube_player::format::split_into_thousand_parts;
use youtube_player::home::CellKind;
use youtube_player::{initialize_client, Config, HomeViewModel, YouTubeDataV3Client, YouTubeService};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "youtube_player=info".into()),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let channel_index = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<usize>().map_err(|_| format!("Invalid channel index: {}", arg))?,
        None => 0,
    };

    let config = Config::load()?;
    info!(base_url = %config.base_url, channels = config.channel_ids.len(), "starting");

    let client = YouTubeDataV3Client::new(config.base_url.clone(), initialize_client()?);
    let service = Arc::new(YouTubeService::new(client, config.api_key.clone()));
    let mut home = HomeViewModel::new(service, &config);

    home.load_channels().await;
    if let Some(message) = &home.error_message {
        error!("some results could not be loaded: {}", message);
    }

    for (i, channel) in home.channels.iter().enumerate() {
        let subscribers = channel
            .statistics
            .subscriber_count
            .as_deref()
            .and_then(split_into_thousand_parts)
            .unwrap_or_else(|| "hidden".to_string());
        let marker = if i == channel_index { '*' } else { ' ' };
        println!("{} [{}] {} ({} subscribers)", marker, i, channel.title(), subscribers);
    }

    home.update_data(channel_index);
    for (i, section) in home.sections().iter().enumerate().skip(1) {
        println!();
        println!("{}", home.section_title(i));
        for cell in &section.items {
            let CellKind::Playlist(playlist) = &cell.kind else {
                continue;
            };
            for item in playlist.playlist_items.iter().flatten() {
                let views = item
                    .snippet
                    .view_count
                    .as_deref()
                    .and_then(split_into_thousand_parts)
                    .unwrap_or_else(|| "?".to_string());
                println!("  {} - {} views  https://youtu.be/{}", item.snippet.title, views, item.video_id());
            }
        }
    }

    Ok(())
}
