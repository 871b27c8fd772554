use clap::Parser;
use crew_photo::{app, camera, cli, config, error, logging, operator};
use app::Session;
use camera::FolderCamera;
use cli::{Cli, Commands};
use config::Config;
use error::{CrewPhotoError, Result};
use operator::{service_label, DialoguerOperator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Run { camera, catalog } => {
            println!("📸 crew-photo - サービス写真記録\n");

            let catalog = config.load_catalog(catalog.as_deref())?;
            let folder = camera
                .or_else(|| config.camera_dir())
                .ok_or(CrewPhotoError::MissingCameraDir)?;
            if !folder.is_dir() {
                return Err(CrewPhotoError::FolderNotFound(folder.display().to_string()));
            }

            let camera = FolderCamera::new(folder);
            println!("✔ サービス {}件", catalog.len());
            println!("✔ カメラ: {}", camera.folder().display());

            let mut session = Session::new(catalog, DialoguerOperator::new(), camera);
            let interrupts = session.spawn_interrupt_handler();
            let result = session.run().await;
            interrupts.abort();
            result?;

            println!("\n✅ 終了");
        }

        Commands::Services { catalog, json } => {
            let catalog = config.load_catalog(catalog.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                println!("サービス一覧 ({}件):", catalog.len());
                for service in catalog.services() {
                    println!("  {:<20} {}", service.id, service_label(service, false));
                }
            }
        }

        Commands::Config { set_camera_dir, set_catalog, show } => {
            let mut config = config;

            if let Some(dir) = set_camera_dir {
                config.set_camera_dir(dir)?;
                println!("✔ カメラフォルダを設定しました");
            }

            if let Some(path) = set_catalog {
                // 保存前に読めることを確認
                config.load_catalog(Some(path.as_path()))?;
                config.set_catalog_path(path)?;
                println!("✔ サービスカタログを設定しました");
            }

            if show {
                let unset = || "未設定".to_string();
                println!("設定:");
                println!(
                    "  カメラフォルダ: {}",
                    config.camera_dir().map(|p| p.display().to_string()).unwrap_or_else(unset)
                );
                println!(
                    "  カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "組み込み".to_string())
                );
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}
