use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crew-photo")]
#[command(about = "現場作業サービスの写真記録ワークフロー", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話式で作業者名の入力から写真撮影・承認まで行う
    Run {
        /// 撮影画像を取り込むフォルダ（省略時は設定値）
        #[arg(short, long)]
        camera: Option<PathBuf>,

        /// サービスカタログJSONファイル
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// サービス一覧を表示
    Services {
        /// サービスカタログJSONファイル
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 設定を表示/編集
    Config {
        /// カメラフォルダを設定
        #[arg(long)]
        set_camera_dir: Option<PathBuf>,

        /// サービスカタログを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["crew-photo", "-v", "run", "--camera", "/mnt/dcim"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { camera, catalog } => {
                assert_eq!(camera, Some(PathBuf::from("/mnt/dcim")));
                assert!(catalog.is_none());
            }
            _ => panic!("runとして解析されない"),
        }
    }

    #[test]
    fn test_parse_services_json() {
        let cli = Cli::parse_from(["crew-photo", "services", "--json"]);
        assert!(matches!(cli.command, Commands::Services { json: true, .. }));
    }

    #[test]
    fn test_parse_config() {
        let cli = Cli::parse_from(["crew-photo", "config", "--set-camera-dir", "/tmp/cam", "--show"]);
        match cli.command {
            Commands::Config { set_camera_dir, set_catalog, show } => {
                assert_eq!(set_camera_dir, Some(PathBuf::from("/tmp/cam")));
                assert!(set_catalog.is_none());
                assert!(show);
            }
            _ => panic!("configとして解析されない"),
        }
    }
}
