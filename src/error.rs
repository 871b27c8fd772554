use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrewPhotoError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カメラフォルダが設定されていません。`--camera DIR` を指定するか `crew-photo config --set-camera-dir DIR` で設定してください")]
    MissingCameraDir,

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] crew_photo_common::Error),
}

impl From<dialoguer::Error> for CrewPhotoError {
    fn from(err: dialoguer::Error) -> Self {
        CrewPhotoError::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrewPhotoError>;
