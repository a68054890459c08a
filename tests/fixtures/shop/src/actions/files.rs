use rest_actions::{FreeFormResponse, RequestParameter, RestAction};

pub struct UploadModel {
    pub file: RequestParameter,
    #[request_parameter]
    #[validate(not_null)]
    pub folder: String,
}

pub struct FileInfo {
    pub size: u64,
    pub checksum: String,
}

pub trait UploadAction<R>: RestAction<UploadModel, R> {}

#[rest_action(method = "POST")]
pub struct UploadFileRestAction;

impl UploadAction<FileInfo> for UploadFileRestAction {}

pub struct DownloadModel {
    #[request_parameter]
    #[not_empty]
    pub path: String,
}

#[rest_action(GET)]
pub struct DownloadFileRestAction;

impl RestAction<DownloadModel, FreeFormResponse> for DownloadFileRestAction {}
