pub mod blob;
pub mod file_transport;
pub mod http_downloader;
pub mod transport;
pub mod validating_body;
