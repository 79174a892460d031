use api_docs_server::{browser::SystemBrowser, config::Config, docs_server::DocsServer};
use std::process::exit;

fn main() {
    let server = DocsServer::new(Config::get(), Box::new(SystemBrowser));

    if let Err(error) = server.start() {
        eprintln!("{error}");
        exit(1);
    }
}
