use crate::{
    browser::Browser,
    config::Config,
    file::{File, Resolved},
    listing::Listing,
};
use anyhow::{Context, Error, Result, bail};
use chrono::Local;
use std::{
    io::Read,
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server};

const DIVIDER: &str = "============================================================";
const TIMESTAMP_FORMAT: &str = "%d/%b/%Y %H:%M:%S";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

pub struct DocsServer {
    config: Config,
    browser: Box<dyn Browser>,
}

impl DocsServer {
    pub fn new(config: Config, browser: Box<dyn Browser>) -> Self {
        Self { config, browser }
    }

    /// Binds, prints the banner, launches the browser, then serves until
    /// interrupted.
    pub fn start(&self) -> Result<()> {
        let server = self.bind()?;
        let url = format!("http://localhost:{}", self.config.port);

        println!("{DIVIDER}");
        println!("🚀 API Documentation Server");
        println!("{DIVIDER}");
        println!();
        println!("✅ Server started successfully!");
        println!();
        println!("📖 Documentation URL: {url}");
        println!("📋 OpenAPI Spec:      {url}/openapi.yaml");
        println!("📮 Postman Collection: {url}/postman_collection.json");
        println!();
        println!("{DIVIDER}");
        println!();

        if self.config.open_browser {
            self.launch_browser(&url);
            println!();
        }

        println!("{DIVIDER}");
        println!("Press Ctrl+C to stop the server");
        println!("{DIVIDER}");
        println!();

        let accept_loop = Arc::clone(&server);
        ctrlc::set_handler(move || accept_loop.unblock())
            .context("Could not set the interrupt handler")?;

        self.serve(&server);

        println!();
        println!("{DIVIDER}");
        println!("🛑 Server stopped");
        println!("{DIVIDER}");

        Ok(())
    }

    pub fn bind(&self) -> Result<Arc<Server>> {
        let address = SocketAddrV4::new(Ipv4Addr::new(0, 0, 0, 0), self.config.port);

        match Server::http(address) {
            Ok(server) => Ok(Arc::new(server)),
            Err(error) => bail!(
                "Could not start server on port {}: {error}",
                self.config.port,
            ),
        }
    }

    /// Handles requests sequentially until the server is unblocked.
    pub fn serve(&self, server: &Server) {
        for request in server.incoming_requests() {
            if let Err(error) = self.handle(request) {
                println!("Error while processing request: {error}");
            }
        }
    }

    fn launch_browser(&self, url: &str) {
        println!("🌐 Opening browser...");

        match self.browser.open(url) {
            Ok(()) => println!("✅ Browser opened!"),
            Err(error) => {
                println!("⚠️  Could not open browser automatically: {error}");
                println!("   Please open {url} manually");
            }
        }
    }

    fn handle(&self, request: Request) -> Result<()> {
        match File::resolve(&self.config.directory, request.url()) {
            Resolved::File(file) => {
                let size = file.size;

                Self::respond(request, file.get_response()?, 200, Some(size))
            }
            Resolved::Directory(directory, url_path) => {
                let listing = Listing::new(&directory, &url_path)?;

                Self::respond(request, listing.into(), 200, None)
            }
            Resolved::Redirect(location) => {
                let header = Header::from_bytes("location", location)
                    .map_err(|_| Error::msg("Could not create header"))?;

                Self::respond(request, Response::empty(301).with_header(header), 301, None)
            }
            Resolved::NotFound => Self::respond(
                request,
                Response::from_string("File not found").with_status_code(404),
                404,
                None,
            ),
        }
    }

    fn respond<R: Read>(
        request: Request,
        mut response: Response<R>,
        status_code: u32,
        size: Option<u64>,
    ) -> Result<()> {
        for (field, value) in CORS_HEADERS {
            let header = Header::from_bytes(field, value)
                .map_err(|_| Error::msg("Could not create header"))?;

            response = response.with_header(header);
        }

        Self::log_request(&request, status_code, size);
        request.respond(response)?;

        Ok(())
    }

    fn log_request(request: &Request, status_code: u32, size: Option<u64>) {
        println!(
            "[{}] \"{} {} HTTP/{}\" {status_code} {}",
            Local::now().format(TIMESTAMP_FORMAT),
            request.method(),
            request.url(),
            request.http_version(),
            size.map_or_else(|| "-".into(), |size| size.to_string()),
        );
    }
}
