pub mod server;

/// Action to execute after argument parsing.
#[derive(Debug)]
pub enum Action {
    Server { port: u16, dsn: String },
}
