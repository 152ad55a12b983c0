// Shared between the server and the polling client.

pub const PORT: u16 = 38618;

// Route the relay is served on unless configured otherwise.
pub const DEFAULT_ROUTE: &str = "/";

pub fn server_url(host: &str, port: u16, route: &str) -> String {
    let route = route.trim_start_matches('/');
    format!("http://{host}:{port}/{route}")
}
