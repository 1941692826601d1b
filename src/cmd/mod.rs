mod fingerprint;
mod output;
mod scrape;
mod serve;
mod watch;

pub use fingerprint::cmd_fingerprint;
pub use scrape::cmd_scrape;
pub use serve::cmd_serve;
pub use watch::cmd_watch;
