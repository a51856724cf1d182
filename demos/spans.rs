use tracing::{debug, error, info, info_span, warn};

use pretty_log_sink::init::{init_tracing_with_config, LayerConfig, Style};
use pretty_log_sink::{Level, Options};

fn main() {
    init_tracing_with_config(LayerConfig {
        style: Style::Timestamped,
        options: Options::default().with_level(Level::DEBUG).with_caller(true),
    })
    .expect("install subscriber");

    info!("starting service");

    let request = info_span!("request", method = "GET", path = "/login");
    let _entered = request.enter();

    debug!(user_id = 42, "looking up user");
    warn!(attempts = 3u64, "too many attempts");
    error!(reason = "invalid password", "authentication failed");
}
